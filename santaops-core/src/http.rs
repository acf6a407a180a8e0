//! Liveness endpoint.
//!
//! Hosting platforms that idle processes without inbound traffic ping `/` to
//! keep the bot awake. Any method on `/` answers with a fixed body.

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{any, get};
use tokio::net::TcpListener;
use tracing::info;

use crate::Error;

pub const ALIVE_BODY: &str = "Bot is alive! 🎅";

pub fn router() -> Router {
    Router::new()
        .route("/", any(|| async { ALIVE_BODY }))
        .route("/healthz", get(|| async { "ok" }))
}

/// Binds `addr` and serves until the task is dropped.
pub async fn serve_liveness(addr: SocketAddr) -> Result<(), Error> {
    let listener = TcpListener::bind(addr).await?;
    info!("Liveness server is ready on {}", listener.local_addr()?);
    axum::serve(listener, router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    async fn call(method: Method, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn test_liveness_answers_any_method() {
        for method in [Method::GET, Method::POST, Method::HEAD, Method::PUT] {
            let (status, _) = call(method.clone(), "/").await;
            assert_eq!(status, StatusCode::OK, "{method}");
        }
        let (_, body) = call(Method::GET, "/").await;
        assert_eq!(body, ALIVE_BODY);
    }

    #[tokio::test]
    async fn test_healthz_and_unknown_paths() {
        assert_eq!(call(Method::GET, "/healthz").await, (StatusCode::OK, "ok".to_string()));
        assert_eq!(call(Method::GET, "/missing").await.0, StatusCode::NOT_FOUND);
    }
}
