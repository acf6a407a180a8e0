// ================================================================
// File: santaops-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Player '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("No player registered for '{0}'")]
    PlayerNotFound(String),

    #[error("Malformed review token: {0}")]
    MalformedToken(String),

    #[error("Actor '{0}' lacks administrative rights")]
    Unauthorized(String),

    /// Any failure of the durable store. The ledger never retries; callers may.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Platform error: {0}")]
    Platform(String),
}

impl Error {
    /// Expected outcomes the transport may show to the user as-is.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::AlreadyRegistered(_)
                | Error::PlayerNotFound(_)
                | Error::MalformedToken(_)
                | Error::Unauthorized(_)
                | Error::InvalidInput(_)
        )
    }

    /// Transient infrastructure failures worth retrying at the transport layer.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::StorageUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_outcomes_are_user_facing() {
        assert!(Error::AlreadyRegistered("u1".into()).is_user_facing());
        assert!(Error::PlayerNotFound("u1".into()).is_user_facing());
        assert!(Error::MalformedToken("x".into()).is_user_facing());
        assert!(Error::Unauthorized("u2".into()).is_user_facing());
        assert!(!Error::Platform("gateway closed".into()).is_user_facing());
    }

    #[test]
    fn test_storage_errors_are_transient() {
        let err: Error = sqlx::Error::PoolTimedOut.into();
        assert!(err.is_transient());
        assert!(!err.is_user_facing());
        assert!(!Error::PlayerNotFound("u1".into()).is_transient());
    }
}
