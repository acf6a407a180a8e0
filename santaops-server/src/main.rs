use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use santaops_core::Database;
use santaops_core::catalog::QuestCatalog;
use santaops_core::http::serve_liveness;
use santaops_core::platforms::discord::DiscordRuntime;
use santaops_core::repositories::{
    MemoryPlayerRepository, MemoryResolutionRepository, PlayerRepository, PostgresPlayerRepository,
    PostgresResolutionRepository, ResolutionRepository,
};
use santaops_core::services::BountyService;

mod config;
use config::Args;

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("santaops=info".parse()?);
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub).context("Failed to set global subscriber")?;
    Ok(())
}

async fn open_stores(
    args: &Args,
) -> anyhow::Result<(Arc<dyn PlayerRepository>, Arc<dyn ResolutionRepository>)> {
    match &args.database_url {
        Some(url) => {
            let db = Database::new(url).await.context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Ok((
                Arc::new(PostgresPlayerRepository::new(db.pool().clone())),
                Arc::new(PostgresResolutionRepository::new(db.pool().clone())),
            ))
        }
        None => {
            warn!("DATABASE_URL is not set; players are kept in memory and lost on restart");
            Ok((
                Arc::new(MemoryPlayerRepository::new()),
                Arc::new(MemoryResolutionRepository::new()),
            ))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing()?;
    let args = Args::parse();
    let discord = args.discord()?;
    info!(
        "SantaOps starting. discord={}, persistent={}",
        discord.is_some(),
        args.database_url.is_some()
    );

    let catalog = QuestCatalog::load(&args.quests_path)?;
    info!("Loaded {} quests", catalog.len());

    let (players, resolutions) = open_stores(&args).await?;
    let service = Arc::new(BountyService::new(players, resolutions, Arc::new(catalog)));

    let addr = args.liveness_addr();
    let liveness = tokio::spawn(async move {
        if let Err(e) = serve_liveness(addr).await {
            error!("Liveness server error: {e}");
        }
    });

    let mut runtime = match discord {
        Some(settings) => {
            let mut runtime = DiscordRuntime::new(settings.token, settings.report_channel_id, service.clone())?;
            runtime.connect().await?;
            Some(runtime)
        }
        None => {
            info!("`--no-discord` given; serving liveness only");
            None
        }
    };

    match runtime.as_mut() {
        Some(rt) => {
            tokio::select! {
                _ = rt.wait() => warn!("All shards stopped."),
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        error!("Failed to listen for Ctrl-C: {e}");
                    }
                    info!("Ctrl-C detected; shutting down...");
                }
            }
        }
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {e}");
            }
            info!("Ctrl-C detected; shutting down...");
        }
    }

    if let Some(mut rt) = runtime {
        rt.disconnect().await;
    }
    liveness.abort();
    info!("Main finished. Goodbye!");
    Ok(())
}
