//! # DueTask Worker
//!
//! Standalone notification worker. Runs the daily due-tomorrow scan without
//! the HTTP server; pair it with `SCHEDULER_ENABLED=false` on the API so only
//! one scheduler fires.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p duetask-worker
//! ```

use duetask_shared::db::pool::{close_pool, create_pool};
use duetask_worker::{
    config::WorkerConfig,
    push,
    scheduler::{NotificationScheduler, SchedulerSettings},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duetask_worker=debug,duetask_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("DueTask Worker v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = WorkerConfig::from_env()?;

    let pool = create_pool(config.database.clone()).await?;
    let delivery = push::from_config(&config.push)?;
    let settings = SchedulerSettings::from_config(&config.scheduler, &config.push);

    let handle = NotificationScheduler::new(pool.clone(), delivery, settings).start();
    tracing::info!("Worker ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping scheduler...");

    handle.stop().await;
    close_pool(pool).await;

    Ok(())
}
