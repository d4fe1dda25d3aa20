//! # DueTask API Server
//!
//! Serves the to-do web app and, unless `SCHEDULER_ENABLED=false`, runs the
//! daily due-tomorrow notification scan in the same process.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p duetask-api
//! ```

use duetask_api::{
    app::{build_router, AppState},
    config::Config,
};
use duetask_shared::db::{
    migrations::{ensure_database_exists, run_migrations},
    pool::{close_pool, create_pool},
};
use duetask_worker::{
    push,
    scheduler::{NotificationScheduler, SchedulerSettings},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "duetask_api=debug,duetask_worker=debug,duetask_shared=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "DueTask API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    if !config.api.production {
        ensure_database_exists(&config.database.url).await?;
    }

    let pool = create_pool(config.database.clone()).await?;
    run_migrations(&pool).await?;

    let scheduler = match &config.scheduler {
        Some(scheduler_config) => {
            let delivery = push::from_config(&scheduler_config.push)?;
            let settings =
                SchedulerSettings::from_config(&scheduler_config.schedule, &scheduler_config.push);
            Some(NotificationScheduler::new(pool.clone(), delivery, settings).start())
        }
        None => {
            tracing::info!("In-process scheduler disabled");
            None
        }
    };

    let address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, shutting down...");
    if let Some(handle) = scheduler {
        handle.stop().await;
    }
    close_pool(pool).await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
