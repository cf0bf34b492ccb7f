//! # BlogForge API Server
//!
//! REST backend for a blog: accounts, articles, categories, tags, comments
//! and uploads over PostgreSQL, with Redis health reporting.
//!
//! ## Usage
//!
//! ```bash
//! BLOGFORGE__DATABASE__URL=postgresql://localhost/blogforge \
//! BLOGFORGE__JWT__SECRET=$(openssl rand -hex 32) \
//! cargo run -p blogforge-api
//! ```

use anyhow::Context;
use blogforge_api::{
    app::{build_router, AppState},
    config::Config,
    telemetry,
};
use blogforge_shared::{
    db::{
        migrations::{get_migration_status, run_migrations},
        pool::{close_pool, create_pool},
    },
    redis::RedisClient,
    store::PgStore,
};
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    telemetry::init(&config.logging);

    tracing::info!(
        "BlogForge API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let status = get_migration_status(&pool)
        .await
        .context("Failed to read migration status")?;
    tracing::info!(
        applied = status.applied_migrations,
        latest = ?status.latest_version,
        "Database schema ready"
    );

    let redis = RedisClient::new(config.redis.clone())
        .await
        .context("Failed to connect to Redis")?;

    let bind_address = config.bind_address();
    let store = Arc::new(PgStore::new(pool));
    let state = AppState::new(store.clone(), Some(redis), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_pool(store.pool().clone()).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = listen("Ctrl+C", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = listen("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}

/// Waits for one signal; a handler that can't be installed never resolves
async fn listen<E, F>(name: &str, signal: F)
where
    E: std::fmt::Display,
    F: Future<Output = Result<(), E>>,
{
    if let Err(e) = signal.await {
        tracing::error!("Failed to listen for {}: {}", name, e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_listen_resolves_on_signal() {
        let received = async { Ok::<(), std::io::Error>(()) };

        tokio::time::timeout(Duration::from_millis(100), listen("test", received))
            .await
            .expect("signal should resolve");
    }

    #[tokio::test]
    async fn test_failed_handler_does_not_trigger_shutdown() {
        let failed = async { Err::<(), _>("no signal support") };

        let outcome = tokio::time::timeout(Duration::from_millis(50), listen("test", failed)).await;
        assert!(outcome.is_err());
    }
}
