//! Re:365 unsubscribe HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, storage, and the HTTP router, then serves until
//! Ctrl-C.
//!
//! # Notes
//! Failing to create the data directory aborts startup; every other storage
//! failure is absorbed by the store at request time.
use anyhow::Context;
use std::future::Future;
use std::sync::Arc;
use unsubscribe::app::{AppState, build_router};
use unsubscribe::config::{StorageBackend, UnsubscribeConfig};
use unsubscribe::observability;
use unsubscribe::store::UnsubscribeStore;
use unsubscribe::store::file::JsonFileStore;
use unsubscribe::store::memory::InMemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = UnsubscribeConfig::from_env_or_yaml().context("unsubscribe config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: UnsubscribeConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("re365-unsubscribe");
    let state = build_state(&config).await?;
    tracing::info!(
        backend = state.store.backend_name(),
        durable = state.store.is_durable(),
        data_dir = %config.data_dir.display(),
        "unsubscribe store ready"
    );
    let metrics_task = observability::spawn_metrics(metrics_handle, config.metrics_bind);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "Re:365 unsubscribe server listening");
    tracing::info!("health check: /health");
    tracing::info!("unsubscribe page: /unsubscribe?email=test@example.com");
    tracing::info!("unsubscribe list: /api/unsubscribe/list");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    metrics_task.abort();
    let _ = metrics_task.await;
    tracing::info!("unsubscribe server stopped");
    Ok(())
}

async fn build_state(config: &UnsubscribeConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn UnsubscribeStore + Send + Sync> = match config.storage {
        StorageBackend::File => Arc::new(
            JsonFileStore::open(config.store_config())
                .await
                .context("prepare data directory")?,
        ),
        StorageBackend::Memory => Arc::new(InMemoryStore::new()),
    };
    Ok(AppState::new(store))
}
