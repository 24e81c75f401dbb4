use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use lyrebird::application::services::TranscriptionScheduler;
use lyrebird::infrastructure::engines::RunnerEngineFactory;
use lyrebird::infrastructure::observability::{init_tracing, TracingConfig};
use lyrebird::presentation::{create_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    init_tracing(TracingConfig::new(
        settings.logging.level.clone(),
        settings.logging.json_format,
    ));

    std::fs::create_dir_all(&settings.upload.spool_dir)?;

    let initial_spec = settings.initial_model_spec()?;
    tracing::info!(
        engine = %initial_spec.engine_kind,
        model = %initial_spec.model_id,
        "loading initial model (this can take a while on first run)"
    );

    let factory = Arc::new(RunnerEngineFactory::from_env());
    let scheduler = Arc::new(
        TranscriptionScheduler::start(
            factory,
            initial_spec,
            settings.queue.max_queue_size,
        )
        .await?,
    );

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    let state = AppState::new(Arc::clone(&scheduler), settings);
    let router = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening for requests");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown signal handler");
    }
}
