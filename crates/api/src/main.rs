use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use backoffice_infra::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    backoffice_observability::init();

    let settings = Settings::from_env().context("loading configuration")?;
    let shutdown = CancellationToken::new();
    let app = backoffice_api::app::build_app(&settings, shutdown.clone())
        .await
        .context("wiring services")?;

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
    shutdown.cancel();
}
