use anyhow::Context;
use clap::Parser;

use coursework_api::config::{Cli, Command, ServeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    coursework_observability::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(config) => serve(config).await,
    }
}

async fn serve(config: ServeConfig) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    let (services, pool) = coursework_api::app::services::build_services(&config)
        .await
        .context("failed to initialize record store")?;
    let app = coursework_api::app::build_app(services);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        workers = pool.worker_count(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("http server stopped; shutting down worker pool");
    let report = pool.shutdown().await;
    tracing::info!(abandoned_jobs = report.abandoned_jobs, "shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
