use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use reelserve::config::ServeConfig;
use reelserve::server;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reelserve=info,tower_http=info")),
        )
        .init();

    let config = ServeConfig::parse();
    let router = server::router(&config);

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!("serving {} on http://{}", config.media_root.display(), listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
