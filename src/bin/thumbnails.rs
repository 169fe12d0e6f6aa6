use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use reelserve::config::ThumbnailConfig;
use reelserve::thumbnail::ThumbnailJob;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reelserve=info")),
        )
        .init();

    let config = ThumbnailConfig::parse();

    let summary = match ThumbnailJob::new(&config).run().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        generated = summary.generated,
        skipped = summary.skipped,
        failed = summary.failed,
        total = summary.total(),
        "thumbnail generation complete"
    );

    if summary.failed > 0 {
        tracing::warn!("some thumbnails failed to generate");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
