//! Offline thumbnail extraction: one intro frame per catalogued video.
//!
//! This runs as a batch job outside the server process. Frames are extracted
//! by an external transcoder (ffmpeg-compatible command line).

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use futures::TryStreamExt;
use rand::Rng;
use tokio::process::Command;

use crate::catalog;
use crate::config::ThumbnailConfig;

/// Upper bound (exclusive) of the intro section frames are picked from, in seconds.
pub const INTRO_SECONDS: f64 = 10.0;

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("media directory {0} not found")]
    MissingMediaRoot(PathBuf),

    #[error("transcoder {} is not available: {}", .path.display(), .source)]
    TranscoderUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("transcoder {} exited with {}", .0.display(), .1)]
    TranscoderFailed(PathBuf, std::process::ExitStatus),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Outcome counts of one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.generated + self.skipped + self.failed
    }
}

/// Where the thumbnail for `video` is written: `<thumbnail_dir>/<stem>.jpg`.
pub fn thumbnail_path(thumbnail_dir: &Path, video: &str) -> PathBuf {
    let stem = Path::new(video)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| video.to_owned());
    thumbnail_dir.join(format!("{}.jpg", stem))
}

/// Picks a timestamp in `[0, INTRO_SECONDS)`, formatted with two decimals.
pub fn pick_timestamp<R: Rng>(rng: &mut R) -> String {
    let seconds: f64 = rng.random_range(0.0..INTRO_SECONDS);
    // two-decimal rounding can reach 10.00
    format!("{:.2}", seconds.min(9.99))
}

pub struct ThumbnailJob {
    media_root: PathBuf,
    thumbnail_dir: PathBuf,
    transcoder: PathBuf,
}

impl ThumbnailJob {
    pub fn new(config: &ThumbnailConfig) -> Self {
        ThumbnailJob {
            media_root: config.media_root.clone(),
            thumbnail_dir: config.thumbnail_dir.clone(),
            transcoder: config.transcoder.clone(),
        }
    }

    /// Generates missing thumbnails for every video in the catalog.
    ///
    /// Individual extraction failures are counted, not returned; only
    /// problems that stop the whole batch are errors.
    pub async fn run(&self) -> Result<Summary, ThumbnailError> {
        if !tokio::fs::try_exists(&self.media_root).await? {
            return Err(ThumbnailError::MissingMediaRoot(self.media_root.clone()));
        }
        self.check_transcoder().await?;
        tokio::fs::create_dir_all(&self.thumbnail_dir).await?;

        let videos: Vec<String> = catalog::entries(&self.media_root).try_collect().await?;
        if videos.is_empty() {
            tracing::info!("no videos found in {}", self.media_root.display());
            return Ok(Summary::default());
        }
        tracing::info!("found {} videos", videos.len());

        let mut summary = Summary::default();
        for (i, video) in videos.iter().enumerate() {
            tracing::info!("[{}/{}] {}", i + 1, videos.len(), video);

            let target = thumbnail_path(&self.thumbnail_dir, video);
            if tokio::fs::try_exists(&target).await? {
                tracing::info!("thumbnail {} already exists, skipping", target.display());
                summary.skipped += 1;
                continue;
            }

            let timestamp = pick_timestamp(&mut rand::rng());
            let started = Instant::now();
            match self.extract(&self.media_root.join(video), &timestamp, &target).await {
                Ok(()) => {
                    tracing::info!("extracted frame at {}s in {:?}", timestamp, started.elapsed());
                    summary.generated += 1;
                }
                Err(e) => {
                    tracing::error!("failed to generate thumbnail for {}: {}", video, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn check_transcoder(&self) -> Result<(), ThumbnailError> {
        let status = Command::new(&self.transcoder)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| ThumbnailError::TranscoderUnavailable {
                path: self.transcoder.clone(),
                source,
            })?;
        if !status.success() {
            return Err(ThumbnailError::TranscoderFailed(self.transcoder.clone(), status));
        }
        Ok(())
    }

    async fn extract(&self, video: &Path, timestamp: &str, target: &Path) -> Result<(), ThumbnailError> {
        let output = Command::new(&self.transcoder)
            .arg("-i").arg(video)
            .args(["-ss", timestamp, "-vframes", "1", "-q:v", "2", "-y"])
            .arg(target)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                tracing::debug!("transcoder output: {}", stderr.trim());
            }
            return Err(ThumbnailError::TranscoderFailed(self.transcoder.clone(), output.status));
        }
        Ok(())
    }
}
