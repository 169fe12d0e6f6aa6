//! Multipart video upload into the media root.

use std::io;
use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use futures::Stream;
use multer::{Constraints, Multipart, SizeLimit};
use rand::Rng;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::locator::{validate_name, Locator};
use crate::media;

/// Multipart field carrying the video.
pub const FIELD_NAME: &str = "video";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No video file provided")]
    MissingFile,

    #[error("File too large. Maximum size is {}", format_limit(.0))]
    TooLarge(u64),

    #[error("Invalid file type. Allowed: mp4, avi, mov, mkv, webm")]
    InvalidType,

    #[error("Invalid filename")]
    InvalidName,

    #[error("Malformed multipart body")]
    Multipart(#[source] multer::Error),

    #[error("Failed to save file")]
    Io(#[from] io::Error),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match &self {
            UploadError::Io(e) => tracing::error!("upload failed: {}", e),
            UploadError::Multipart(e) => tracing::warn!("upload rejected: {}", e),
            e => tracing::warn!("upload rejected: {}", e),
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Uploaded {
    pub message: String,
    pub filename: String,
}

/// Accepts a `multipart/form-data` body and stores its `video` field under the media root.
///
/// The file is streamed to a hidden partial file and renamed into place once
/// complete, so a half-written upload is never listed or served.
pub async fn store<S, E>(
    locator: &Locator,
    content_type: Option<&str>,
    body: S,
    max_bytes: u64,
) -> Result<Uploaded, UploadError>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let boundary = content_type
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or(UploadError::MissingFile)?;

    let constraints = Constraints::new()
        .size_limit(SizeLimit::new().for_field(FIELD_NAME, max_bytes));
    let mut multipart = Multipart::with_constraints(body, boundary, constraints);

    let mut field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FIELD_NAME) => break field,
            Ok(Some(_)) => continue,
            Ok(None) => return Err(UploadError::MissingFile),
            Err(e) => return Err(UploadError::Multipart(e)),
        }
    };

    let filename = field.file_name().ok_or(UploadError::MissingFile)?.to_owned();
    validate_name(&filename).map_err(|_| UploadError::InvalidName)?;
    if !media::is_allowed(&filename) {
        return Err(UploadError::InvalidType);
    }

    tokio::fs::create_dir_all(locator.root()).await?;
    let target = locator.path_for(&filename).map_err(|_| UploadError::InvalidName)?;
    let partial = partial_path(locator.root(), &mut rand::rng());

    let written = async {
        let mut file = tokio::fs::File::create(&partial).await?;
        while let Some(chunk) = field.chunk().await.map_err(|e| match e {
            multer::Error::FieldSizeExceeded { .. } => UploadError::TooLarge(max_bytes),
            e => UploadError::Multipart(e),
        })? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok::<_, UploadError>(())
    }.await;

    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
            tracing::warn!("could not remove {}: {}", partial.display(), cleanup);
        }
        return Err(e);
    }

    tokio::fs::rename(&partial, &target).await?;
    tracing::info!("stored upload {}", target.display());

    Ok(Uploaded {
        message: "Video uploaded successfully".to_owned(),
        filename,
    })
}

// unique per upload; the `.part` extension keeps it out of the catalog
fn partial_path<R: Rng>(root: &Path, rng: &mut R) -> PathBuf {
    root.join(format!(".upload-{:016x}.part", rng.random::<u64>()))
}

fn format_limit(bytes: &u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if *bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}
