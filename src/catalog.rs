//! Enumeration of the videos stored under the media root.

use std::io;
use std::path::Path;

use async_stream::try_stream;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::{Stream, TryStreamExt};
use serde::Serialize;

use crate::media;

#[derive(Debug, thiserror::Error)]
#[error("Failed to read videos directory")]
pub struct CatalogError(#[from] pub io::Error);

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        tracing::error!("catalog failed: {}", self.0);
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub videos: Vec<String>,
}

/// Streams the names of allow-listed regular files under `root`, in directory order.
pub fn entries(root: &Path) -> impl Stream<Item = io::Result<String>> + Send + 'static {
    let root = root.to_path_buf();
    try_stream! {
        let mut dir = tokio::fs::read_dir(&root).await?;
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                tracing::debug!("skipping non UTF-8 name in {}", root.display());
                continue;
            };
            if media::is_allowed(&name) {
                yield name;
            }
        }
    }
}

pub async fn list(root: &Path) -> Result<Catalog, CatalogError> {
    let videos = entries(root).try_collect().await?;
    Ok(Catalog { videos })
}
