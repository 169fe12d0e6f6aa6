//! HTTP routes: range streaming, upload, catalog and the static front end.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::catalog::{self, Catalog, CatalogError};
use crate::config::ServeConfig;
use crate::upload::{self, UploadError, Uploaded};
use crate::{KnownSize, Locator, RangeRequest, Ranged, StreamError};

/// Shared, read-only request context.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    locator: Locator,
    default_file: String,
    max_upload_bytes: u64,
}

impl AppState {
    pub fn new(config: &ServeConfig) -> Self {
        AppState {
            inner: Arc::new(Inner {
                locator: Locator::new(&config.media_root),
                default_file: config.default_file.clone(),
                max_upload_bytes: config.max_upload_bytes,
            }),
        }
    }

    pub fn locator(&self) -> &Locator {
        &self.inner.locator
    }
}

/// Builds the full application router.
pub fn router(config: &ServeConfig) -> Router {
    let index = config.static_dir.join("index.html");

    Router::new()
        .route("/video", get(stream_video))
        .route("/upload", post(upload_video))
        .route("/videos", get(list_videos))
        .route_service("/", ServeFile::new(index))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(config))
}

#[derive(Debug, Deserialize)]
struct VideoQuery {
    file: Option<String>,
}

/// `GET /video?file=NAME` with a mandatory `Range` header.
async fn stream_video(
    State(state): State<AppState>,
    Query(query): Query<VideoQuery>,
    headers: HeaderMap,
) -> Result<Response, StreamError> {
    let name = query
        .file
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| state.inner.default_file.clone());

    let resource = state.locator().locate(&name).await?;

    let range = match headers.get(header::RANGE) {
        None => RangeRequest::parse(None)?,
        Some(value) => {
            let value = value.to_str().map_err(|_| StreamError::MalformedHeader)?;
            RangeRequest::parse(Some(value))?
        }
    };

    // size is read fresh for every request
    let body = KnownSize::open(&resource.path).await?;
    let response = Ranged::new(range, body, resource.content_type).try_respond()?;

    tracing::debug!("streaming {} {:?}", resource.name, response.resolved);
    Ok(response.into_response())
}

/// `POST /upload` with a multipart `video` field.
async fn upload_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<Uploaded>, UploadError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let uploaded = upload::store(
        state.locator(),
        content_type,
        body.into_data_stream(),
        state.inner.max_upload_bytes,
    ).await?;

    Ok(Json(uploaded))
}

/// `GET /videos`.
async fn list_videos(State(state): State<AppState>) -> Result<Json<Catalog>, CatalogError> {
    catalog::list(state.locator().root()).await.map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_default_file_used_without_query() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("sample.mp4"), b"0123456789").await.unwrap();
        let app = router(&ServeConfig::with_media_root(dir.path()));

        let request = Request::get("/video").header("Range", "bytes=2-4").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(StatusCode::PARTIAL_CONTENT, response.status());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&b"234"[..], &bytes[..]);
    }

    #[tokio::test]
    async fn test_non_ascii_range_header_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("sample.mp4"), b"0123456789").await.unwrap();
        let app = router(&ServeConfig::with_media_root(dir.path()));

        let value = axum::http::HeaderValue::from_bytes(b"bytes=\xff-").unwrap();
        let request = Request::get("/video").header("Range", value).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(StatusCode::BAD_REQUEST, response.status());
    }
}
