//! # reelserve
//!
//! Seekable video streaming over HTTP range requests, built on [`axum`][1].
//!
//! A streaming request flows through four stages, any of which can end it
//! with a [`StreamError`]:
//!
//! 1. [`Locator::locate`] maps a logical name to a file under the media root.
//! 2. [`RangeRequest::parse`] reads the `Range: bytes=start-[end]` header.
//! 3. [`RangeRequest::resolve`] checks the window against the file's size.
//! 4. [`Ranged::try_respond`] builds a `206 Partial Content` response whose
//!    body is a [`RangedStream`] copying the window in fixed-size chunks.
//!
//! Any type implementing both [`AsyncRead`] and [`AsyncSeekStart`] can be
//! served through the [`KnownSize`] adapter struct. There is also special
//! cased support for [`tokio::fs::File`], see [`KnownSize::open`].
//!
//! ```no_run
//! use axum::http::HeaderMap;
//! use axum::response::{IntoResponse, Response};
//!
//! use reelserve::{KnownSize, RangeRequest, Ranged, StreamError};
//!
//! async fn clip(headers: HeaderMap) -> Result<Response, StreamError> {
//!     let range = RangeRequest::parse(headers.get("range").and_then(|v| v.to_str().ok()))?;
//!     let body = KnownSize::open("videos/sample.mp4").await?;
//!     let content_type = "video/mp4".parse().unwrap();
//!     Ok(Ranged::new(range, body, content_type).try_respond()?.into_response())
//! }
//! ```
//!
//! [1]: https://docs.rs/axum

mod file;
mod stream;

pub mod catalog;
pub mod config;
pub mod error;
pub mod locator;
pub mod media;
pub mod range;
pub mod server;
pub mod thumbnail;
pub mod upload;

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use axum_extra::headers::{AcceptRanges, ContentLength, ContentRange, ContentType};
use mime_guess::mime::Mime;
use tokio::io::{AsyncRead, AsyncSeek};

pub use error::StreamError;
pub use file::KnownSize;
pub use locator::{Locator, MediaResource};
pub use range::{RangeRequest, ResolvedRange};
pub use stream::RangedStream;

/// [`AsyncSeek`] narrowed to only allow seeking from start.
pub trait AsyncSeekStart {
    /// Same semantics as [`AsyncSeek::start_seek`], always passing position as the `SeekFrom::Start` variant.
    fn start_seek(self: Pin<&mut Self>, position: u64) -> io::Result<()>;

    /// Same semantics as [`AsyncSeek::poll_complete`], returning `()` instead of the new stream position.
    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>>;
}

impl<T: AsyncSeek> AsyncSeekStart for T {
    fn start_seek(self: Pin<&mut Self>, position: u64) -> io::Result<()> {
        AsyncSeek::start_seek(self, io::SeekFrom::Start(position))
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        AsyncSeek::poll_complete(self, cx).map_ok(|_| ())
    }
}

/// An [`AsyncRead`] and [`AsyncSeekStart`] with a fixed known byte size.
pub trait RangeBody: AsyncRead + AsyncSeekStart {
    /// The total size of the underlying file.
    ///
    /// This should not change for the lifetime of the object once queried.
    /// If the file shrinks anyway, the response stream ends with an error.
    fn byte_size(&self) -> u64;
}

/// The main responder type. Implements [`IntoResponse`].
#[derive(Debug)]
pub struct Ranged<B: RangeBody + Send + 'static> {
    range: RangeRequest,
    body: B,
    content_type: Mime,
}

impl<B: RangeBody + Send + 'static> Ranged<B> {
    /// Construct a ranged response over any type implementing [`RangeBody`]
    /// and a parsed range request.
    pub fn new(range: RangeRequest, body: B, content_type: Mime) -> Self {
        Ranged { range, body, content_type }
    }

    /// Responds to the request, returning headers and body as
    /// [`RangedResponse`]. Returns [`StreamError::InvalidRange`] if the
    /// requested range cannot be satisfied by the body's current size.
    pub fn try_respond(self) -> Result<RangedResponse<B>, StreamError> {
        let total_bytes = self.body.byte_size();
        let resolved = self.range.resolve(total_bytes)?;

        let content_range = ContentRange::bytes(resolved.start..=resolved.end, total_bytes)
            .map_err(|_| StreamError::InvalidRange)?;
        let content_length = ContentLength(resolved.len());
        let stream = RangedStream::new(self.body, resolved.start, resolved.len());

        tracing::debug!(
            "serving bytes {}-{}/{} ({} bytes)",
            resolved.start, resolved.end, total_bytes, resolved.len()
        );

        Ok(RangedResponse {
            resolved,
            content_range,
            content_length,
            stream,
            content_type: self.content_type,
        })
    }
}

impl<B: RangeBody + Send + 'static> IntoResponse for Ranged<B> {
    fn into_response(self) -> Response {
        self.try_respond().into_response()
    }
}

/// Computed headers and body for a partial content response. Implements [`IntoResponse`].
#[derive(Debug)]
pub struct RangedResponse<B> {
    pub resolved: ResolvedRange,
    pub content_range: ContentRange,
    pub content_length: ContentLength,
    pub stream: RangedStream<B>,
    pub content_type: Mime,
}

impl<B: RangeBody + Send + 'static> IntoResponse for RangedResponse<B> {
    fn into_response(self) -> Response {
        (
            StatusCode::PARTIAL_CONTENT,
            TypedHeader(self.content_range),
            TypedHeader(AcceptRanges::bytes()),
            TypedHeader(self.content_length),
            TypedHeader(ContentType::from(self.content_type)),
            self.stream,
        ).into_response()
    }
}
