//! Command line and environment configuration for the server and the thumbnail tool.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Settings for the HTTP server.
#[derive(Debug, Clone, Parser)]
#[command(name = "reelserve", about = "Serve seekable video over HTTP range requests")]
pub struct ServeConfig {
    /// Address to listen on
    #[arg(long, env = "REELSERVE_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Directory holding every servable video
    #[arg(long, env = "REELSERVE_MEDIA_ROOT", default_value = "videos")]
    pub media_root: PathBuf,

    /// Directory with the browser front end (index.html and assets)
    #[arg(long, env = "REELSERVE_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Video served by `/video` when no `file` parameter is given
    #[arg(long, env = "REELSERVE_DEFAULT_FILE", default_value = "sample.mp4")]
    pub default_file: String,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "REELSERVE_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: u64,
}

impl ServeConfig {
    /// Defaults rooted at `media_root`, mainly for tests and embedding.
    pub fn with_media_root(media_root: impl Into<PathBuf>) -> Self {
        ServeConfig {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            media_root: media_root.into(),
            static_dir: PathBuf::from("static"),
            default_file: "sample.mp4".to_owned(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Settings for the offline thumbnail generator.
#[derive(Debug, Clone, Parser)]
#[command(name = "reelserve-thumbnails", about = "Extract one intro frame per video as a JPEG thumbnail")]
pub struct ThumbnailConfig {
    /// Directory holding the videos
    #[arg(long, env = "REELSERVE_MEDIA_ROOT", default_value = "videos")]
    pub media_root: PathBuf,

    /// Directory the thumbnails are written to
    #[arg(long, env = "REELSERVE_THUMBNAIL_DIR", default_value = "thumbnails")]
    pub thumbnail_dir: PathBuf,

    /// Transcoder executable used to extract frames
    #[arg(long, env = "REELSERVE_TRANSCODER", default_value = "ffmpeg")]
    pub transcoder: PathBuf,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_serve_defaults() {
        let config = ServeConfig::try_parse_from(["reelserve"]).unwrap();
        assert_eq!(PathBuf::from("videos"), config.media_root);
        assert_eq!("sample.mp4", config.default_file);
        assert_eq!(100 * 1024 * 1024, config.max_upload_bytes);
        assert_eq!(8080, config.bind.port());
    }

    #[test]
    fn test_serve_overrides() {
        let config = ServeConfig::try_parse_from([
            "reelserve",
            "--bind", "127.0.0.1:9000",
            "--media-root", "/srv/media",
            "--max-upload-bytes", "1024",
        ]).unwrap();
        assert_eq!("127.0.0.1:9000".parse::<SocketAddr>().unwrap(), config.bind);
        assert_eq!(PathBuf::from("/srv/media"), config.media_root);
        assert_eq!(1024, config.max_upload_bytes);
    }

    #[test]
    fn test_thumbnail_defaults() {
        let config = ThumbnailConfig::try_parse_from(["reelserve-thumbnails"]).unwrap();
        assert_eq!(PathBuf::from("thumbnails"), config.thumbnail_dir);
        assert_eq!(PathBuf::from("ffmpeg"), config.transcoder);
    }
}
