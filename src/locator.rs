use std::io;
use std::path::{Path, PathBuf};

use mime_guess::mime::Mime;

use crate::error::StreamError;
use crate::media;

/// A located, servable file under the media root.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaResource {
    pub name: String,
    pub path: PathBuf,
    pub content_type: Mime,
}

/// Maps logical names to files inside a single media root.
///
/// The root is fixed at construction; nothing is read from process state.
#[derive(Debug, Clone)]
pub struct Locator {
    root: PathBuf,
}

impl Locator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Locator { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates `name` and joins it under the root without touching the filesystem.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StreamError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    /// Resolves `name` to an existing regular file under the root.
    ///
    /// Name validation happens before any filesystem access. Only a missing
    /// entry or a non-file is `NotFound`; other stat failures surface as `Io`.
    pub async fn locate(&self, name: &str) -> Result<MediaResource, StreamError> {
        let path = self.path_for(name)?;
        let content_type = media::content_type(name).ok_or(StreamError::InvalidName)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(MediaResource {
                name: name.to_owned(),
                path,
                content_type,
            }),
            Ok(_) => {
                tracing::debug!("{} is not a regular file", path.display());
                Err(StreamError::NotFound)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("{} does not exist", path.display());
                Err(StreamError::NotFound)
            }
            Err(e) => Err(StreamError::Io(e)),
        }
    }
}

/// Rejects names that could escape the media root.
pub fn validate_name(name: &str) -> Result<(), StreamError> {
    let suspicious = name.is_empty()
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if suspicious {
        tracing::warn!("rejected media name {:?}", name);
        return Err(StreamError::InvalidName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("sample.mp4").is_ok());
        assert!(validate_name("my clip (1).webm").is_ok());

        for bad in ["", "..", "../secret", "a/../b.mp4", "sub/clip.mp4", "/etc/passwd", "..\\win.mp4", "nul\0.mp4", "clip..mp4"] {
            assert_matches!(validate_name(bad), Err(StreamError::InvalidName), "name {:?}", bad);
        }
    }

    #[tokio::test]
    async fn test_traversal_rejected_before_filesystem_access() {
        // the root does not exist, so any filesystem access would yield NotFound
        let locator = Locator::new("/definitely/not/a/real/root");
        assert_matches!(locator.locate("../secret").await, Err(StreamError::InvalidName));
        assert_matches!(locator.locate("missing.mp4").await, Err(StreamError::NotFound));
    }

    #[tokio::test]
    async fn test_locate_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("sample.mp4"), b"0123").await.unwrap();
        let locator = Locator::new(dir.path());

        let resource = locator.locate("sample.mp4").await.unwrap();
        assert_eq!(dir.path().join("sample.mp4"), resource.path);
        assert_eq!("sample.mp4", resource.name);
        assert_eq!("video/mp4", resource.content_type.essence_str());
    }

    #[tokio::test]
    async fn test_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("folder.mp4")).await.unwrap();
        let locator = Locator::new(dir.path());

        assert_matches!(locator.locate("folder.mp4").await, Err(StreamError::NotFound));
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), b"secret").await.unwrap();
        let locator = Locator::new(dir.path());

        assert_matches!(locator.locate("notes.txt").await, Err(StreamError::InvalidName));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stat_failure_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("plain");
        tokio::fs::write(&not_a_dir, b"x").await.unwrap();
        let locator = Locator::new(&not_a_dir);

        // ENOTDIR, not ENOENT
        let err = locator.locate("clip.mp4").await.unwrap_err();
        assert_matches!(err, StreamError::Io(_));
        assert_eq!(axum::http::StatusCode::INTERNAL_SERVER_ERROR, err.status());
    }
}
