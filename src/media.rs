//! The set of media types this server will store and serve.

use std::path::Path;

use mime_guess::mime::Mime;

/// File extensions accepted for upload, listed by the catalog and served by `/video`.
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

const FALLBACK_CONTENT_TYPE: &str = "video/mp4";

/// Returns the lowercased extension of `name` if it is in [`ALLOWED_EXTENSIONS`].
pub fn allowed_extension(name: impl AsRef<Path>) -> Option<String> {
    let ext = name.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

pub fn is_allowed(name: impl AsRef<Path>) -> bool {
    allowed_extension(name).is_some()
}

/// Derives the `Content-Type` for an allow-listed name.
///
/// Returns `None` for anything outside the allow-list, so a guessable but
/// unsupported type (say `.txt`) is never served.
pub fn content_type(name: impl AsRef<Path>) -> Option<Mime> {
    let ext = allowed_extension(name)?;
    let guessed = mime_guess::from_ext(&ext).first();
    Some(guessed.unwrap_or_else(|| {
        FALLBACK_CONTENT_TYPE
            .parse()
            .unwrap_or(mime_guess::mime::APPLICATION_OCTET_STREAM)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_is_case_insensitive() {
        assert!(is_allowed("clip.mp4"));
        assert!(is_allowed("CLIP.MKV"));
        assert!(is_allowed("trailer.WebM"));
        assert!(!is_allowed("notes.txt"));
        assert!(!is_allowed("mp4"));
        assert!(!is_allowed("archive.mp4.zip"));
    }

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!("video/mp4", content_type("a.mp4").unwrap().essence_str());
        assert_eq!("video/webm", content_type("a.webm").unwrap().essence_str());
        assert_eq!("video/quicktime", content_type("a.MOV").unwrap().essence_str());
        assert!(content_type("a.txt").is_none());
        assert!(content_type("README").is_none());
    }

    #[test]
    fn test_every_allowed_extension_has_a_video_type() {
        for ext in ALLOWED_EXTENSIONS {
            let mime = content_type(format!("x.{ext}")).unwrap();
            assert_eq!("video", mime.type_().as_str(), "extension {ext}");
        }
    }
}
