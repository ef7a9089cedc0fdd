// src/domain/media.rs
//
// Media reference model shared by users, courses and lessons.
//
// A stored media field is either an external URL kept verbatim or an
// opaque handle into the blob store. Resolving a reference to a display
// URL is a separate step; resolved URLs are never persisted back.

use serde::{Deserialize, Serialize};

/// Reference to binary media attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaSource {
    /// Externally hosted content, referenced by URL as-is.
    External { url: String },
    /// Content owned by the blob store, keyed by its storage path.
    Stored { path: String },
}

impl MediaSource {
    pub fn external(url: impl Into<String>) -> Self {
        MediaSource::External { url: url.into() }
    }

    pub fn stored(path: impl Into<String>) -> Self {
        MediaSource::Stored { path: path.into() }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, MediaSource::Stored { .. })
    }

    /// The external URL, if this reference is not store-backed.
    pub fn external_url(&self) -> Option<&str> {
        match self {
            MediaSource::External { url } => Some(url),
            MediaSource::Stored { .. } => None,
        }
    }
}

/// File content handed to an upload operation.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Informational size in megabytes, as displayed to users.
    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / (1024.0 * 1024.0)
    }
}

/// Instruction for one media slot in an update payload.
///
/// Modeled as an explicit tagged instruction instead of bare optional
/// fields so that "leave unchanged" and "clear the slot" cannot be
/// confused. The same instruction set drives every media slot (profile
/// photo, course image, lesson video, lesson attachment).
#[derive(Debug, Clone, Default)]
pub enum MediaPatch {
    /// Leave the slot exactly as stored.
    #[default]
    Keep,
    /// Clear the slot and any metadata derived from it.
    Remove,
    /// Replace the slot with an uploaded file (upload precedes the record write).
    UploadFile(MediaUpload),
    /// Replace the slot with an externally hosted URL.
    SetUrl(String),
}

impl MediaPatch {
    pub fn is_keep(&self) -> bool {
        matches!(self, MediaPatch::Keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_url_accessor() {
        let external = MediaSource::external("https://example.com/a.png");
        assert_eq!(external.external_url(), Some("https://example.com/a.png"));

        let stored = MediaSource::stored("courses/c1/image");
        assert_eq!(stored.external_url(), None);
        assert!(stored.is_stored());
    }

    #[test]
    fn test_upload_size_mb() {
        let upload = MediaUpload::new("video.mp4", vec![0u8; 2 * 1024 * 1024]);
        assert!((upload.size_mb() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_media_source_round_trips_as_json() {
        let source = MediaSource::stored("users/u1/photo");
        let json = serde_json::to_string(&source).unwrap();
        let back: MediaSource = serde_json::from_str(&json).unwrap();
        assert_eq!(source, back);
    }
}
