//! Media references and the drop catalog
//!
//! Media assets are owned by the host. The core only stores a reference
//! string and infers the kind from its suffix.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MosaicError, Result};

/// Suffix that marks a media reference as video.
const VIDEO_SUFFIX: &str = ".mp4";

/// Kind of media a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" | "img" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            _ => Err(format!("unknown media type '{}'", s)),
        }
    }
}

/// Opaque URL or path of an externally supplied asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    pub fn new(src: impl Into<String>) -> Self {
        Self(src.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Video if the reference ends in `.mp4`, image otherwise.
    ///
    /// Reachability is never checked.
    pub fn kind(&self) -> MediaKind {
        if self.0.ends_with(VIDEO_SUFFIX) {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind() == MediaKind::Video
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaRef {
    fn from(src: &str) -> Self {
        Self::new(src)
    }
}

impl From<String> for MediaRef {
    fn from(src: String) -> Self {
        Self(src)
    }
}

/// What a drag-and-drop source yields on drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropPayload {
    pub media_id: String,
    pub media_type: MediaKind,
}

impl DropPayload {
    pub fn new(media_id: impl Into<String>, media_type: MediaKind) -> Self {
        Self {
            media_id: media_id.into(),
            media_type,
        }
    }
}

/// A gallery entry the user can drop onto a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: String,
    pub src: MediaRef,
    /// Suggested display time; the timeline default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

/// Image and video galleries, looked up by drop payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaCatalog {
    #[serde(default)]
    pub images: Vec<MediaAsset>,
    #[serde(default)]
    pub videos: Vec<MediaAsset>,
}

impl MediaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MosaicError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| MosaicError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn add(&mut self, kind: MediaKind, asset: MediaAsset) {
        match kind {
            MediaKind::Image => self.images.push(asset),
            MediaKind::Video => self.videos.push(asset),
        }
    }

    /// Find the asset a drop refers to, searching only the gallery named by
    /// the payload's media type.
    pub fn resolve(&self, payload: &DropPayload) -> Option<&MediaAsset> {
        let gallery = match payload.media_type {
            MediaKind::Image => &self.images,
            MediaKind::Video => &self.videos,
        };
        gallery.iter().find(|asset| asset.id == payload.media_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_inferred_from_suffix() {
        assert_eq!(MediaRef::new("media/intro.mp4").kind(), MediaKind::Video);
        assert_eq!(MediaRef::new("media/logo.png").kind(), MediaKind::Image);
        assert_eq!(MediaRef::new("https://cdn/x.mp4?v=2").kind(), MediaKind::Image);
        assert_eq!(MediaRef::new("clip.MP4").kind(), MediaKind::Image);
    }

    #[test]
    fn test_resolve_respects_media_type() {
        let mut catalog = MediaCatalog::new();
        catalog.add(
            MediaKind::Image,
            MediaAsset {
                id: "1".into(),
                src: "a.png".into(),
                duration_seconds: Some(6.0),
            },
        );
        catalog.add(
            MediaKind::Video,
            MediaAsset {
                id: "1".into(),
                src: "b.mp4".into(),
                duration_seconds: Some(12.0),
            },
        );

        let image = catalog.resolve(&DropPayload::new("1", MediaKind::Image)).unwrap();
        assert_eq!(image.src.as_str(), "a.png");
        let video = catalog.resolve(&DropPayload::new("1", MediaKind::Video)).unwrap();
        assert_eq!(video.src.as_str(), "b.mp4");
        assert!(catalog.resolve(&DropPayload::new("2", MediaKind::Video)).is_none());
    }

    #[test]
    fn test_catalog_json_shape() {
        let json = r#"{"images":[{"id":"img-1","src":"one.jpg","durationSeconds":5}],"videos":[]}"#;
        let catalog: MediaCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.images[0].duration_seconds, Some(5.0));
        assert!(catalog.videos.is_empty());
    }
}
