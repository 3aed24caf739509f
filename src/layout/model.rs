//! Layout data model
//!
//! Record shape shared with the rendering surface and the export pipeline:
//! `{id, name, resolution, zones:[{id,x,y,width,height,items:[{mediaRef,durationSeconds}]}]}`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timeline::ZoneTimeline;
use crate::geometry::Rect;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Fresh random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a zone within a layout
    ZoneId
);

uuid_id!(
    /// Identifier of a persisted layout
    LayoutId
);

/// Target device resolution. Metadata only: the editing stage keeps its
/// fixed size whichever value is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "HD 720P")]
    Hd720,
    #[default]
    #[serde(rename = "Full HD 1080P")]
    FullHd1080,
    #[serde(rename = "Ultra HD 4K")]
    Uhd4k,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::Hd720, Resolution::FullHd1080, Resolution::Uhd4k];

    /// Pixel dimensions `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Resolution::Hd720 => (1280, 720),
            Resolution::FullHd1080 => (1920, 1080),
            Resolution::Uhd4k => (3840, 2160),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Hd720 => "HD 720P",
            Resolution::FullHd1080 => "Full HD 1080P",
            Resolution::Uhd4k => "Ultra HD 4K",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Resolution {
    type Err = String;

    /// Accepts the product label or a short form (`720p`, `1080p`, `4k`).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "hd 720p" | "720p" | "720" => Ok(Resolution::Hd720),
            "full hd 1080p" | "1080p" | "1080" => Ok(Resolution::FullHd1080),
            "ultra hd 4k" | "4k" | "2160p" => Ok(Resolution::Uhd4k),
            _ => Err(format!("unknown resolution '{}'", s)),
        }
    }
}

/// A rectangular region with its media sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(default)]
    pub items: ZoneTimeline,
}

impl Zone {
    /// New empty zone with a fresh id
    pub fn new(rect: Rect) -> Self {
        Self {
            id: ZoneId::new(),
            rect,
            items: ZoneTimeline::new(),
        }
    }
}

/// Partial geometry update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZonePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl ZonePatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.width.is_none() && self.height.is_none()
    }

    /// Merge into `rect`
    pub fn apply(&self, rect: &Rect) -> Rect {
        Rect {
            x: self.x.unwrap_or(rect.x),
            y: self.y.unwrap_or(rect.y),
            width: self.width.unwrap_or(rect.width),
            height: self.height.unwrap_or(rect.height),
        }
    }
}

impl From<Rect> for ZonePatch {
    fn from(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
        }
    }
}

/// A named composition of zones.
///
/// The edit buffer has no id until it is loaded from a persisted layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub id: Option<LayoutId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

impl Layout {
    /// Empty unnamed buffer
    pub fn empty(resolution: Resolution) -> Self {
        Self {
            id: None,
            name: String::new(),
            resolution,
            zones: Vec::new(),
        }
    }

    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == *id)
    }

    pub fn zone_mut(&mut self, id: &ZoneId) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|z| z.id == *id)
    }

    /// Z-order position (0 = bottom)
    pub fn z_index(&self, id: &ZoneId) -> Option<usize> {
        self.zones.iter().position(|z| z.id == *id)
    }

    /// The top-most zone, which is the one selected for editing
    pub fn active_zone(&self) -> Option<&Zone> {
        self.zones.last()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
