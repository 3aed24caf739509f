//! Layout Model
//!
//! Zones, layouts, media references and the per-zone timeline.

mod media;
mod model;
mod timeline;

pub use media::{DropPayload, MediaAsset, MediaCatalog, MediaKind, MediaRef};
pub use model::{Layout, LayoutId, Resolution, Zone, ZoneId, ZonePatch};
pub use timeline::{TimelineItem, ZoneTimeline, DEFAULT_ITEM_SECONDS};
