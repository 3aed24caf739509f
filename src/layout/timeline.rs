//! Zone Timeline
//!
//! The ordered `{media, duration}` entries of one zone. Media and duration
//! live in a single entry, so removing by index can never pair a media
//! reference with another item's duration.

use serde::{Deserialize, Serialize};

use super::media::MediaRef;
use crate::error::{MosaicError, Result};

/// Display time used when an item has no usable duration.
pub const DEFAULT_ITEM_SECONDS: f64 = 4.0;

fn coerce_seconds(seconds: Option<f64>) -> f64 {
    match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s,
        _ => DEFAULT_ITEM_SECONDS,
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds * 1000.0).round() as u64
}

/// Saturates at `u64::MAX` instead of overflowing.
fn sum_ms<'a>(items: impl Iterator<Item = &'a TimelineItem>) -> u64 {
    items.map(TimelineItem::duration_ms).fold(0, u64::saturating_add)
}

/// One timed media entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub media_ref: MediaRef,
    pub duration_seconds: f64,
}

impl TimelineItem {
    /// Build an item, coercing a missing or non-positive duration to the default.
    pub fn new(media_ref: impl Into<MediaRef>, duration_seconds: Option<f64>) -> Self {
        Self {
            media_ref: media_ref.into(),
            duration_seconds: coerce_seconds(duration_seconds),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        seconds_to_ms(self.duration_seconds)
    }
}

/// Ordered media sequence of a zone.
///
/// Every stored duration is positive; deserialized records are coerced the
/// same way `append` coerces new items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TimelineItem>", into = "Vec<TimelineItem>")]
pub struct ZoneTimeline {
    items: Vec<TimelineItem>,
}

impl From<Vec<TimelineItem>> for ZoneTimeline {
    fn from(items: Vec<TimelineItem>) -> Self {
        let items = items
            .into_iter()
            .map(|item| TimelineItem::new(item.media_ref, Some(item.duration_seconds)))
            .collect();
        Self { items }
    }
}

impl From<ZoneTimeline> for Vec<TimelineItem> {
    fn from(timeline: ZoneTimeline) -> Self {
        timeline.items
    }
}

impl ZoneTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimelineItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineItem> {
        self.items.iter()
    }

    /// Sum of all item durations in milliseconds, `0` when empty.
    pub fn total_duration_ms(&self) -> u64 {
        sum_ms(self.items.iter())
    }

    pub fn item_duration_ms(&self, index: usize) -> Option<u64> {
        self.items.get(index).map(TimelineItem::duration_ms)
    }

    /// Start time of the item at `index`, relative to the timeline start
    pub fn offset_of(&self, index: usize) -> Option<u64> {
        if index >= self.items.len() {
            return None;
        }
        Some(sum_ms(self.items[..index].iter()))
    }

    /// Index of the item showing `elapsed_ms` into a single forward pass.
    ///
    /// Past the end the last index is held. `None` only for an empty timeline.
    ///
    /// # Example
    /// ```
    /// use mosaic::layout::ZoneTimeline;
    /// let mut timeline = ZoneTimeline::new();
    /// timeline.append("a.png", Some(2.0));
    /// timeline.append("b.png", Some(3.0));
    /// assert_eq!(timeline.active_index_at(1999), Some(0));
    /// assert_eq!(timeline.active_index_at(2000), Some(1));
    /// assert_eq!(timeline.active_index_at(60_000), Some(1));
    /// ```
    pub fn active_index_at(&self, elapsed_ms: u64) -> Option<usize> {
        let mut end = 0u64;
        for (index, item) in self.items.iter().enumerate() {
            end = end.saturating_add(item.duration_ms());
            if elapsed_ms < end {
                return Some(index);
            }
        }
        self.items.len().checked_sub(1)
    }

    /// Append an item and return its index.
    ///
    /// `None`, zero, negative or non-finite durations become [`DEFAULT_ITEM_SECONDS`].
    pub fn append(&mut self, media_ref: impl Into<MediaRef>, duration_seconds: Option<f64>) -> usize {
        self.items.push(TimelineItem::new(media_ref, duration_seconds));
        self.items.len() - 1
    }

    /// Remove the item at `index` as one unit. `None` if out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<TimelineItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Change one item's duration.
    ///
    /// Returns `Ok(false)` when the index does not exist.
    pub fn set_duration(&mut self, index: usize, seconds: f64) -> Result<bool> {
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(MosaicError::InvalidDuration { seconds });
        }
        match self.items.get_mut(index) {
            Some(item) => {
                item.duration_seconds = seconds;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
