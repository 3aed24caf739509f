//! Host media surface
//!
//! The rendering side owns the actual media elements. The scheduler only
//! asks whether a video is ready, tells it to play, and rewinds it when the
//! zone moves on.

use thiserror::Error;

use crate::layout::{MediaRef, ZoneId};

/// The host refused to start playback (for example an autoplay policy).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("playback rejected: {reason}")]
pub struct PlaybackRejected {
    pub reason: String,
}

impl PlaybackRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Video control surface provided by the host
pub trait MediaSurface {
    /// Whether the video element has buffered enough to play
    fn is_ready(&self, zone: ZoneId, media: &MediaRef) -> bool;

    /// Start playback
    fn play(&mut self, zone: ZoneId, media: &MediaRef) -> Result<(), PlaybackRejected>;

    /// Pause and seek back to position 0
    fn rewind(&mut self, zone: ZoneId, media: &MediaRef);
}

/// A call made against [`HeadlessSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Play(ZoneId, MediaRef),
    Rewind(ZoneId, MediaRef),
}

/// Surface with no real media: every video is ready and plays, and each
/// call is recorded.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    calls: Vec<SurfaceCall>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }
}

impl MediaSurface for HeadlessSurface {
    fn is_ready(&self, _zone: ZoneId, _media: &MediaRef) -> bool {
        true
    }

    fn play(&mut self, zone: ZoneId, media: &MediaRef) -> Result<(), PlaybackRejected> {
        self.calls.push(SurfaceCall::Play(zone, media.clone()));
        Ok(())
    }

    fn rewind(&mut self, zone: ZoneId, media: &MediaRef) {
        self.calls.push(SurfaceCall::Rewind(zone, media.clone()));
    }
}
