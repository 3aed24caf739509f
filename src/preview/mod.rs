//! Preview Module
//!
//! Runs a saved or in-progress layout as a timed show: one cursor per zone,
//! driven by cancellable timers on a cooperative clock.

mod scheduler;
mod surface;
mod timer;

#[cfg(feature = "realtime")]
pub mod realtime;

pub use scheduler::{
    CursorEvent, CursorState, LoopPolicy, PlaybackScheduler, PlaybackWarning, ZoneFrame,
};
pub use surface::{HeadlessSurface, MediaSurface, PlaybackRejected, SurfaceCall};
pub use timer::{TimerFired, TimerHandle, TimerQueue};
