//! Playback Scheduler
//!
//! Drives one cursor per zone through that zone's timeline during a preview
//! session. Each zone runs its own chain of one-shot timers: when the
//! current item's duration elapses the cursor advances and the next timer is
//! scheduled. Zones with different item counts or durations drift apart
//! naturally; nothing orders one zone against another.
//!
//! The scheduler reads a snapshot of the layout taken at `start` and never
//! writes back to the store.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::surface::MediaSurface;
use super::timer::{TimerFired, TimerHandle, TimerQueue};
use crate::geometry::Rect;
use crate::layout::{Layout, MediaRef, TimelineItem, Zone, ZoneId, ZoneTimeline};

/// Per-zone cursor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorState {
    /// No session running
    #[default]
    Idle,
    /// Showing the item at this index
    Playing(usize),
    /// Ran past the last item and keeps showing it. `None` for a zone
    /// without items.
    Exhausted { held: Option<usize> },
}

impl CursorState {
    /// Index of the item on screen, if any
    pub fn active_index(&self) -> Option<usize> {
        match self {
            CursorState::Idle => None,
            CursorState::Playing(index) => Some(*index),
            CursorState::Exhausted { held } => *held,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, CursorState::Exhausted { .. })
    }
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorState::Idle => write!(f, "Idle"),
            CursorState::Playing(index) => write!(f, "Playing({})", index),
            CursorState::Exhausted { held: Some(index) } => write!(f, "Exhausted({})", index),
            CursorState::Exhausted { held: None } => write!(f, "Exhausted(empty)"),
        }
    }
}

/// What happens when a zone plays its last item to the end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPolicy {
    /// Hold the last item forever
    #[default]
    Once,
    /// Each zone wraps back to its first item on its own
    LoopZone,
    /// Once every zone is exhausted, all zones restart together
    LoopShow,
}

impl FromStr for LoopPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "once" => Ok(LoopPolicy::Once),
            "loop_zone" | "zone" => Ok(LoopPolicy::LoopZone),
            "loop_show" | "show" => Ok(LoopPolicy::LoopShow),
            _ => Err(format!("unknown loop policy '{}'", s)),
        }
    }
}

impl fmt::Display for LoopPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopPolicy::Once => write!(f, "once"),
            LoopPolicy::LoopZone => write!(f, "loop-zone"),
            LoopPolicy::LoopShow => write!(f, "loop-show"),
        }
    }
}

/// A cursor transition, timed from the session start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorEvent {
    pub zone: ZoneId,
    pub from: CursorState,
    pub to: CursorState,
    pub at_ms: u64,
}

/// A host playback rejection that was caught and logged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackWarning {
    pub zone: ZoneId,
    pub media: MediaRef,
    pub at_ms: u64,
    pub reason: String,
}

/// What the rendering surface needs to draw one zone
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFrame<'a> {
    pub zone: ZoneId,
    pub z_index: usize,
    pub rect: Rect,
    pub state: CursorState,
    pub item: Option<&'a TimelineItem>,
}

#[derive(Debug)]
struct ZoneCursor {
    zone: ZoneId,
    rect: Rect,
    timeline: ZoneTimeline,
    state: CursorState,
    /// A video is on screen but the host has not reported it ready yet
    awaiting_ready: bool,
}

impl ZoneCursor {
    fn new(zone: &Zone) -> Self {
        Self {
            zone: zone.id,
            rect: zone.rect,
            timeline: zone.items.clone(),
            state: CursorState::Idle,
            awaiting_ready: false,
        }
    }

    fn active_item(&self) -> Option<&TimelineItem> {
        self.state.active_index().and_then(|i| self.timeline.get(i))
    }

    fn active_video(&self) -> Option<MediaRef> {
        self.active_item()
            .filter(|item| item.media_ref.is_video())
            .map(|item| item.media_ref.clone())
    }
}

/// Preview session driver
pub struct PlaybackScheduler<S: MediaSurface> {
    surface: S,
    policy: LoopPolicy,
    timers: TimerQueue,
    /// Z-order, as in the layout
    cursors: Vec<ZoneCursor>,
    /// Outstanding timer per zone
    handles: HashMap<ZoneId, TimerHandle>,
    overall_duration_ms: u64,
    session_start_ms: u64,
    started: bool,
    warnings: Vec<PlaybackWarning>,
}

impl<S: MediaSurface> PlaybackScheduler<S> {
    pub fn new(surface: S, policy: LoopPolicy) -> Self {
        Self {
            surface,
            policy,
            timers: TimerQueue::new(),
            cursors: Vec::new(),
            handles: HashMap::new(),
            overall_duration_ms: 0,
            session_start_ms: 0,
            started: false,
            warnings: Vec::new(),
        }
    }

    pub fn policy(&self) -> LoopPolicy {
        self.policy
    }

    /// Takes effect at the next zone transition.
    pub fn set_policy(&mut self, policy: LoopPolicy) {
        self.policy = policy;
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // ========================================================================
    // Session Control
    // ========================================================================

    /// Begin a preview of `layout`.
    ///
    /// Any running session is stopped first, so no timer from it can fire
    /// into the new one. Every zone with items starts at `Playing(0)`; empty
    /// zones are exhausted from the start.
    pub fn start(&mut self, layout: &Layout) {
        self.stop();

        self.session_start_ms = self.timers.now_ms();
        self.warnings.clear();
        self.cursors = layout.zones.iter().map(ZoneCursor::new).collect();
        self.overall_duration_ms = self
            .cursors
            .iter()
            .map(|c| c.timeline.total_duration_ms())
            .max()
            .unwrap_or(0);

        for idx in 0..self.cursors.len() {
            if self.cursors[idx].timeline.is_empty() {
                self.cursors[idx].state = CursorState::Exhausted { held: None };
            } else {
                self.enter_item(idx, 0);
            }
        }
        self.started = true;

        info!(
            "[PREVIEW] Started '{}': {} zones, overall {} ms, policy {}",
            layout.name,
            self.cursors.len(),
            self.overall_duration_ms,
            self.policy
        );
    }

    /// Cancel every pending zone timer and return all cursors to `Idle`.
    ///
    /// Safe to call in any state, any number of times.
    pub fn stop(&mut self) {
        let cancelled = self
            .handles
            .drain()
            .filter(|(_, handle)| self.timers.cancel(*handle))
            .count();

        for idx in 0..self.cursors.len() {
            self.leave_item(idx);
            self.cursors[idx].state = CursorState::Idle;
        }

        if self.started {
            debug!("[PREVIEW] Stopped, cancelled {} pending timers", cancelled);
        }
        self.started = false;
    }

    /// Run every timer due up to `elapsed_ms` after the session start.
    ///
    /// Returns the cursor transitions in the order they happened. Time never
    /// moves backwards; an earlier `elapsed_ms` does nothing.
    pub fn advance_to(&mut self, elapsed_ms: u64) -> Vec<CursorEvent> {
        let until = self.session_start_ms.saturating_add(elapsed_ms);
        let mut events = Vec::new();
        while let Some(fired) = self.timers.pop_due(until) {
            self.fire(fired, &mut events);
        }
        self.timers.advance_clock(until);
        events
    }

    pub fn advance_by(&mut self, delta_ms: u64) -> Vec<CursorEvent> {
        let target = self.elapsed_ms().saturating_add(delta_ms);
        self.advance_to(target)
    }

    /// The host reports that the video in `zone` can play now.
    ///
    /// Returns true if a deferred play was issued.
    pub fn media_ready(&mut self, zone: ZoneId) -> bool {
        let Some(idx) = self.index_of(zone) else {
            return false;
        };
        if !self.cursors[idx].awaiting_ready {
            return false;
        }
        self.cursors[idx].awaiting_ready = false;
        match self.cursors[idx].active_video() {
            Some(media) => {
                self.play_video(zone, &media);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Time since the current session started
    pub fn elapsed_ms(&self) -> u64 {
        self.timers.now_ms().saturating_sub(self.session_start_ms)
    }

    /// Elapsed time at which the next zone timer fires
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.timers
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(self.session_start_ms))
    }

    /// Longest zone timeline of the session, `0` for an empty layout
    pub fn overall_duration_ms(&self) -> u64 {
        self.overall_duration_ms
    }

    pub fn cursor(&self, zone: ZoneId) -> Option<CursorState> {
        self.index_of(zone).map(|idx| self.cursors[idx].state)
    }

    /// All cursors in z-order
    pub fn cursors(&self) -> Vec<(ZoneId, CursorState)> {
        self.cursors.iter().map(|c| (c.zone, c.state)).collect()
    }

    pub fn pending_timers(&self) -> usize {
        self.handles.len()
    }

    pub fn is_running(&self) -> bool {
        self.started
    }

    /// Every zone is exhausted and no timer is left.
    pub fn is_finished(&self) -> bool {
        self.started && self.handles.is_empty() && self.cursors.iter().all(|c| c.state.is_exhausted())
    }

    /// Playback rejections caught during this session
    pub fn warnings(&self) -> &[PlaybackWarning] {
        &self.warnings
    }

    /// Render contract: every zone's rectangle and on-screen item, bottom first
    pub fn frame(&self) -> Vec<ZoneFrame<'_>> {
        self.cursors
            .iter()
            .enumerate()
            .map(|(z_index, c)| ZoneFrame {
                zone: c.zone,
                z_index,
                rect: c.rect,
                state: c.state,
                item: c.active_item(),
            })
            .collect()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn index_of(&self, zone: ZoneId) -> Option<usize> {
        self.cursors.iter().position(|c| c.zone == zone)
    }

    fn all_exhausted(&self) -> bool {
        self.cursors.iter().all(|c| c.state.is_exhausted())
    }

    /// Put cursor `idx` on `item` and schedule the timer that ends it.
    fn enter_item(&mut self, idx: usize, item: usize) {
        let cursor = &mut self.cursors[idx];
        cursor.state = CursorState::Playing(item);
        let delay = cursor.timeline.item_duration_ms(item).unwrap_or(0);
        let zone = cursor.zone;

        if let Some(previous) = self.handles.remove(&zone) {
            self.timers.cancel(previous);
        }
        // An item whose end lies past the clock's range stays on screen
        if self.timers.now_ms().checked_add(delay).is_some() {
            let handle = self.timers.schedule(zone, delay);
            self.handles.insert(zone, handle);
        } else {
            debug!("[PREVIEW] Zone {} item {} never ends", zone, item);
        }
        self.request_play(idx);
    }

    /// Rewind the video the cursor is moving off, if any.
    fn leave_item(&mut self, idx: usize) {
        let cursor = &mut self.cursors[idx];
        cursor.awaiting_ready = false;
        let zone = cursor.zone;
        if let Some(media) = cursor.active_video() {
            self.surface.rewind(zone, &media);
        }
    }

    /// Play the current video now if the host has it ready, otherwise wait
    /// for `media_ready`.
    fn request_play(&mut self, idx: usize) {
        let zone = self.cursors[idx].zone;
        let Some(media) = self.cursors[idx].active_video() else {
            return;
        };
        if self.surface.is_ready(zone, &media) {
            self.play_video(zone, &media);
        } else {
            debug!("[PREVIEW] Zone {} waiting for {} to load", zone, media);
            self.cursors[idx].awaiting_ready = true;
        }
    }

    /// Rejected playback is a warning, never a scheduler failure.
    fn play_video(&mut self, zone: ZoneId, media: &MediaRef) {
        match self.surface.play(zone, media) {
            Ok(()) => debug!("[PREVIEW] Zone {} playing {}", zone, media),
            Err(rejected) => {
                tracing::warn!(
                    zone = %zone,
                    media = %media,
                    reason = %rejected.reason,
                    "video playback rejected, zone keeps advancing"
                );
                self.warnings.push(PlaybackWarning {
                    zone,
                    media: media.clone(),
                    at_ms: self.elapsed_ms(),
                    reason: rejected.reason,
                });
            }
        }
    }

    fn fire(&mut self, fired: TimerFired, events: &mut Vec<CursorEvent>) {
        if self.handles.get(&fired.zone) != Some(&fired.handle) {
            debug!("[PREVIEW] Ignored stale timer for zone {}", fired.zone);
            return;
        }
        self.handles.remove(&fired.zone);

        let Some(idx) = self.index_of(fired.zone) else {
            return;
        };
        let from = self.cursors[idx].state;
        let CursorState::Playing(current) = from else {
            return;
        };

        let len = self.cursors[idx].timeline.len();
        let wraps = self.policy == LoopPolicy::LoopZone
            && self.cursors[idx].timeline.total_duration_ms() > 0;

        if current + 1 < len {
            self.leave_item(idx);
            self.enter_item(idx, current + 1);
        } else if wraps {
            self.leave_item(idx);
            self.enter_item(idx, 0);
        } else {
            self.cursors[idx].state = CursorState::Exhausted {
                held: Some(current),
            };
        }

        let at_ms = self.elapsed_ms();
        events.push(CursorEvent {
            zone: fired.zone,
            from,
            to: self.cursors[idx].state,
            at_ms,
        });

        if self.policy == LoopPolicy::LoopShow
            && self.overall_duration_ms > 0
            && self.all_exhausted()
        {
            debug!("[PREVIEW] All zones exhausted at {} ms, restarting show", at_ms);
            self.restart_show(at_ms, events);
        }
    }

    fn restart_show(&mut self, at_ms: u64, events: &mut Vec<CursorEvent>) {
        for idx in 0..self.cursors.len() {
            if self.cursors[idx].timeline.is_empty() {
                continue;
            }
            let from = self.cursors[idx].state;
            self.leave_item(idx);
            self.enter_item(idx, 0);
            events.push(CursorEvent {
                zone: self.cursors[idx].zone,
                from,
                to: self.cursors[idx].state,
                at_ms,
            });
        }
    }
}
