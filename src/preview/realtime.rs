//! Wall-clock driver
//!
//! Sleeps on the tokio timer until each zone deadline and feeds the elapsed
//! time into the scheduler. The scheduler itself stays synchronous.

use std::time::Duration;

use log::info;
use tokio::time::{sleep_until, Instant};

use super::scheduler::{CursorEvent, PlaybackScheduler};
use super::surface::MediaSurface;

/// Play the running session for at most `horizon`, calling `on_event` for
/// every cursor transition as it happens.
///
/// Returns early once the show is finished. The session is stopped before
/// returning.
pub async fn run_for<S, F>(scheduler: &mut PlaybackScheduler<S>, horizon: Duration, mut on_event: F)
where
    S: MediaSurface,
    F: FnMut(&CursorEvent),
{
    let origin = Instant::now();
    let horizon_ms = u64::try_from(horizon.as_millis()).unwrap_or(u64::MAX);
    let base_ms = scheduler.elapsed_ms();

    while !scheduler.is_finished() {
        let Some(deadline) = scheduler.next_deadline_ms() else {
            break;
        };
        let target = deadline.saturating_sub(base_ms);
        if target > horizon_ms {
            break;
        }

        sleep_until(origin + Duration::from_millis(target)).await;
        for event in scheduler.advance_to(deadline) {
            on_event(&event);
        }
    }

    info!("[PREVIEW] Real-time run ended at {} ms", scheduler.elapsed_ms());
    scheduler.stop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layout::{Layout, Resolution, Zone};
    use crate::preview::{CursorState, HeadlessSurface, LoopPolicy};

    #[tokio::test(start_paused = true)]
    async fn test_runs_show_to_completion() {
        let mut zone = Zone::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        zone.items.append("a.png", Some(1.0));
        zone.items.append("b.png", Some(1.0));
        let layout = Layout {
            zones: vec![zone],
            ..Layout::empty(Resolution::default())
        };

        let mut scheduler = PlaybackScheduler::new(HeadlessSurface::new(), LoopPolicy::Once);
        scheduler.start(&layout);

        let mut seen = Vec::new();
        run_for(&mut scheduler, Duration::from_secs(10), |e| seen.push(e.to)).await;

        assert_eq!(
            seen,
            vec![CursorState::Playing(1), CursorState::Exhausted { held: Some(1) }]
        );
        assert!(!scheduler.is_running());
    }
}
