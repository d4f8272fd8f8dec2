//! Input adapters.
//!
//! Translates keys, wheel deltas and touch coordinates into navigation
//! commands. Nothing here touches the DOM; the session feeds in raw event
//! values and acts on what comes back.

use crate::navigation::SLIDE_WIDTH_VW;
use crate::schema::KioskOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Previous,
    Next,
    First,
    Last,
    Page(usize),
}

/// Maps a `KeyboardEvent.key` to a command. Mapped keys should have their
/// default scrolling suppressed.
pub fn key_command(key: &str) -> Option<NavCommand> {
    match key {
        "ArrowLeft" => Some(NavCommand::Previous),
        "ArrowRight" => Some(NavCommand::Next),
        "Home" => Some(NavCommand::First),
        "End" => Some(NavCommand::Last),
        _ => None,
    }
}

/// Maps the last wheel delta of a burst to a command.
pub fn wheel_command(delta_y: f64) -> Option<NavCommand> {
    if delta_y > 0.0 {
        Some(NavCommand::Next)
    } else if delta_y < 0.0 {
        Some(NavCommand::Previous)
    } else {
        None
    }
}

/// Latest wheel delta of a burst. Only the final event acts once the
/// wheel has been quiet for the debounce window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelBurst {
    latest: Option<f64>,
}

impl WheelBurst {
    pub fn record(&mut self, delta_y: f64) {
        self.latest = Some(delta_y);
    }

    /// Ends the burst and maps its last delta.
    pub fn flush(&mut self) -> Option<NavCommand> {
        wheel_command(self.latest.take()?)
    }
}

/// Distances (CSS pixels) that classify a touch drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeThresholds {
    /// Minimum horizontal travel to commit to a page change.
    pub min_swipe_px: f64,
    /// Vertical travel that cancels a vertical-dominant gesture on release.
    pub max_vertical_drift_px: f64,
    /// Vertical travel tolerated before a move counts as vertical-dominant.
    pub vertical_slop_px: f64,
}

impl Default for SwipeThresholds {
    fn default() -> Self {
        Self {
            min_swipe_px: 50.0,
            max_vertical_drift_px: 100.0,
            vertical_slop_px: 10.0,
        }
    }
}

impl From<&KioskOptions> for SwipeThresholds {
    fn from(options: &KioskOptions) -> Self {
        Self {
            min_swipe_px: options.min_swipe_px,
            max_vertical_drift_px: options.max_vertical_drift_px,
            vertical_slop_px: options.vertical_slop_px,
        }
    }
}

/// What to do with a touch move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragUpdate {
    /// Vertical-dominant; let the browser handle it.
    Ignore,
    /// Horizontal drag; follow the finger by `dx` pixels.
    Follow { dx: f64 },
}

/// Result of releasing a tracked swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    Commit(NavCommand),
    SnapBack,
}

/// Single-finger swipe tracker for the paging mode.
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    thresholds: SwipeThresholds,
    start: Option<(f64, f64)>,
}

impl SwipeTracker {
    pub fn new(thresholds: SwipeThresholds) -> Self {
        Self {
            thresholds,
            start: None,
        }
    }

    pub fn begin(&mut self, x: f64, y: f64) {
        self.start = Some((x, y));
    }

    /// Starts tracking only when no slide is running. A touch that lands
    /// mid-transition is dropped entirely, including any earlier start.
    pub fn begin_if(&mut self, idle: bool, x: f64, y: f64) -> bool {
        if idle {
            self.begin(x, y);
        } else {
            self.cancel();
        }
        idle
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }

    /// Classifies a move. `None` when no swipe is being tracked.
    pub fn track(&self, x: f64, y: f64) -> Option<DragUpdate> {
        let (sx, sy) = self.start?;
        let (dx, dy) = (x - sx, y - sy);
        if dy.abs() > dx.abs() && dy.abs() > self.thresholds.vertical_slop_px {
            Some(DragUpdate::Ignore)
        } else {
            Some(DragUpdate::Follow { dx })
        }
    }

    /// Ends the swipe. A missing end point counts as no movement.
    pub fn release(&mut self, end: Option<(f64, f64)>) -> Option<SwipeOutcome> {
        let (sx, sy) = self.start.take()?;
        let (ex, ey) = end.unwrap_or((sx, sy));
        let (dx, dy) = (ex - sx, ey - sy);

        if dy.abs() > self.thresholds.max_vertical_drift_px && dy.abs() > dx.abs() {
            return Some(SwipeOutcome::SnapBack);
        }
        if dx.abs() >= self.thresholds.min_swipe_px && dx.abs() > dy.abs() {
            // swiped left => next page
            let command = if dx < 0.0 {
                NavCommand::Next
            } else {
                NavCommand::Previous
            };
            return Some(SwipeOutcome::Commit(command));
        }
        Some(SwipeOutcome::SnapBack)
    }
}

/// Wrapper offset while a finger drags `dx` pixels away from the resting
/// position on a viewport `viewport_width` pixels wide.
pub fn drag_offset_vw(resting_vw: f64, dx: f64, viewport_width: f64) -> f64 {
    if viewport_width <= 0.0 {
        return resting_vw;
    }
    resting_vw + dx / viewport_width * SLIDE_WIDTH_VW
}

/// Relative drag for the native scroll container: no thresholds, the
/// container simply follows the finger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollDrag {
    start_x: f64,
    start_scroll: f64,
}

impl ScrollDrag {
    pub fn new(start_x: f64, start_scroll: f64) -> Self {
        Self {
            start_x,
            start_scroll,
        }
    }

    pub fn scroll_for(&self, x: f64) -> f64 {
        (self.start_scroll - (x - self.start_x)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_from(x: f64, y: f64) -> SwipeTracker {
        let mut tracker = SwipeTracker::new(SwipeThresholds::default());
        tracker.begin(x, y);
        tracker
    }

    #[test]
    fn test_key_command() {
        assert_eq!(key_command("ArrowLeft"), Some(NavCommand::Previous));
        assert_eq!(key_command("ArrowRight"), Some(NavCommand::Next));
        assert_eq!(key_command("Home"), Some(NavCommand::First));
        assert_eq!(key_command("End"), Some(NavCommand::Last));
        assert_eq!(key_command("ArrowUp"), None);
        assert_eq!(key_command("a"), None);
    }

    #[test]
    fn test_wheel_command() {
        assert_eq!(wheel_command(3.0), Some(NavCommand::Next));
        assert_eq!(wheel_command(-120.0), Some(NavCommand::Previous));
        assert_eq!(wheel_command(0.0), None);
    }

    #[test]
    fn test_wheel_burst_acts_on_last_delta() {
        let mut burst = WheelBurst::default();
        assert_eq!(burst.flush(), None);
        for delta in [4.0, 12.0, -2.0, -8.0] {
            burst.record(delta);
        }
        assert_eq!(burst.flush(), Some(NavCommand::Previous));
        assert_eq!(burst.flush(), None);
        burst.record(0.0);
        assert_eq!(burst.flush(), None);
    }

    #[test]
    fn test_touch_during_transition_is_not_tracked() {
        let mut tracker = tracker_from(50.0, 50.0);
        assert!(!tracker.begin_if(false, 300.0, 300.0));
        assert_eq!(tracker.track(100.0, 300.0), None);
        assert_eq!(tracker.release(Some((100.0, 300.0))), None);

        assert!(tracker.begin_if(true, 300.0, 300.0));
        assert_eq!(
            tracker.release(Some((100.0, 300.0))),
            Some(SwipeOutcome::Commit(NavCommand::Next))
        );
    }

    #[test]
    fn test_short_swipe_snaps_back() {
        let mut tracker = tracker_from(200.0, 300.0);
        assert_eq!(
            tracker.release(Some((160.0, 305.0))),
            Some(SwipeOutcome::SnapBack)
        );
        assert_eq!(tracker.release(Some((0.0, 0.0))), None);
    }

    #[test]
    fn test_vertical_dominant_swipe_cancels() {
        let mut tracker = tracker_from(200.0, 300.0);
        assert_eq!(
            tracker.release(Some((120.0, 420.0))),
            Some(SwipeOutcome::SnapBack)
        );
    }

    #[test]
    fn test_swipe_commits_by_direction() {
        let mut tracker = tracker_from(300.0, 300.0);
        assert_eq!(
            tracker.release(Some((220.0, 310.0))),
            Some(SwipeOutcome::Commit(NavCommand::Next))
        );
        tracker.begin(300.0, 300.0);
        assert_eq!(
            tracker.release(Some((350.0, 300.0))),
            Some(SwipeOutcome::Commit(NavCommand::Previous))
        );
    }

    #[test]
    fn test_release_without_tracking_or_end() {
        let mut tracker = SwipeTracker::default();
        assert_eq!(tracker.release(Some((0.0, 0.0))), None);
        tracker.begin(10.0, 10.0);
        assert_eq!(tracker.release(None), Some(SwipeOutcome::SnapBack));
    }

    #[test]
    fn test_track_ignores_vertical_moves() {
        let tracker = tracker_from(100.0, 100.0);
        assert_eq!(tracker.track(104.0, 130.0), Some(DragUpdate::Ignore));
        // within slop: still a horizontal drag
        assert_eq!(tracker.track(95.0, 108.0), Some(DragUpdate::Follow { dx: -5.0 }));
        assert_eq!(tracker.track(40.0, 120.0), Some(DragUpdate::Follow { dx: -60.0 }));
        assert_eq!(SwipeTracker::default().track(1.0, 1.0), None);
    }

    #[test]
    fn test_drag_offset() {
        assert_eq!(drag_offset_vw(-100.0, -480.0, 1920.0), -125.0);
        assert_eq!(drag_offset_vw(-100.0, 50.0, 0.0), -100.0);
    }

    #[test]
    fn test_scroll_drag() {
        let drag = ScrollDrag::new(500.0, 1920.0);
        assert_eq!(drag.scroll_for(400.0), 2020.0);
        assert_eq!(drag.scroll_for(600.0), 1820.0);
        assert_eq!(ScrollDrag::new(0.0, 10.0).scroll_for(100.0), 0.0);
    }
}
