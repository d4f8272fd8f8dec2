//! # Navigation Controller
//!
//! Holds the current page and the `Idle`/`Transitioning` phase. The
//! controller is pure: it decides whether a request is accepted and what
//! the resulting [`Transition`] looks like, and leaves styling, indicator
//! updates and completion timing to the session.
//!
//! ## Rules
//!
//! A request is ignored when the target is out of `[0, page_count)`, equals
//! the current page, or a transition is still running. In
//! [`NavigationMode::Scroll`] the browser animates the scroll itself, so an
//! accepted request never enters `Transitioning`.

use crate::input::{NavCommand, SwipeOutcome};
use crate::schema::NavigationMode;
use log::debug;

/// Width of one slide in viewport-width units.
pub const SLIDE_WIDTH_VW: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// `Forward` iff `to > from`.
    pub fn between(from: usize, to: usize) -> Self {
        if to > from {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Transitioning,
}

/// An accepted page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
}

impl Transition {
    /// Horizontal offset of the slides wrapper once the transition lands.
    pub fn offset_vw(&self) -> f64 {
        offset_for(self.to)
    }
}

/// Resting wrapper offset for `index`.
pub fn offset_for(index: usize) -> f64 {
    -(index as f64) * SLIDE_WIDTH_VW
}

#[derive(Debug, Clone)]
pub struct NavigationController {
    page_count: usize,
    current: usize,
    phase: Phase,
    mode: NavigationMode,
}

impl NavigationController {
    pub fn new(page_count: usize, mode: NavigationMode) -> Self {
        Self {
            page_count,
            current: 0,
            phase: Phase::Idle,
            mode,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase == Phase::Transitioning
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.page_count
    }

    /// Wrapper offset for the current page, used to snap back after a drag.
    pub fn resting_offset_vw(&self) -> f64 {
        offset_for(self.current)
    }

    /// Requests a move to `target`. Returns the transition if accepted.
    pub fn go_to(&mut self, target: usize) -> Option<Transition> {
        if target >= self.page_count || target == self.current || self.is_transitioning() {
            return None;
        }
        let from = self.current;
        let transition = Transition {
            from,
            to: target,
            direction: Direction::between(from, target),
        };
        self.current = target;
        if self.mode == NavigationMode::Paging {
            self.phase = Phase::Transitioning;
        }
        debug!(
            "nav: {} -> {} ({:?})",
            transition.from, transition.to, transition.direction
        );
        Some(transition)
    }

    /// Moves `delta` pages relative to the current one.
    pub fn step(&mut self, delta: isize) -> Option<Transition> {
        let target = self.current.checked_add_signed(delta)?;
        self.go_to(target)
    }

    pub fn first(&mut self) -> Option<Transition> {
        self.go_to(0)
    }

    pub fn last(&mut self) -> Option<Transition> {
        let last = self.page_count.checked_sub(1)?;
        self.go_to(last)
    }

    pub fn apply(&mut self, command: NavCommand) -> Option<Transition> {
        match command {
            NavCommand::Previous => self.step(-1),
            NavCommand::Next => self.step(1),
            NavCommand::First => self.first(),
            NavCommand::Last => self.last(),
            NavCommand::Page(index) => self.go_to(index),
        }
    }

    /// Marks the running transition as finished. Returns `false` if there
    /// was none, so a late timer after `transitionend` is harmless.
    pub fn finish_transition(&mut self) -> bool {
        let was_running = self.is_transitioning();
        self.phase = Phase::Idle;
        was_running
    }

    /// Resolves a released swipe. `None` means the wrapper snaps back to the
    /// current page, either because the gesture fell short or because the
    /// controller rejected it (e.g. swiping past the last page).
    pub fn resolve_swipe(&mut self, outcome: SwipeOutcome) -> Option<Transition> {
        match outcome {
            SwipeOutcome::Commit(command) => self.apply(command),
            SwipeOutcome::SnapBack => None,
        }
    }

    /// Scroll mode: adopts the page whose centre is nearest the viewport
    /// centre once scrolling has settled.
    pub fn settle_scroll(&mut self, centers: &[f64], viewport_center: f64) -> Option<Transition> {
        let closest = closest_to_center(centers, viewport_center)?;
        self.sync_to(closest)
    }

    /// Adopts `index` as current without a transition (scroll mode, after
    /// the user scrolled natively). Returns the implied transition when the
    /// page actually changed.
    pub fn sync_to(&mut self, index: usize) -> Option<Transition> {
        if index >= self.page_count || index == self.current {
            return None;
        }
        let from = self.current;
        self.current = index;
        Some(Transition {
            from,
            to: index,
            direction: Direction::between(from, index),
        })
    }
}

/// Index of the centre closest to `viewport_center`. Ties go to the earlier page.
pub fn closest_to_center(centers: &[f64], viewport_center: f64) -> Option<usize> {
    centers
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, center)| {
            let distance = (center - viewport_center).abs();
            match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((index, distance)),
            }
        })
        .map(|(index, _)| index)
}
