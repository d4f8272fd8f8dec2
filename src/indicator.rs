//! Indicator dots mirroring the current page.
//!
//! The row is a plain model; the session projects each [`DotState`] onto the
//! `active` and `fill-from-right` classes of the matching dot element.

use crate::navigation::{Direction, Transition};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DotState {
    pub active: bool,
    /// Fill/collapse animation anchors on the right edge instead of the left.
    pub fill_from_right: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorRow {
    dots: Vec<DotState>,
}

impl IndicatorRow {
    /// One dot per page, the first one active.
    pub fn new(count: usize) -> Self {
        let mut row = Self {
            dots: vec![DotState::default(); count],
        };
        row.set_active(0);
        row
    }

    pub fn dots(&self) -> &[DotState] {
        &self.dots
    }

    #[cfg(test)]
    pub fn active_index(&self) -> Option<usize> {
        self.dots.iter().position(|d| d.active)
    }

    /// Marks only `index` active and clears every origin flag.
    pub fn set_active(&mut self, index: usize) {
        for (i, dot) in self.dots.iter_mut().enumerate() {
            *dot = DotState {
                active: i == index,
                fill_from_right: false,
            };
        }
    }

    /// Applies a transition: the vacated dot collapses toward the travel
    /// direction, the new dot fills from the opposite side.
    pub fn apply(&mut self, transition: &Transition) {
        let forward = transition.direction == Direction::Forward;
        for (i, dot) in self.dots.iter_mut().enumerate() {
            *dot = if i == transition.to {
                DotState {
                    active: true,
                    fill_from_right: !forward,
                }
            } else if i == transition.from {
                DotState {
                    active: false,
                    fill_from_right: forward,
                }
            } else {
                DotState::default()
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationController;
    use crate::schema::NavigationMode;

    fn transition(from: usize, to: usize) -> Transition {
        Transition {
            from,
            to,
            direction: Direction::between(from, to),
        }
    }

    #[test]
    fn test_initial_row() {
        let row = IndicatorRow::new(3);
        assert_eq!(row.active_index(), Some(0));
        assert!(row.dots().iter().all(|d| !d.fill_from_right));
        assert_eq!(IndicatorRow::new(0).active_index(), None);
    }

    #[test]
    fn test_forward_origins_at_start() {
        let mut row = IndicatorRow::new(4);
        row.apply(&transition(0, 1));
        assert_eq!(
            row.dots()[0],
            DotState {
                active: false,
                fill_from_right: true
            }
        );
        assert_eq!(
            row.dots()[1],
            DotState {
                active: true,
                fill_from_right: false
            }
        );
    }

    #[test]
    fn test_backward_origins_at_end() {
        let mut row = IndicatorRow::new(4);
        row.set_active(3);
        row.apply(&transition(3, 2));
        assert_eq!(
            row.dots()[3],
            DotState {
                active: false,
                fill_from_right: false
            }
        );
        assert_eq!(
            row.dots()[2],
            DotState {
                active: true,
                fill_from_right: true
            }
        );
    }

    #[test]
    fn test_jump_clears_bystanders() {
        let mut row = IndicatorRow::new(5);
        row.apply(&transition(0, 1));
        row.apply(&transition(1, 4));
        assert_eq!(row.dots()[0], DotState::default());
        assert_eq!(row.dots()[2], DotState::default());
        assert_eq!(row.active_index(), Some(4));
    }

    #[test]
    fn test_exactly_one_active_follows_controller() {
        let mut nav = NavigationController::new(5, NavigationMode::Paging);
        let mut row = IndicatorRow::new(5);
        for target in [3, 1, 4, 0, 2] {
            let t = nav.go_to(target).unwrap();
            row.apply(&t);
            nav.finish_transition();
            assert_eq!(row.dots().iter().filter(|d| d.active).count(), 1);
            assert_eq!(row.active_index(), Some(nav.current()));
        }
    }
}
