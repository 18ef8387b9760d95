//! # Failure monitors
//!
//! Detection of the two failure modes of the wall following strategy:
//!
//! - Stuck: the rover has not moved over a whole dwell window. This is a sampled displacement
//!   test, brief stalls inside the window are tolerated.
//! - Circling: the rover has held the same nonzero steer for too long and is most likely driving
//!   around in a closed loop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for one flavour of stuck detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StuckThreshold {
    /// Maximum displacement along either axis still considered stationary.
    ///
    /// Units: map cells
    pub tolerance: f64,

    /// Number of checks between marking a position and comparing against it.
    pub dwell_ticks: u32,
}

/// Stuck detection state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StuckMonitor {
    /// Position at the start of the current window, `None` when no window is armed
    mark: Option<Point2<f64>>,

    /// Checks remaining before the window is evaluated
    counter: u32,
}

/// Circling detection state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CirclingMonitor {
    /// Steer seen on the previous check, `None` after a reset
    prev_steer: Option<f64>,

    /// Number of consecutive checks with `prev_steer`
    count: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StuckMonitor {
    /// Check whether the rover is stuck.
    ///
    /// The first call with no window armed marks the current position and arms a window of
    /// `threshold.dwell_ticks` checks, all of which report not stuck. The check after the window
    /// has elapsed compares the current position to the mark and clears it, so the following call
    /// arms a fresh window. Stuck is reported only if neither axis moved by `threshold.tolerance`
    /// or more.
    pub fn check(&mut self, pos: &Point2<f64>, threshold: &StuckThreshold) -> bool {
        let mark = match self.mark {
            Some(m) => m,
            None => {
                self.mark = Some(*pos);
                self.counter = threshold.dwell_ticks;
                *pos
            }
        };

        if self.counter > 0 {
            self.counter -= 1;
            return false;
        }

        self.mark = None;

        let stuck = (pos.x - mark.x).abs() < threshold.tolerance
            && (pos.y - mark.y).abs() < threshold.tolerance;

        if stuck {
            debug!("Rover has not moved from {} since the last stuck check", mark);
        }

        stuck
    }

    /// True if a window is currently armed.
    pub fn is_armed(&self) -> bool {
        self.mark.is_some()
    }
}

impl CirclingMonitor {
    /// Check whether the rover is circling given this tick's steer.
    ///
    /// Any change in steer, including to or from zero, restarts the count. The check reports
    /// circling on the `limit + 1`th consecutive identical nonzero steer, and restarts the count.
    pub fn check(&mut self, steer: f64, limit: u32) -> bool {
        if steer == 0.0 {
            self.reset();
            return false;
        }

        match self.prev_steer {
            Some(prev) if prev == steer => self.count += 1,
            _ => {
                self.prev_steer = Some(steer);
                self.count = 1;
            }
        }

        if self.count > limit {
            debug!("Steer held at {} for {} ticks", steer, self.count);
            self.reset();
            true
        } else {
            false
        }
    }

    /// Number of consecutive identical steers seen so far.
    pub fn count(&self) -> u32 {
        self.count
    }

    fn reset(&mut self) {
        self.prev_steer = None;
        self.count = 0;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const COARSE: StuckThreshold = StuckThreshold {
        tolerance: 0.05,
        dwell_ticks: 200,
    };

    const FINE: StuckThreshold = StuckThreshold {
        tolerance: 0.01,
        dwell_ticks: 50,
    };

    #[test]
    fn test_stuck_window() {
        let mut m = StuckMonitor::default();
        let pos = Point2::new(10.0, 10.0);

        // Never stuck during the dwell window
        for _ in 0..200 {
            assert!(!m.check(&pos, &COARSE));
            assert!(m.is_armed());
        }

        // Evaluated on the next check
        assert!(m.check(&pos, &COARSE));
        assert!(!m.is_armed());

        // And a new window is armed
        assert!(!m.check(&pos, &COARSE));
        assert!(m.is_armed());
    }

    #[test]
    fn test_stuck_moved() {
        let mut m = StuckMonitor::default();

        assert!(!m.check(&Point2::new(10.0, 10.0), &COARSE));
        for _ in 0..199 {
            // Brief stalls and movement during the window do not matter
            assert!(!m.check(&Point2::new(50.0, 50.0), &COARSE));
        }

        // Moved along x only
        assert!(!m.check(&Point2::new(10.06, 10.0), &COARSE));

        assert!(!m.check(&Point2::new(10.0, 10.0), &COARSE));
        for _ in 0..199 {
            m.check(&Point2::new(10.0, 10.0), &COARSE);
        }

        // Moved less than the tolerance on both axes
        assert!(m.check(&Point2::new(10.04, 9.96), &COARSE));
    }

    #[test]
    fn test_stuck_fine() {
        let mut m = StuckMonitor::default();
        let mark = Point2::new(1.0, 1.0);

        for _ in 0..50 {
            assert!(!m.check(&mark, &FINE));
        }

        // 0.02 would pass as stuck under the coarse tolerance but not the fine one
        assert!(!m.check(&Point2::new(1.02, 1.0), &FINE));

        for _ in 0..50 {
            assert!(!m.check(&mark, &FINE));
        }
        assert!(m.check(&Point2::new(1.005, 1.0), &FINE));
    }

    #[test]
    fn test_circling_on_501st() {
        let mut m = CirclingMonitor::default();

        for i in 1..=500 {
            assert!(!m.check(-15.0, 500));
            assert_eq!(m.count(), i);
        }

        assert!(m.check(-15.0, 500));
        assert_eq!(m.count(), 0);

        // Count restarts after reporting
        assert!(!m.check(-15.0, 500));
        assert_eq!(m.count(), 1);
    }

    #[test]
    fn test_circling_resets_on_change() {
        let mut m = CirclingMonitor::default();

        for _ in 0..400 {
            assert!(!m.check(5.0, 500));
        }

        // Different steer restarts the count
        assert!(!m.check(10.0, 500));
        assert_eq!(m.count(), 1);

        for _ in 0..400 {
            assert!(!m.check(10.0, 500));
        }

        // Passing through zero restarts it as well
        assert!(!m.check(0.0, 500));
        assert_eq!(m.count(), 0);
        assert!(!m.check(10.0, 500));
        assert_eq!(m.count(), 1);

        for _ in 0..499 {
            assert!(!m.check(10.0, 500));
        }
        assert!(m.check(10.0, 500));
    }
}
