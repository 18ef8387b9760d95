//! # Spin back recovery manoeuvre
//!
//! A randomised reverse-and-turn used to free the rover once it is stuck. A throttle, steer and
//! duration are drawn from the [`SpinBackParams`] tables, held for the duration and then released.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;
use rand::{seq::SliceRandom, Rng};

use super::params::SpinBackParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Spin back state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpinBack {
    /// Ticks remaining in the current manoeuvre, zero when idle
    counter: u32,

    /// Chosen throttle
    throttle: f64,

    /// Chosen steer in degrees
    steer: f64,
}

/// Demands produced by one tick of the manoeuvre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinBackOutput {
    pub throttle: f64,
    pub steer: f64,

    /// True on the tick the manoeuvre is released. Throttle and steer are then zero.
    pub complete: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SpinBack {
    /// Step the manoeuvre, starting a new one if none is in progress.
    pub fn step<R: Rng + ?Sized>(&mut self, params: &SpinBackParams, rng: &mut R) -> SpinBackOutput {
        if self.counter == 0 {
            self.throttle = params.throttles.choose(rng).copied().unwrap_or(0.0);
            self.steer = params.steers_deg.choose(rng).copied().unwrap_or(0.0);
            self.counter = params.durations.choose(rng).copied().unwrap_or(0);

            info!(
                "Spin back: throttle {:.2}, steer {:.1} deg for {} ticks",
                self.throttle, self.steer, self.counter
            );
        }

        if self.counter > 0 {
            self.counter -= 1;
        }

        if self.counter == 0 {
            self.throttle = 0.0;
            self.steer = 0.0;

            SpinBackOutput {
                throttle: 0.0,
                steer: 0.0,
                complete: true,
            }
        } else {
            SpinBackOutput {
                throttle: self.throttle,
                steer: self.steer,
                complete: false,
            }
        }
    }

    /// Ticks remaining in the current manoeuvre.
    pub fn remaining(&self) -> u32 {
        self.counter
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::mock::StepRng, rngs::StdRng, SeedableRng};

    #[test]
    fn test_first_choices() {
        // An all-zero generator always picks the first entry of each table
        let mut rng = StepRng::new(0, 0);
        let params = SpinBackParams::default();
        let mut sb = SpinBack::default();

        for _ in 0..49 {
            let out = sb.step(&params, &mut rng);
            assert_eq!(
                out,
                SpinBackOutput {
                    throttle: 0.0,
                    steer: -15.0,
                    complete: false
                }
            );
        }

        let out = sb.step(&params, &mut rng);
        assert_eq!(
            out,
            SpinBackOutput {
                throttle: 0.0,
                steer: 0.0,
                complete: true
            }
        );
        assert_eq!(sb.remaining(), 0);
    }

    #[test]
    fn test_choices_from_tables() {
        let params = SpinBackParams::default();
        let mut rng = StdRng::seed_from_u64(1234);

        for _ in 0..20 {
            let mut sb = SpinBack::default();
            let first = sb.step(&params, &mut rng);
            let duration = sb.remaining() + 1;

            assert!(params.durations.contains(&duration));
            assert!(params.throttles.contains(&first.throttle));
            assert!(params.steers_deg.contains(&first.steer));
            assert!(!first.complete);

            // Held constant until released
            let mut ticks = 1;
            loop {
                let out = sb.step(&params, &mut rng);
                ticks += 1;
                if out.complete {
                    break;
                }
                assert_eq!(out.throttle, first.throttle);
                assert_eq!(out.steer, first.steer);
            }

            assert_eq!(ticks, duration);
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let params = SpinBackParams::default();

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sb = SpinBack::default();
            let out = sb.step(&params, &mut rng);
            (out.throttle, out.steer, sb.remaining())
        };

        assert_eq!(run(7), run(7));
    }
}
