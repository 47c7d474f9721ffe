//! Outcome policy
//!
//! A round is decided before the reels move: one uniform draw against the
//! win threshold. A win pins the decisive reel to the win symbol; a loss
//! sends it to a random fraction of its ring, which the scheduler's denylist
//! keeps off the win symbol.

use rand::Rng;
use serde::{Deserialize, Serialize};

use rp_reel::{SpinRequest, SpinTarget};

use crate::config::GameConfig;

/// A decided round, ready for the machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinPlan {
    pub request: SpinRequest,
    pub won: bool,
    /// The draw that decided it
    pub draw: f64,
}

/// Turns one random draw into a spin request
#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcomeDecider {
    win_threshold: f64,
    win_symbol: char,
    decisive_reel: usize,
    base_targets: Vec<char>,
    durations: Vec<f64>,
    suspense_seconds: f64,
}

impl GameOutcomeDecider {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            win_threshold: config.win_threshold,
            win_symbol: config.win_symbol,
            decisive_reel: config.decisive_reel,
            base_targets: config.target_word.chars().collect(),
            durations: config.settle_seconds.clone(),
            suspense_seconds: config.suspense_seconds,
        }
    }

    pub fn win_threshold(&self) -> f64 {
        self.win_threshold
    }

    pub fn set_win_threshold(&mut self, threshold: f64) {
        self.win_threshold = threshold.clamp(0.0, 1.0);
    }

    pub fn win_symbol(&self) -> char {
        self.win_symbol
    }

    pub fn decisive_reel(&self) -> usize {
        self.decisive_reel
    }

    /// Build the plan for a given draw.
    ///
    /// `draw < threshold` is a win. `fraction` is the landing point of the
    /// decisive reel on a loss and is ignored on a win.
    pub fn decide_with(&self, draw: f64, fraction: f64) -> SpinPlan {
        let won = draw < self.win_threshold;
        let mut request = SpinRequest::default();

        for (reel, (&symbol, &duration)) in self.base_targets.iter().zip(&self.durations).enumerate() {
            if reel != self.decisive_reel {
                request = request.with_reel(symbol, duration);
            } else if won {
                request = request.with_reel(self.win_symbol, duration + self.suspense_seconds);
            } else {
                request = request.with_reel(SpinTarget::Fraction(fraction), duration);
            }
        }

        SpinPlan { request, won, draw }
    }

    /// Draw an outcome
    pub fn decide<R: Rng + ?Sized>(&self, rng: &mut R) -> SpinPlan {
        let draw: f64 = rng.random();
        let fraction: f64 = rng.random();
        let plan = self.decide_with(draw, fraction);
        log::info!(
            "outcome: draw {:.4} vs threshold {:.4} -> {}",
            draw,
            self.win_threshold,
            if plan.won { "win" } else { "loss" }
        );
        plan
    }
}
