//! Machine controller: owns the reels and integrates them tick by tick

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::POSITION_EPSILON;
use crate::error::{ReelError, ReelResult};
use crate::reel::Reel;
use crate::ring::SymbolRing;
use crate::scheduler::{ScheduledReel, SpinRequest, SpinScheduler};

/// Handed to the completion handler when every reel has come to rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinSummary {
    /// Ring index each reel landed on
    pub targets: Vec<usize>,
    /// Symbol each reel shows
    pub symbols: Vec<char>,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Reels that came to rest during this tick, in column order
    pub stopped: Vec<usize>,
    /// The spin finished on this tick
    pub completed: Option<SpinSummary>,
}

impl TickReport {
    pub fn is_completed(&self) -> bool {
        self.completed.is_some()
    }
}

/// Serializable view of the machine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub positions: Vec<f64>,
    pub remaining: Vec<f64>,
    pub targets: Vec<usize>,
    pub spinning: bool,
}

/// Completion notification, invoked synchronously on the tick a spin ends
pub type CompletionHandler = Box<dyn FnMut(&SpinSummary) + Send>;

/// Owns all reels and drives them through spins.
///
/// The machine is spinning iff the summed remaining distance is strictly
/// positive. Remaining distances only shrink during a spin and end at
/// exactly zero.
pub struct MachineController {
    reels: Vec<Reel>,
    scheduler: SpinScheduler,
    remaining: Vec<f64>,
    targets: Vec<usize>,
    /// A spin was accepted and its completion has not been reported yet
    in_flight: bool,
    on_complete: Option<CompletionHandler>,
}

impl MachineController {
    /// Machine with no reels
    pub fn new(scheduler: SpinScheduler) -> Self {
        Self {
            reels: Vec::new(),
            scheduler,
            remaining: Vec::new(),
            targets: Vec::new(),
            in_flight: false,
            on_complete: None,
        }
    }

    /// Append a reel on `ring`, returning its column
    pub fn add_reel(&mut self, ring: Arc<SymbolRing>) -> usize {
        let column = self.reels.len();
        self.reels.push(Reel::new(ring, column));
        self.remaining.push(0.0);
        self.targets.push(0);
        column
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn reel(&self, column: usize) -> Option<&Reel> {
        self.reels.get(column)
    }

    pub fn num_reels(&self) -> usize {
        self.reels.len()
    }

    pub fn scheduler(&self) -> &SpinScheduler {
        &self.scheduler
    }

    /// Ring positions per second shared by all reels
    pub fn base_speed(&self) -> f64 {
        self.scheduler.base_speed()
    }

    /// Register the single completion handler, replacing any previous one
    pub fn set_completion_handler(&mut self, handler: impl FnMut(&SpinSummary) + Send + 'static) {
        self.on_complete = Some(Box::new(handler));
    }

    pub fn clear_completion_handler(&mut self) {
        self.on_complete = None;
    }

    pub fn is_spinning(&self) -> bool {
        self.remaining.iter().sum::<f64>() > 0.0
    }

    /// Remaining travel per reel
    pub fn remaining(&self) -> &[f64] {
        &self.remaining
    }

    /// Target index per reel of the current (or last) spin
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Symbols currently closest to the window centre
    pub fn displayed_symbols(&self) -> Vec<char> {
        self.reels.iter().map(Reel::current_symbol).collect()
    }

    /// Put every reel straight onto a symbol, bypassing animation
    pub fn set_immediate(&mut self, symbols: &[char]) -> ReelResult<()> {
        if self.is_spinning() {
            return Err(ReelError::AlreadySpinning);
        }
        if symbols.len() != self.reels.len() {
            return Err(ReelError::ReelCountMismatch {
                expected: self.reels.len(),
                got: symbols.len(),
            });
        }

        let indices = self
            .reels
            .iter()
            .zip(symbols)
            .map(|(reel, &symbol)| reel.ring().index_of(symbol))
            .collect::<ReelResult<Vec<_>>>()?;

        for (reel, &index) in self.reels.iter_mut().zip(&indices) {
            reel.set_index(index);
        }
        self.targets = indices;
        self.remaining.iter_mut().for_each(|r| *r = 0.0);
        self.in_flight = false;
        Ok(())
    }

    /// Accept a spin request.
    ///
    /// Fails with [`ReelError::AlreadySpinning`] while a spin is in progress;
    /// the running spin is left untouched.
    pub fn spin_to(&mut self, request: &SpinRequest) -> ReelResult<Vec<ScheduledReel>> {
        if self.in_flight || self.is_spinning() {
            log::warn!("spin request dropped: machine is already spinning");
            return Err(ReelError::AlreadySpinning);
        }

        let plan = self.scheduler.schedule(&self.reels, request)?;
        for entry in &plan {
            self.remaining[entry.column] = entry.total_distance;
            self.targets[entry.column] = entry.target_index;
            log::debug!(
                "reel {}: target {} base {:.3} extra {:.3} total {:.3}",
                entry.column,
                entry.target_index,
                entry.base_distance,
                entry.extra_distance,
                entry.total_distance
            );
        }
        self.in_flight = true;
        Ok(plan)
    }

    /// Advance every reel by `elapsed` seconds of motion.
    ///
    /// Each reel moves `min(remaining, speed * elapsed)`, so a long frame can
    /// never carry a reel past its landing point. A reel whose remaining
    /// distance reaches zero is placed exactly on its target index. The
    /// completion handler fires once, on the tick the last reel stops.
    pub fn tick(&mut self, elapsed: f64) -> TickReport {
        let elapsed = if elapsed.is_finite() && elapsed > 0.0 { elapsed } else { 0.0 };
        let travel = self.scheduler.base_speed() * elapsed;
        let mut report = TickReport::default();

        for (column, reel) in self.reels.iter_mut().enumerate() {
            let remaining = self.remaining[column];
            if remaining <= 0.0 {
                continue;
            }

            let step = remaining.min(travel);
            reel.advance(step);

            let left = remaining - step;
            if left <= POSITION_EPSILON {
                self.remaining[column] = 0.0;
                reel.set_index(self.targets[column]);
                report.stopped.push(column);
            } else {
                self.remaining[column] = left;
            }
        }

        if self.in_flight && !self.is_spinning() {
            self.in_flight = false;
            let summary = SpinSummary {
                targets: self.targets.clone(),
                symbols: self.displayed_symbols(),
            };
            log::info!("spin complete: {}", summary.symbols.iter().collect::<String>());
            if let Some(handler) = self.on_complete.as_mut() {
                handler(&summary);
            }
            report.completed = Some(summary);
        }

        report
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            positions: self.reels.iter().map(Reel::position).collect(),
            remaining: self.remaining.clone(),
            targets: self.targets.clone(),
            spinning: self.is_spinning(),
        }
    }
}

impl fmt::Debug for MachineController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineController")
            .field("reels", &self.reels)
            .field("scheduler", &self.scheduler)
            .field("remaining", &self.remaining)
            .field("targets", &self.targets)
            .field("in_flight", &self.in_flight)
            .field("has_handler", &self.on_complete.is_some())
            .finish()
    }
}
