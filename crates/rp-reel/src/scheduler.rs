//! Spin scheduling: how far each reel travels to land on its target

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};
use crate::reel::Reel;
use crate::ring::{Denylist, SpinTarget};

/// Default base reel speed (ring positions per second)
pub const DEFAULT_BASE_SPEED: f64 = 9.0;

/// Target and settle duration for one reel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelSpin {
    pub target: SpinTarget,
    /// Seconds of free run before the reel settles onto its target
    pub duration: f64,
}

/// A request to spin every reel of a machine.
///
/// Consumed by the scheduler and not retained afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpinRequest {
    reels: Vec<ReelSpin>,
}

impl SpinRequest {
    /// Pair targets with durations, reel by reel
    pub fn new(
        targets: impl IntoIterator<Item = SpinTarget>,
        durations: impl IntoIterator<Item = f64>,
    ) -> Self {
        Self {
            reels: targets
                .into_iter()
                .zip(durations)
                .map(|(target, duration)| ReelSpin { target, duration })
                .collect(),
        }
    }

    /// Append one reel
    pub fn with_reel(mut self, target: impl Into<SpinTarget>, duration: f64) -> Self {
        self.reels.push(ReelSpin {
            target: target.into(),
            duration,
        });
        self
    }

    pub fn reels(&self) -> &[ReelSpin] {
        &self.reels
    }

    pub fn reels_mut(&mut self) -> &mut [ReelSpin] {
        &mut self.reels
    }

    pub fn len(&self) -> usize {
        self.reels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reels.is_empty()
    }
}

/// Pre-computed travel for one reel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledReel {
    pub column: usize,
    /// Ring index the reel must come to rest on
    pub target_index: usize,
    /// Distance covered during the free run
    pub base_distance: f64,
    /// Extra forward distance from the projected landing to the target
    pub extra_distance: f64,
    /// `base_distance + extra_distance`
    pub total_distance: f64,
}

/// Computes per-reel travel distances at a constant base speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinScheduler {
    base_speed: f64,
    speedup: f64,
    #[serde(default)]
    denylist: Denylist,
}

impl SpinScheduler {
    /// Scheduler at `base_speed` ring positions per second, speedup 1
    pub fn new(base_speed: f64) -> ReelResult<Self> {
        check_positive("base speed", base_speed)?;
        Ok(Self {
            base_speed,
            speedup: 1.0,
            denylist: Denylist::new(),
        })
    }

    /// Divide every settle duration by `speedup`
    pub fn with_speedup(mut self, speedup: f64) -> ReelResult<Self> {
        check_positive("speedup", speedup)?;
        self.speedup = speedup;
        Ok(self)
    }

    /// Rules applied to fractional targets
    pub fn with_denylist(mut self, denylist: Denylist) -> Self {
        self.denylist = denylist;
        self
    }

    pub fn base_speed(&self) -> f64 {
        self.base_speed
    }

    pub fn speedup(&self) -> f64 {
        self.speedup
    }

    pub fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    /// Settle duration after applying the speedup
    pub fn effective_duration(&self, duration: f64) -> f64 {
        duration / self.speedup
    }

    /// Work out the exact distance every reel must travel.
    ///
    /// Each reel covers `base_speed * duration` of free run, then continues
    /// forward just far enough to land on its target with no fractional
    /// remainder.
    pub fn schedule(&self, reels: &[Reel], request: &SpinRequest) -> ReelResult<Vec<ScheduledReel>> {
        if request.len() != reels.len() {
            return Err(ReelError::ReelCountMismatch {
                expected: reels.len(),
                got: request.len(),
            });
        }

        reels
            .iter()
            .zip(request.reels())
            .enumerate()
            .map(|(column, (reel, spin))| {
                if !spin.duration.is_finite() || spin.duration < 0.0 {
                    return Err(ReelError::InvalidDuration {
                        reel: column,
                        duration: spin.duration,
                    });
                }

                let ring = reel.ring();
                let target_index = ring.resolve_target(spin.target, &self.denylist).inspect_err(|e| {
                    log::warn!("reel {}: cannot resolve target {:?}: {}", column, spin.target, e);
                })?;

                let base_distance = self.base_speed * self.effective_duration(spin.duration);
                let projected = ring.normalize(reel.position() + base_distance);
                let extra_distance = ring.distance_forward(projected, target_index);

                Ok(ScheduledReel {
                    column,
                    target_index,
                    base_distance,
                    extra_distance,
                    total_distance: base_distance + extra_distance,
                })
            })
            .collect()
    }
}

fn check_positive(name: &'static str, value: f64) -> ReelResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ReelError::InvalidSpeed { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use approx::assert_relative_eq;

    use crate::ring::SymbolRing;

    fn hash_reel() -> Reel {
        Reel::new(Arc::new(SymbolRing::alphabet_with('#').unwrap()), 0)
    }

    #[test]
    fn test_reference_distance() {
        let scheduler = SpinScheduler::new(9.0).unwrap();
        let request = SpinRequest::default().with_reel('M', 5.5);
        let plan = scheduler.schedule(&[hash_reel()], &request).unwrap();

        assert_eq!(plan[0].target_index, 12);
        assert_relative_eq!(plan[0].base_distance, 49.5);
        assert_relative_eq!(plan[0].extra_distance, 16.5);
        assert_relative_eq!(plan[0].total_distance, 66.0);
    }

    #[test]
    fn test_zero_extra_when_landing_exactly() {
        let scheduler = SpinScheduler::new(9.0).unwrap();
        // 3 seconds at 9/s is exactly one lap of 27
        let request = SpinRequest::default().with_reel('A', 3.0);
        let plan = scheduler.schedule(&[hash_reel()], &request).unwrap();
        assert_relative_eq!(plan[0].extra_distance, 0.0);
        assert_relative_eq!(plan[0].total_distance, 27.0);
    }

    #[test]
    fn test_speedup_shortens_free_run() {
        let scheduler = SpinScheduler::new(9.0).unwrap().with_speedup(2.0).unwrap();
        let request = SpinRequest::default().with_reel('M', 5.5);
        let plan = scheduler.schedule(&[hash_reel()], &request).unwrap();
        assert_relative_eq!(plan[0].base_distance, 24.75);
        // 24.75 → 12 is 14.25 further round the ring
        assert_relative_eq!(plan[0].extra_distance, 14.25);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            SpinScheduler::new(0.0),
            Err(ReelError::InvalidSpeed { .. })
        ));
        assert!(matches!(
            SpinScheduler::new(9.0).unwrap().with_speedup(f64::NAN),
            Err(ReelError::InvalidSpeed { .. })
        ));

        let scheduler = SpinScheduler::new(9.0).unwrap();
        let reels = [hash_reel()];

        let too_many = SpinRequest::default().with_reel('A', 1.0).with_reel('B', 1.0);
        assert_eq!(
            scheduler.schedule(&reels, &too_many),
            Err(ReelError::ReelCountMismatch { expected: 1, got: 2 })
        );

        let negative = SpinRequest::default().with_reel('A', -1.0);
        assert!(matches!(
            scheduler.schedule(&reels, &negative),
            Err(ReelError::InvalidDuration { reel: 0, .. })
        ));

        let unknown = SpinRequest::default().with_reel('?', 1.0);
        assert_eq!(
            scheduler.schedule(&reels, &unknown),
            Err(ReelError::UnknownSymbol('?'))
        );
    }

    #[test]
    fn test_denylist_applies_to_fractions() {
        let ring = Arc::new(SymbolRing::alphabet());
        let reel = Reel::new(ring, 3);
        let scheduler = SpinScheduler::new(9.0)
            .unwrap()
            .with_denylist(Denylist::new().with_rule('G', None));
        let request = SpinRequest::default().with_reel(SpinTarget::Fraction(6.5 / 26.0), 10.0);
        let plan = scheduler.schedule(&[reel], &request).unwrap();
        assert_eq!(plan[0].target_index, 7);
    }
}
