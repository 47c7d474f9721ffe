//! Frame pacing for the control loop

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

/// Frames averaged for the FPS overlay
const FPS_WINDOW: usize = 60;

/// Moving average of frame intervals
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    intervals: VecDeque<f64>,
    sum: f64,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, interval: f64) {
        if !(interval.is_finite() && interval > 0.0) {
            return;
        }
        self.intervals.push_back(interval);
        self.sum += interval;
        if self.intervals.len() > FPS_WINDOW {
            if let Some(oldest) = self.intervals.pop_front() {
                self.sum -= oldest;
            }
        }
    }

    /// Frames per second over the window; 0 before the first frame
    pub fn fps(&self) -> f64 {
        if self.intervals.is_empty() || self.sum <= 0.0 {
            0.0
        } else {
            self.intervals.len() as f64 / self.sum
        }
    }
}

/// Measures elapsed time per frame and sleeps to the next frame boundary
#[derive(Debug)]
pub struct FrameClock {
    period: Duration,
    last: Instant,
    next_deadline: Instant,
    fps: FpsCounter,
}

impl FrameClock {
    pub fn new(rate_hz: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(rate_hz.max(1)));
        let now = Instant::now();
        Self {
            period,
            last: now,
            next_deadline: now + period,
            fps: FpsCounter::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Seconds since the previous call (or since construction)
    pub fn begin_frame(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        self.fps.record(elapsed);
        elapsed
    }

    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }

    /// Sleep until the next frame boundary. A late frame resets the
    /// schedule instead of trying to catch up.
    pub fn wait_for_next_frame(&mut self) {
        let now = Instant::now();
        if now < self.next_deadline {
            thread::sleep(self.next_deadline - now);
            self.next_deadline += self.period;
        } else {
            self.next_deadline = now + self.period;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fps_average() {
        let mut fps = FpsCounter::new();
        assert_eq!(fps.fps(), 0.0);
        for _ in 0..10 {
            fps.record(1.0 / 120.0);
        }
        assert_relative_eq!(fps.fps(), 120.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fps_window_forgets_old_frames() {
        let mut fps = FpsCounter::new();
        for _ in 0..FPS_WINDOW {
            fps.record(0.5);
        }
        for _ in 0..FPS_WINDOW {
            fps.record(1.0 / 60.0);
        }
        assert_relative_eq!(fps.fps(), 60.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bad_intervals_ignored() {
        let mut fps = FpsCounter::new();
        fps.record(f64::NAN);
        fps.record(-1.0);
        fps.record(0.0);
        assert_eq!(fps.fps(), 0.0);
    }

    #[test]
    fn test_frame_clock_paces() {
        let mut clock = FrameClock::new(200);
        assert_eq!(clock.period(), Duration::from_millis(5));
        let start = Instant::now();
        for _ in 0..4 {
            clock.begin_frame();
            clock.wait_for_next_frame();
        }
        assert!(start.elapsed() >= Duration::from_millis(15));
        assert!(clock.begin_frame() > 0.0);
    }
}
