use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A monotonic time source the frame clock can wait on.
pub trait TimeSource: std::fmt::Debug {
    /// Time elapsed since the source was created.
    fn now(&self) -> Duration;

    /// Block until [`TimeSource::now`] reaches `deadline`.
    fn sleep_until(&mut self, deadline: Duration);
}

/// Real time, measured with [`Instant`]; waits by sleeping the thread.
#[derive(Debug, Clone)]
pub struct WallClock {
    origin: Instant,
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock {
    /// A clock whose zero is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for WallClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Virtual time for headless runs and tests.
///
/// Waiting jumps straight to the deadline. Stalls queued with
/// [`SimulatedTime::inject_stall`] are added on top of the next waits,
/// imitating a late wake-up.
#[derive(Debug, Clone, Default)]
pub struct SimulatedTime {
    now: Duration,
    stalls: VecDeque<Duration>,
}

impl SimulatedTime {
    /// Virtual time starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward, as if work took `by`.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Overshoot the next wait by `stall`.
    pub fn inject_stall(&mut self, stall: Duration) {
        self.stalls.push_back(stall);
    }
}

impl TimeSource for SimulatedTime {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep_until(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline) + self.stalls.pop_front().unwrap_or_default();
    }
}

/// Paces the game loop.
///
/// [`FrameClock::tick`] waits until at least the minimum frame interval has
/// passed since the previous tick, then returns the elapsed time in seconds
/// clamped to the maximum delta.
#[derive(Debug)]
pub struct FrameClock {
    source: Box<dyn TimeSource>,
    last: Duration,
    min_frame: Duration,
    max_delta: f32,
    ticks: u64,
}

impl FrameClock {
    /// A clock over `source`, starting now.
    pub fn new(source: Box<dyn TimeSource>, min_frame: Duration, max_delta: f32) -> Self {
        let last = source.now();
        Self {
            source,
            last,
            min_frame,
            max_delta,
            ticks: 0,
        }
    }

    /// Wait for the next frame and return the clamped delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let deadline = self.last + self.min_frame;
        if self.source.now() < deadline {
            self.source.sleep_until(deadline);
        }
        let now = self.source.now();
        let delta = now.saturating_sub(self.last).as_secs_f32();
        self.last = now;
        self.ticks += 1;
        delta.min(self.max_delta)
    }

    /// Restart the interval from the current time.
    pub fn reset(&mut self) {
        self.last = self.source.now();
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Minimum interval between ticks.
    pub fn min_frame(&self) -> Duration {
        self.min_frame
    }

    /// Upper bound on returned deltas.
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// The underlying time source.
    pub fn source(&self) -> &dyn TimeSource {
        self.source.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn simulated() -> FrameClock {
        FrameClock::new(
            Box::new(SimulatedTime::new()),
            Duration::from_millis(16),
            0.05,
        )
    }

    #[test]
    fn idle_frames_last_the_minimum_interval() {
        let mut clock = simulated();
        for _ in 0..3 {
            let dt = clock.tick();
            assert!((dt - 0.016).abs() < 1e-6);
        }
        assert_eq!(clock.ticks(), 3);
        assert_eq!(clock.source().now(), Duration::from_millis(48));
    }

    #[test]
    fn stall_is_clamped() {
        let mut time = SimulatedTime::new();
        time.inject_stall(Duration::from_millis(500));
        let mut clock = FrameClock::new(Box::new(time), Duration::from_millis(16), 0.05);
        assert!((clock.tick() - 0.05).abs() < 1e-6);
        // The stall is not carried into the next frame.
        assert!((clock.tick() - 0.016).abs() < 1e-6);
    }

    #[test]
    fn wall_clock_waits_at_least_the_minimum() {
        let mut clock = FrameClock::new(
            Box::new(WallClock::new()),
            Duration::from_millis(2),
            0.05,
        );
        let before = clock.source().now();
        let dt = clock.tick();
        assert!(clock.source().now() - before >= Duration::from_millis(2));
        assert!(dt >= 0.002 - 1e-6);
        assert!(dt <= 0.05);
    }

    proptest! {
        #[test]
        fn delta_stays_between_floor_and_clamp(
            stalls in proptest::collection::vec(0u64..400, 1..20),
        ) {
            let mut time = SimulatedTime::new();
            for ms in &stalls {
                time.inject_stall(Duration::from_millis(*ms));
            }
            let mut clock = FrameClock::new(Box::new(time), Duration::from_millis(16), 0.05);
            for _ in 0..stalls.len() + 2 {
                let dt = clock.tick();
                prop_assert!(dt >= 0.016 - 1e-6);
                prop_assert!(dt <= 0.05);
            }
        }
    }
}
