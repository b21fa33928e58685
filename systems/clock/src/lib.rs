#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame clock that turns host frame timestamps into delta time and FPS samples.
//!
//! The clock is an ordinary value owned by the game loop. Nothing about it is
//! global, so tests and headless runs can drive it with synthetic timestamps.

/// Number of frames accumulated before the FPS sample is refreshed.
pub const FPS_SAMPLE_FRAMES: u32 = 10;

/// Simulation clock fed once per frame with the host's timestamp in milliseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationClock {
    last_frame_time: f64,
    current_frame_time: f64,
    delta_time: f64,
    tick: f64,
    fps: u32,
    frame_count: u32,
    frame_delta: f64,
}

impl SimulationClock {
    /// Creates a clock whose baseline is timestamp zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_frame_time: 0.0,
            current_frame_time: 0.0,
            delta_time: 0.0,
            tick: 0.0,
            fps: 0,
            frame_count: 0,
            frame_delta: 0.0,
        }
    }

    /// Resets every counter back to the zero baseline.
    pub fn init(&mut self) {
        *self = Self::new();
    }

    /// Moves the baseline to `timestamp_ms` so the next update measures from it.
    ///
    /// FPS accumulators survive so sampling continues across a pause.
    pub fn rebase(&mut self, timestamp_ms: f64) {
        if !timestamp_ms.is_finite() {
            tracing::warn!(timestamp_ms, "ignoring non-finite clock baseline");
            return;
        }
        self.last_frame_time = timestamp_ms;
        self.current_frame_time = timestamp_ms;
        self.delta_time = 0.0;
        self.tick = 0.0;
    }

    /// Records a new frame timestamp and returns the elapsed milliseconds.
    ///
    /// Timestamps that are not finite or that go backwards produce a zero delta
    /// and leave the current frame time unchanged.
    pub fn update(&mut self, timestamp_ms: f64) -> f64 {
        self.last_frame_time = self.current_frame_time;
        let delta = timestamp_ms - self.last_frame_time;
        if delta.is_finite() && delta >= 0.0 {
            self.current_frame_time = timestamp_ms;
            self.delta_time = delta;
        } else {
            tracing::warn!(
                timestamp_ms,
                previous_ms = self.last_frame_time,
                "clamping invalid frame timestamp to a zero delta"
            );
            self.delta_time = 0.0;
        }
        self.tick = self.delta_time / 1000.0;
        self.delta_time
    }

    /// Accumulates the latest delta and refreshes the FPS sample every
    /// [`FPS_SAMPLE_FRAMES`] frames.
    pub fn count_fps(&mut self) {
        self.frame_count += 1;
        self.frame_delta += self.delta_time;
        if self.frame_count % FPS_SAMPLE_FRAMES != 0 {
            return;
        }
        if self.frame_delta > 0.0 {
            self.fps = (1000.0 * f64::from(self.frame_count) / self.frame_delta).floor() as u32;
        }
        self.frame_count = 0;
        self.frame_delta = 0.0;
    }

    /// Milliseconds elapsed between the last two frames.
    #[must_use]
    pub const fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Delta time rounded to two decimal places.
    #[must_use]
    pub fn delta_time_rounded(&self) -> f64 {
        (self.delta_time * 100.0).round() / 100.0
    }

    /// Delta time in seconds.
    #[must_use]
    pub const fn tick(&self) -> f64 {
        self.tick
    }

    /// Latest frames-per-second sample.
    #[must_use]
    pub const fn fps(&self) -> u32 {
        self.fps
    }

    /// Timestamp of the latest frame in milliseconds.
    #[must_use]
    pub const fn current_frame_time(&self) -> f64 {
        self.current_frame_time
    }

    /// Timestamp of the previous frame in milliseconds.
    #[must_use]
    pub const fn last_frame_time(&self) -> f64 {
        self.last_frame_time
    }

    /// Current frame time in seconds, rounded to two decimal places.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        (self.current_frame_time / 1000.0 * 100.0).round() / 100.0
    }
}
