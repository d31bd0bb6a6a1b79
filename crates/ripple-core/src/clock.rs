//! Fixed-step animation clock.
//!
//! The water shader animates from a monotonically increasing time value.
//! Rather than reading a wall clock inside the render pass, the clock is
//! advanced exactly once per rendered frame by the caller's frame driver,
//! which keeps the pass deterministic and testable.

/// Default time advance per rendered frame.
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Monotonic fixed-step time accumulator.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    time: f32,
    step: f32,
}

impl FrameClock {
    /// Creates a clock with the default step of 1/60.
    #[must_use]
    pub fn new() -> Self {
        Self::with_step(DEFAULT_TIME_STEP)
    }

    /// Creates a clock with a custom step.
    #[must_use]
    pub fn with_step(step: f32) -> Self {
        Self {
            time: 0.0,
            step: step.max(0.0),
        }
    }

    /// Advances the clock by one step and returns the new time.
    pub fn advance(&mut self) -> f32 {
        self.time += self.step;
        self.time
    }

    /// Returns the accumulated time.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Returns the per-frame step.
    #[must_use]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Resets the accumulated time to zero.
    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
