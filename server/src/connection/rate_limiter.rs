use std::time::{Duration, Instant};

// Defaults
const MAX_EVENTS_PER_WINDOW: u32 = 40;
const WINDOW_SECS: u64 = 5;

/// Contains Config properties which will be used by per-channel rate limiting
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Events admitted per window.
    pub max_events: u32,
    /// Length of the rolling window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_events: MAX_EVENTS_PER_WINDOW,
            window: Duration::from_secs(WINDOW_SECS),
        }
    }
}

/// Fixed event budget on a rolling window, one per channel. An over-budget
/// request is rejected before it can mutate any state; the budget refills
/// when the window rolls over.
pub struct RateLimiter {
    config: RateLimitConfig,
    window_start: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            window_start: Instant::now(),
            count: 0,
        }
    }

    /// Spends one event slot; false once the window's budget is exhausted.
    pub fn try_consume(&mut self, now: Instant) -> bool {
        if now.duration_since(self.window_start) >= self.config.window {
            self.window_start = now;
            self.count = 0;
        }
        if self.count >= self.config.max_events {
            return false;
        }
        self.count += 1;
        true
    }
}
