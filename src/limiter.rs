use std::time::Duration;

use tokio::time::Instant;

/// Default ceiling on sends per rolling one-second window.
pub const DEFAULT_SENDS_PER_WINDOW: u32 = 20;

const WINDOW: Duration = Duration::from_secs(1);

/// O(1) gate bounding outbound sends to a maximum per rolling second.
///
/// Uses the tokio clock so paused-time tests are deterministic.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    window_start: Instant,
    sent_in_window: u32,
}

impl RateLimiter {
    pub fn new(max_per_window: u32) -> Self {
        Self {
            max_per_window,
            window_start: Instant::now(),
            sent_in_window: 0,
        }
    }

    /// Claim one send slot. Returns false without side effects once the
    /// current window is full; the count resets when the window rolls over.
    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.window_start) >= WINDOW {
            self.window_start = now;
            self.sent_in_window = 0;
        }
        if self.sent_in_window >= self.max_per_window {
            return false;
        }
        self.sent_in_window += 1;
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_SENDS_PER_WINDOW)
    }
}
