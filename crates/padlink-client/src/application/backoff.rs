//! Reconnect backoff policy.
//!
//! The delay before the next connection attempt grows geometrically with the
//! number of attempts already made, and is capped:
//!
//! ```text
//! delay = min(base × factor^min(attempts, max_exponent), cap)
//! ```
//!
//! With the defaults (5 s, ×1.5, exponent ≤ 5, cap 30 s) this yields
//! 5 s, 7.5 s, 11.25 s, 16.875 s, 25.3125 s, 30 s, 30 s, …

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Parameters of the reconnect backoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Delay used when no attempts have failed yet.
    pub base: Duration,
    /// Growth factor per attempt.
    pub factor: f64,
    /// Exponent at which growth stops.
    pub max_exponent: u32,
    /// Upper bound on any delay.
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(5_000),
            factor: 1.5,
            max_exponent: 5,
            cap: Duration::from_millis(30_000),
        }
    }
}

impl BackoffPolicy {
    /// Returns the delay to wait before the next attempt, given how many
    /// attempts had been made before the one that just ended.
    ///
    /// `attempts` is 0 after a connection that was established and then lost,
    /// so the first retry after a drop always waits `base`.
    pub fn delay_for(&self, attempts: u32) -> Duration {
        let exponent = attempts.min(self.max_exponent);
        // `max_exponent` is small; saturate rather than wrap on absurd configs.
        let exponent = i32::try_from(exponent).unwrap_or(i32::MAX);
        let secs = self.base.as_secs_f64() * self.factor.powi(exponent);
        let capped = secs.min(self.cap.as_secs_f64());
        if capped.is_finite() && capped >= 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.cap
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
