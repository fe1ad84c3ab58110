//! Sliding Window Rate Limiter
//!
//! One limiter per protected route. Each client identifier maps to the
//! timestamps of its admitted requests inside the trailing window.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::clock::{duration_to_ms, Clock, SystemClock};
use crate::tasks::Sweep;

// == Decision ==
/// Outcome of evaluating one request against a limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request was admitted and recorded.
    Allowed {
        /// Admissions left in the current window after this one
        remaining: usize,
    },
    /// The request was refused and not recorded.
    Denied {
        /// Time until the oldest admission leaves the window
        retry_after: Duration,
    },
}

impl Decision {
    /// Returns true for [`Decision::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

// == Rate Limiter ==
/// Per-route sliding window admission control.
pub struct RateLimiter {
    /// Maximum admissions per identifier inside `window`
    limit: usize,
    /// Trailing window length
    window: Duration,
    /// Identifier -> admitted timestamps (Unix ms), in admission order
    table: Mutex<HashMap<String, VecDeque<u64>>>,
    /// Time source
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    // == Constructor ==
    /// Creates a limiter admitting `limit` requests per `window`.
    pub fn new(limit: usize, window: Duration) -> Self {
        Self::with_clock(limit, window, Arc::new(SystemClock::new()))
    }

    /// Creates a limiter driven by `clock`.
    pub fn with_clock(limit: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            limit,
            window,
            table: Mutex::new(HashMap::new()),
            clock,
        }
    }

    // == Check ==
    /// Admits or refuses one request from `identifier`.
    ///
    /// Only admitted requests consume quota.
    pub fn check(&self, identifier: &str) -> bool {
        self.evaluate(identifier).is_allowed()
    }

    // == Evaluate ==
    /// Like [`RateLimiter::check`], but also reports remaining quota or the
    /// wait before the next admission.
    pub fn evaluate(&self, identifier: &str) -> Decision {
        let now = self.clock.now_ms();
        let window_ms = self.window_ms();
        let mut table = self.table.lock();

        // Denials for known identifiers must not allocate
        match table.get_mut(identifier) {
            Some(record) => self.admit(record, now, window_ms),
            None => {
                let mut record = VecDeque::new();
                let decision = self.admit(&mut record, now, window_ms);
                // A zero limit never appends
                if !record.is_empty() {
                    table.insert(identifier.to_string(), record);
                }
                decision
            }
        }
    }

    fn admit(&self, record: &mut VecDeque<u64>, now: u64, window_ms: u64) -> Decision {
        prune(record, now, window_ms);

        if record.len() < self.limit {
            record.push_back(now);
            return Decision::Allowed {
                remaining: self.limit - record.len(),
            };
        }

        let retry_after_ms = record
            .iter()
            .min()
            .map(|oldest| window_ms - now.saturating_sub(*oldest))
            .unwrap_or(window_ms);
        Decision::Denied {
            retry_after: Duration::from_millis(retry_after_ms),
        }
    }

    // == Cleanup ==
    /// Prunes every record and drops identifiers with nothing left in the
    /// window. Returns the number of identifiers dropped.
    pub fn cleanup_stale(&self) -> usize {
        let now = self.clock.now_ms();
        let window_ms = self.window_ms();
        let mut table = self.table.lock();

        let before = table.len();
        table.retain(|_, record| {
            prune(record, now, window_ms);
            !record.is_empty()
        });
        before - table.len()
    }

    // == Accessors ==
    /// Number of identifiers currently tracked.
    pub fn tracked_identifiers(&self) -> usize {
        self.table.lock().len()
    }

    /// Configured admissions per window.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Configured window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    fn window_ms(&self) -> u64 {
        duration_to_ms(self.window)
    }
}

/// Drops timestamps that are `window_ms` or more in the past.
///
/// Scans the whole record: timestamps from an injected clock are not
/// guaranteed to be ordered.
fn prune(record: &mut VecDeque<u64>, now: u64, window_ms: u64) {
    record.retain(|t| now.saturating_sub(*t) < window_ms);
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limit", &self.limit)
            .field("window", &self.window)
            .field("tracked", &self.tracked_identifiers())
            .finish()
    }
}

impl Sweep for RateLimiter {
    fn sweep(&self) -> usize {
        self.cleanup_stale()
    }
}
