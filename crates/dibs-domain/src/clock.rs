//! Clock module - injectable time source
//!
//! All temporal policy (staleness, nudge intervals) reads time through the
//! [`Clock`] trait so that schedulers and registries can be driven by a fake
//! clock in tests instead of waiting on real timers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time, in seconds since the Unix epoch
pub trait Clock {
    /// Current Unix timestamp in seconds
    fn now_secs(&self) -> u64;
}

/// System clock backed by real wall-clock time
///
/// This is the default clock for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Manually driven clock for deterministic tests
///
/// Clones share the same underlying time, so a test can hold one handle to
/// advance time while a scheduler holds another.
///
/// # Examples
///
/// ```
/// use dibs_domain::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// let handle = clock.clone();
///
/// handle.advance_days(2);
/// assert_eq!(clock.now_secs(), 1_000 + 2 * 86_400);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    secs: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a manual clock starting at the given timestamp
    pub fn new(secs: u64) -> Self {
        Self {
            secs: Arc::new(AtomicU64::new(secs)),
        }
    }

    /// Set the clock to an absolute timestamp
    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::SeqCst);
    }

    /// Advance the clock by the given number of seconds
    pub fn advance_secs(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Advance the clock by whole days
    pub fn advance_days(&self, days: u64) {
        self.advance_secs(days * 86_400);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.secs.load(Ordering::SeqCst)
    }
}
