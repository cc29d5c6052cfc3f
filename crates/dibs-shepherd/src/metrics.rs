//! Metrics collection for shepherd operations

/// Metrics collected during shepherd sweeps
///
/// Counters accumulate across sweeps until [`ShepherdMetrics::reset`].
#[derive(Debug, Clone, Default)]
pub struct ShepherdMetrics {
    /// Total sweep cycles completed
    pub sweep_count: usize,

    /// Active claims evaluated
    pub claims_scanned: usize,

    /// Reminder nudges recorded
    pub nudges_recorded: usize,

    /// Claims auto-released for inactivity
    pub claims_released: usize,

    /// Conditional updates dropped because another writer moved the claim
    pub lost_races: usize,

    /// Claims whose evaluation failed (store errors); the sweep continued
    pub claim_failures: usize,

    /// Notifications that could not be delivered
    pub notification_failures: usize,

    /// Claims deferred to the next run by the sweep budget
    pub claims_skipped: usize,

    /// Total sweep runtime in seconds
    pub total_runtime_secs: u64,
}

impl ShepherdMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an evaluated claim
    pub fn record_scanned(&mut self) {
        self.claims_scanned += 1;
    }

    /// Record a nudge
    pub fn record_nudge(&mut self) {
        self.nudges_recorded += 1;
    }

    /// Record an automatic release
    pub fn record_release(&mut self) {
        self.claims_released += 1;
    }

    /// Record a conditional update lost to a concurrent writer
    pub fn record_lost_race(&mut self) {
        self.lost_races += 1;
    }

    /// Record a claim whose evaluation failed
    pub fn record_claim_failure(&mut self) {
        self.claim_failures += 1;
    }

    /// Record a failed notification delivery
    pub fn record_notification_failure(&mut self) {
        self.notification_failures += 1;
    }

    /// Record claims deferred by the sweep budget
    pub fn record_skipped(&mut self, count: usize) {
        self.claims_skipped += count;
    }

    /// Record a sweep cycle completion
    pub fn record_sweep(&mut self) {
        self.sweep_count += 1;
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = vec![
            "Shepherd Metrics Summary".to_string(),
            "========================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Claims scanned: {}", self.claims_scanned),
            format!("Nudges recorded: {}", self.nudges_recorded),
            format!("Claims released: {}", self.claims_released),
            format!("Lost races: {}", self.lost_races),
            format!("Claim failures: {}", self.claim_failures),
            format!("Notification failures: {}", self.notification_failures),
            format!("Claims skipped: {}", self.claims_skipped),
            format!("Total runtime: {}s", self.total_runtime_secs),
        ];

        lines.join("\n")
    }
}
