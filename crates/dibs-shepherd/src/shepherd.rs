//! Core shepherd implementation for the staleness sweep

use crate::{ShepherdConfig, ShepherdError, ShepherdMetrics};
use dibs_domain::traits::{ClaimQuery, ClaimStore, Notifier};
use dibs_domain::{Claim, ClaimStatus, Clock, PrincipalId};
use dibs_registry::ClaimRegistry;
use std::time::Instant;

/// Note recorded on claims the shepherd releases
pub const AUTO_RELEASE_NOTE: &str = "Automatically released due to inactivity";

/// Shepherd service driving active claims toward release when abandoned
///
/// Each sweep scans every active claim and evaluates two independent
/// predicates against the current time:
///
/// - due a reminder nudge (no nudge for `nudge_interval_days`)
/// - stale (no activity for `claim_expiry_days`)
///
/// Both are checked in the same pass, so a claim whose thresholds are met
/// simultaneously is nudged and released in one run. State changes go
/// through the registry's conditional updates; a claim moved by a
/// concurrent writer is skipped silently. Notifications are dispatched
/// after the state change is committed and a delivery failure never undoes
/// it.
///
/// # Examples
///
/// ```no_run
/// use dibs_domain::SystemClock;
/// use dibs_shepherd::{Shepherd, ShepherdConfig};
/// use dibs_store::MemoryStore;
/// # use dibs_domain::{traits::Notifier, PrincipalId};
/// # struct NoopNotifier;
/// # impl Notifier for NoopNotifier {
/// #     type Error = String;
/// #     fn notify(&self, _: PrincipalId, _: &str) -> Result<(), String> { Ok(()) }
/// # }
///
/// let mut store = MemoryStore::new();
/// let config = ShepherdConfig::new(7, 14).unwrap();
/// let mut shepherd = Shepherd::new(config, SystemClock);
///
/// // Perform a single sweep
/// let metrics = shepherd.sweep(&mut store, &NoopNotifier).unwrap();
/// println!("{}", metrics.summary());
/// ```
pub struct Shepherd<C: Clock> {
    config: ShepherdConfig,
    registry: ClaimRegistry<C>,
    clock: C,
    metrics: ShepherdMetrics,
}

impl<C: Clock + Clone> Shepherd<C> {
    /// Create a new shepherd with the given configuration and clock
    pub fn new(config: ShepherdConfig, clock: C) -> Self {
        Self {
            config,
            registry: ClaimRegistry::new(clock.clone()),
            clock,
            metrics: ShepherdMetrics::new(),
        }
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &ShepherdMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &ShepherdConfig {
        &self.config
    }

    /// Perform one complete sweep over all active claims
    ///
    /// Each run is self-contained: no cursor state carries over, so claims
    /// deferred by the sweep budget or lost to a transient failure are
    /// simply re-evaluated next cycle. One claim's failure never prevents
    /// evaluation of the rest.
    ///
    /// Returns the updated metrics after the sweep.
    pub fn sweep<S, N>(
        &mut self,
        store: &mut S,
        notifier: &N,
    ) -> Result<ShepherdMetrics, ShepherdError>
    where
        S: ClaimStore,
        S::Error: std::fmt::Display,
        N: Notifier,
        N::Error: std::fmt::Display,
    {
        let started = Instant::now();
        let budget = self.config.sweep_budget();

        let active = store
            .query_claims(&ClaimQuery::with_status(ClaimStatus::Active))
            .map_err(|e| ShepherdError::Store(e.to_string()))?;

        tracing::debug!(count = active.len(), "active scan");

        for (index, claim) in active.iter().enumerate() {
            if let Some(budget) = budget {
                if started.elapsed() >= budget {
                    let deferred = active.len() - index;
                    self.metrics.record_skipped(deferred);
                    tracing::warn!(deferred, "sweep budget exhausted, deferring remaining claims");
                    break;
                }
            }

            self.metrics.record_scanned();
            if let Err(e) = self.evaluate(store, notifier, claim) {
                self.metrics.record_claim_failure();
                tracing::warn!(claim = %claim.id, error = %e, "claim evaluation failed, continuing sweep");
            }
        }

        self.metrics.record_sweep();
        self.metrics.total_runtime_secs += started.elapsed().as_secs();

        Ok(self.metrics.clone())
    }

    /// Evaluate one claim against both time policies
    fn evaluate<S, N>(&mut self, store: &mut S, notifier: &N, claim: &Claim) -> Result<(), ShepherdError>
    where
        S: ClaimStore,
        S::Error: std::fmt::Display,
        N: Notifier,
        N::Error: std::fmt::Display,
    {
        let now = self.clock.now_secs();

        if claim.needs_nudge(now, self.config.nudge_interval_days) {
            self.nudge(store, notifier, claim)?;
        }

        if claim.is_stale(now, self.config.claim_expiry_days) {
            self.release(store, notifier, claim)?;
        }

        Ok(())
    }

    fn nudge<S, N>(&mut self, store: &mut S, notifier: &N, claim: &Claim) -> Result<(), ShepherdError>
    where
        S: ClaimStore,
        S::Error: std::fmt::Display,
        N: Notifier,
        N::Error: std::fmt::Display,
    {
        match self.registry.record_nudge(store, claim.id) {
            Ok(updated) => {
                self.metrics.record_nudge();
                tracing::info!(
                    claim = %claim.id,
                    nudges = updated.nudge_count,
                    "reminder nudge recorded"
                );
                self.notify(
                    notifier,
                    claim.claimant,
                    &format!(
                        "Reminder: you have an open claim on {}#{}. \
                         Please update your progress or release the claim.",
                        claim.repository, claim.issue.number
                    ),
                );
                Ok(())
            }
            Err(e) if e.is_lost_race() => {
                self.metrics.record_lost_race();
                tracing::debug!(claim = %claim.id, reason = %e, "claim moved under the sweep, nudge dropped");
                Ok(())
            }
            Err(e) => Err(ShepherdError::Store(e.to_string())),
        }
    }

    fn release<S, N>(&mut self, store: &mut S, notifier: &N, claim: &Claim) -> Result<(), ShepherdError>
    where
        S: ClaimStore,
        S::Error: std::fmt::Display,
        N: Notifier,
        N::Error: std::fmt::Display,
    {
        let result = self.registry.set_status(
            store,
            claim.id,
            ClaimStatus::Released,
            Some(AUTO_RELEASE_NOTE.to_string()),
        );

        match result {
            Ok(_) => {
                self.metrics.record_release();
                tracing::info!(
                    claim = %claim.id,
                    repository = %claim.repository,
                    issue = claim.issue.number,
                    "stale claim auto-released"
                );
                self.notify(
                    notifier,
                    claim.claimant,
                    &format!(
                        "Your claim on {}#{} was automatically released due to inactivity.",
                        claim.repository, claim.issue.number
                    ),
                );
                Ok(())
            }
            Err(e) if e.is_lost_race() => {
                self.metrics.record_lost_race();
                tracing::debug!(claim = %claim.id, reason = %e, "claim moved under the sweep, release dropped");
                Ok(())
            }
            Err(e) => Err(ShepherdError::Store(e.to_string())),
        }
    }

    /// Best-effort notification; failure is counted and logged, never fatal
    fn notify<N>(&mut self, notifier: &N, recipient: PrincipalId, message: &str)
    where
        N: Notifier,
        N::Error: std::fmt::Display,
    {
        if let Err(e) = notifier.notify(recipient, message) {
            self.metrics.record_notification_failure();
            tracing::warn!(recipient = %recipient, error = %e, "notification delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibs_domain::traits::ClaimPatch;
    use dibs_domain::{ClaimId, Issue, ManualClock, Repository};
    use std::cell::RefCell;

    const DAY: u64 = 86_400;

    // Mock store for testing
    struct MockStore {
        claims: Vec<Claim>,
        // Simulate a write failure for one claim
        fail_update_for: Option<ClaimId>,
        // Simulate a concurrent writer: every conditional update loses
        force_conflict: bool,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                claims: Vec::new(),
                fail_update_for: None,
                force_conflict: false,
            }
        }

        fn add(&mut self, claim: Claim) -> ClaimId {
            let id = claim.id;
            self.claims.push(claim);
            id
        }

        fn get(&self, id: ClaimId) -> Claim {
            self.claims.iter().find(|c| c.id == id).cloned().unwrap()
        }
    }

    impl ClaimStore for MockStore {
        type Error = String;

        fn insert_claim(&mut self, claim: Claim) -> Result<ClaimId, Self::Error> {
            let id = claim.id;
            self.claims.push(claim);
            Ok(id)
        }

        fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>, Self::Error> {
            Ok(self.claims.iter().find(|c| c.id == id).cloned())
        }

        fn query_claims(&self, query: &ClaimQuery) -> Result<Vec<Claim>, Self::Error> {
            Ok(self
                .claims
                .iter()
                .filter(|c| query.status.is_none_or(|s| c.status == s))
                .cloned()
                .collect())
        }

        fn update_claim(
            &mut self,
            id: ClaimId,
            expected_status: ClaimStatus,
            patch: &ClaimPatch,
        ) -> Result<Option<Claim>, Self::Error> {
            if self.fail_update_for == Some(id) {
                return Err("simulated write failure".to_string());
            }
            if self.force_conflict {
                return Ok(None);
            }

            let Some(claim) = self.claims.iter_mut().find(|c| c.id == id) else {
                return Ok(None);
            };
            if claim.status != expected_status {
                return Ok(None);
            }

            patch.apply(claim);
            Ok(Some(claim.clone()))
        }
    }

    // Mock notifier recording deliveries
    struct MockNotifier {
        sent: RefCell<Vec<(PrincipalId, String)>>,
        fail: bool,
    }

    impl MockNotifier {
        fn new() -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
                fail: true,
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.borrow().len()
        }
    }

    impl Notifier for MockNotifier {
        type Error = String;

        fn notify(&self, recipient: PrincipalId, message: &str) -> Result<(), Self::Error> {
            if self.fail {
                return Err("delivery channel down".to_string());
            }
            self.sent.borrow_mut().push((recipient, message.to_string()));
            Ok(())
        }
    }

    fn test_claim(created_at: u64) -> Claim {
        Claim::new(
            Repository::new("octo", "widgets"),
            Issue::new(7, "https://example.com/octo/widgets/issues/7"),
            PrincipalId::new(),
            created_at,
        )
    }

    fn setup(nudge_days: u64, expiry_days: u64, now: u64) -> (Shepherd<ManualClock>, ManualClock) {
        let clock = ManualClock::new(now);
        let config = ShepherdConfig::new(nudge_days, expiry_days).unwrap();
        (Shepherd::new(config, clock.clone()), clock)
    }

    #[test]
    fn test_fresh_claim_left_alone() {
        let (mut shepherd, _) = setup(7, 14, 2 * DAY);
        let mut store = MockStore::new();
        let id = store.add(test_claim(0));
        let notifier = MockNotifier::new();

        let metrics = shepherd.sweep(&mut store, &notifier).unwrap();

        assert_eq!(metrics.claims_scanned, 1);
        assert_eq!(metrics.nudges_recorded, 0);
        assert_eq!(metrics.claims_released, 0);
        assert_eq!(store.get(id).status, ClaimStatus::Active);
        assert_eq!(notifier.sent_count(), 0);
    }

    #[test]
    fn test_nudge_at_interval() {
        let (mut shepherd, _) = setup(7, 14, 7 * DAY);
        let mut store = MockStore::new();
        let id = store.add(test_claim(0));
        let notifier = MockNotifier::new();

        let metrics = shepherd.sweep(&mut store, &notifier).unwrap();

        assert_eq!(metrics.nudges_recorded, 1);
        assert_eq!(metrics.claims_released, 0);
        let claim = store.get(id);
        assert_eq!(claim.nudge_count, 1);
        assert_eq!(claim.last_nudge_date, Some(7 * DAY));
        // A nudge is not contributor activity
        assert_eq!(claim.last_activity_date, 0);
        assert_eq!(notifier.sent_count(), 1);
    }

    #[test]
    fn test_nudge_resets_the_clock() {
        let (mut shepherd, clock) = setup(7, 30, 7 * DAY);
        let mut store = MockStore::new();
        let id = store.add(test_claim(0));
        let notifier = MockNotifier::new();

        shepherd.sweep(&mut store, &notifier).unwrap();
        assert_eq!(store.get(id).nudge_count, 1);

        // Re-running within the interval of the recorded nudge is a no-op
        clock.advance_days(6);
        let metrics = shepherd.sweep(&mut store, &notifier).unwrap();
        assert_eq!(metrics.nudges_recorded, 1);
        assert_eq!(store.get(id).nudge_count, 1);

        // One full interval after the nudge it fires again
        clock.advance_days(1);
        shepherd.sweep(&mut store, &notifier).unwrap();
        assert_eq!(store.get(id).nudge_count, 2);
    }

    #[test]
    fn test_stale_claim_released() {
        let (mut shepherd, _) = setup(30, 14, 14 * DAY);
        let mut store = MockStore::new();
        let id = store.add(test_claim(0));
        let notifier = MockNotifier::new();

        let metrics = shepherd.sweep(&mut store, &notifier).unwrap();

        assert_eq!(metrics.claims_released, 1);
        let claim = store.get(id);
        assert_eq!(claim.status, ClaimStatus::Released);
        assert_eq!(claim.release_date, Some(14 * DAY));
        assert_eq!(claim.notes.as_deref(), Some(AUTO_RELEASE_NOTE));
        assert_eq!(notifier.sent_count(), 1);
    }

    #[test]
    fn test_nudge_and_release_in_same_pass() {
        // Day 0: created. Day 7: nudged. Day 14: the nudge clock (day 7)
        // and the activity clock (day 0) are both past their thresholds,
        // so the same run records nudge #2 and releases the claim.
        let (mut shepherd, clock) = setup(7, 14, 7 * DAY);
        let mut store = MockStore::new();
        let id = store.add(test_claim(0));
        let notifier = MockNotifier::new();

        shepherd.sweep(&mut store, &notifier).unwrap();
        assert_eq!(store.get(id).nudge_count, 1);
        assert_eq!(store.get(id).status, ClaimStatus::Active);

        clock.advance_days(7);
        let metrics = shepherd.sweep(&mut store, &notifier).unwrap();

        let claim = store.get(id);
        assert_eq!(claim.nudge_count, 2);
        assert_eq!(claim.status, ClaimStatus::Released);
        assert_eq!(claim.release_date, Some(14 * DAY));
        assert_eq!(metrics.nudges_recorded, 2);
        assert_eq!(metrics.claims_released, 1);
        // One nudge notice and one release notice this run
        assert_eq!(notifier.sent_count(), 3);
    }

    #[test]
    fn test_terminal_claims_invisible_to_sweep() {
        let (mut shepherd, _) = setup(7, 14, 20 * DAY);
        let mut store = MockStore::new();
        let mut completed = test_claim(0);
        completed.status = ClaimStatus::Completed;
        let id = store.add(completed);
        let notifier = MockNotifier::new();

        let metrics = shepherd.sweep(&mut store, &notifier).unwrap();

        assert_eq!(metrics.claims_scanned, 0);
        let claim = store.get(id);
        assert_eq!(claim.status, ClaimStatus::Completed);
        assert_eq!(claim.nudge_count, 0);
        assert_eq!(claim.release_date, None);
    }

    #[test]
    fn test_one_claim_failure_does_not_stop_the_sweep() {
        let (mut shepherd, _) = setup(30, 14, 14 * DAY);
        let mut store = MockStore::new();
        let healthy_a = store.add(test_claim(0));
        let broken = store.add(test_claim(0));
        let healthy_b = store.add(test_claim(0));
        store.fail_update_for = Some(broken);
        let notifier = MockNotifier::new();

        let metrics = shepherd.sweep(&mut store, &notifier).unwrap();

        assert_eq!(metrics.claim_failures, 1);
        assert_eq!(metrics.claims_released, 2);
        assert_eq!(store.get(healthy_a).status, ClaimStatus::Released);
        assert_eq!(store.get(broken).status, ClaimStatus::Active);
        assert_eq!(store.get(healthy_b).status, ClaimStatus::Released);
    }

    #[test]
    fn test_notification_failure_is_non_fatal() {
        let (mut shepherd, _) = setup(7, 14, 7 * DAY);
        let mut store = MockStore::new();
        let id = store.add(test_claim(0));
        let notifier = MockNotifier::failing();

        let metrics = shepherd.sweep(&mut store, &notifier).unwrap();

        // The nudge record stands even though delivery failed
        assert_eq!(metrics.nudges_recorded, 1);
        assert_eq!(metrics.notification_failures, 1);
        assert_eq!(metrics.claim_failures, 0);
        assert_eq!(store.get(id).nudge_count, 1);
    }

    #[test]
    fn test_lost_race_swallowed() {
        let (mut shepherd, _) = setup(7, 14, 14 * DAY);
        let mut store = MockStore::new();
        store.add(test_claim(0));
        store.force_conflict = true;
        let notifier = MockNotifier::new();

        let metrics = shepherd.sweep(&mut store, &notifier).unwrap();

        // Nudge and release both lost the race; neither is an error
        assert_eq!(metrics.lost_races, 2);
        assert_eq!(metrics.claim_failures, 0);
        assert_eq!(metrics.nudges_recorded, 0);
        assert_eq!(metrics.claims_released, 0);
        assert_eq!(notifier.sent_count(), 0);
    }

    #[test]
    fn test_sweep_budget_defers_claims() {
        let (mut shepherd, _) = setup(7, 14, 14 * DAY);
        shepherd.config.sweep_budget_secs = Some(0);
        let mut store = MockStore::new();
        store.add(test_claim(0));
        store.add(test_claim(0));
        let notifier = MockNotifier::new();

        let metrics = shepherd.sweep(&mut store, &notifier).unwrap();

        assert_eq!(metrics.claims_skipped, 2);
        assert_eq!(metrics.claims_scanned, 0);
        assert_eq!(metrics.nudges_recorded, 0);
    }

    #[test]
    fn test_metrics_accumulate_across_sweeps() {
        let (mut shepherd, _) = setup(7, 14, 2 * DAY);
        let mut store = MockStore::new();
        store.add(test_claim(0));
        let notifier = MockNotifier::new();

        shepherd.sweep(&mut store, &notifier).unwrap();
        let metrics = shepherd.sweep(&mut store, &notifier).unwrap();

        assert_eq!(metrics.sweep_count, 2);
        assert_eq!(metrics.claims_scanned, 2);

        shepherd.reset_metrics();
        assert_eq!(shepherd.metrics().sweep_count, 0);
    }
}
