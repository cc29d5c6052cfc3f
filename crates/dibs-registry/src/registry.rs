//! Core registry implementation for guarded claim mutation

use crate::RegistryError;
use dibs_domain::traits::{ClaimPatch, ClaimQuery, ClaimStore};
use dibs_domain::{Claim, ClaimId, ClaimStatus, Clock, Issue, Principal, PrincipalId, Repository};

/// The claim registry
///
/// Holds the injected clock and performs all claim mutation against a store
/// passed per call. The registry itself is stateless, so the request-handling
/// layer and the staleness sweep can each hold their own instance over the
/// same store.
pub struct ClaimRegistry<C: Clock> {
    clock: C,
}

impl<C: Clock> ClaimRegistry<C> {
    /// Create a registry with the given clock
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Create a new claim for an issue
    ///
    /// Fails with [`RegistryError::AlreadyClaimed`] if an active claim
    /// already exists for the (repository, issue) pair. The new claim starts
    /// active with a zero nudge count and its activity clock set to now.
    pub fn create<S: ClaimStore>(
        &self,
        store: &mut S,
        repository: Repository,
        issue: Issue,
        claimant: PrincipalId,
    ) -> Result<Claim, RegistryError>
    where
        S::Error: std::fmt::Display,
    {
        let query = ClaimQuery::active_for_issue(&repository, issue.number);
        let existing = store
            .query_claims(&query)
            .map_err(|e| RegistryError::Store(e.to_string()))?;

        if !existing.is_empty() {
            return Err(RegistryError::AlreadyClaimed {
                repository: repository.to_string(),
                issue: issue.number,
            });
        }

        let claim = Claim::new(repository, issue, claimant, self.clock.now_secs());
        store
            .insert_claim(claim.clone())
            .map_err(|e| RegistryError::Store(e.to_string()))?;

        tracing::info!(
            claim = %claim.id,
            repository = %claim.repository,
            issue = claim.issue.number,
            claimant = %claim.claimant,
            "claim created"
        );

        Ok(claim)
    }

    /// Transition a claim to a new status
    ///
    /// Fails with [`RegistryError::NotFound`] for an unknown id and
    /// [`RegistryError::InvalidTransition`] if the claim already reached a
    /// terminal status. On success the activity clock is bumped, notes are
    /// merged if provided, and `release_date` is stamped when the new status
    /// is released.
    pub fn set_status<S: ClaimStore>(
        &self,
        store: &mut S,
        id: ClaimId,
        new_status: ClaimStatus,
        notes: Option<String>,
    ) -> Result<Claim, RegistryError>
    where
        S::Error: std::fmt::Display,
    {
        let claim = self.fetch(store, id)?;

        if claim.status.is_terminal() {
            return Err(RegistryError::InvalidTransition {
                id,
                status: claim.status,
            });
        }

        let now = self.clock.now_secs();
        let patch = ClaimPatch {
            status: Some(new_status),
            last_activity_date: Some(now),
            release_date: (new_status == ClaimStatus::Released).then_some(now),
            notes,
            ..Default::default()
        };

        let updated = self.apply(store, id, claim.status, &patch)?;

        tracing::info!(claim = %id, from = %claim.status, to = %new_status, "status changed");

        Ok(updated)
    }

    /// Record a nudge against an active claim
    ///
    /// Bumps the nudge count and stamps `last_nudge_date`. A nudge is
    /// maintainer-initiated, not contributor activity, so the activity clock
    /// is left untouched.
    pub fn record_nudge<S: ClaimStore>(
        &self,
        store: &mut S,
        id: ClaimId,
    ) -> Result<Claim, RegistryError>
    where
        S::Error: std::fmt::Display,
    {
        let claim = self.fetch(store, id)?;
        self.ensure_active(&claim)?;

        let patch = ClaimPatch {
            nudge_recorded_at: Some(self.clock.now_secs()),
            ..Default::default()
        };

        let updated = self.apply(store, id, ClaimStatus::Active, &patch)?;

        tracing::debug!(claim = %id, nudges = updated.nudge_count, "nudge recorded");

        Ok(updated)
    }

    /// Record contributor activity on an active claim
    ///
    /// Resets the staleness clock without changing the status.
    pub fn record_activity<S: ClaimStore>(
        &self,
        store: &mut S,
        id: ClaimId,
    ) -> Result<Claim, RegistryError>
    where
        S::Error: std::fmt::Display,
    {
        let claim = self.fetch(store, id)?;
        self.ensure_active(&claim)?;

        let patch = ClaimPatch {
            last_activity_date: Some(self.clock.now_secs()),
            ..Default::default()
        };

        let updated = self.apply(store, id, ClaimStatus::Active, &patch)?;

        tracing::debug!(claim = %id, "activity recorded");

        Ok(updated)
    }

    /// Status update on behalf of a requester
    ///
    /// Permitted if the requester holds the claim or carries the maintainer
    /// role; otherwise [`RegistryError::Forbidden`].
    pub fn update_claim_status<S: ClaimStore>(
        &self,
        store: &mut S,
        id: ClaimId,
        requester: &Principal,
        new_status: ClaimStatus,
        notes: Option<String>,
    ) -> Result<Claim, RegistryError>
    where
        S::Error: std::fmt::Display,
    {
        let claim = self.fetch(store, id)?;

        if claim.claimant != requester.id && !requester.is_maintainer() {
            return Err(RegistryError::Forbidden(format!(
                "principal {} may not update claim {}",
                requester.id, id
            )));
        }

        self.set_status(store, id, new_status, notes)
    }

    /// Manual nudge on behalf of a requester
    ///
    /// Maintainers only, and only for active claims.
    pub fn send_manual_nudge<S: ClaimStore>(
        &self,
        store: &mut S,
        id: ClaimId,
        requester: &Principal,
    ) -> Result<Claim, RegistryError>
    where
        S::Error: std::fmt::Display,
    {
        if !requester.is_maintainer() {
            return Err(RegistryError::Forbidden(
                "only maintainers may send nudges".to_string(),
            ));
        }

        self.record_nudge(store, id)
    }

    fn fetch<S: ClaimStore>(&self, store: &S, id: ClaimId) -> Result<Claim, RegistryError>
    where
        S::Error: std::fmt::Display,
    {
        store
            .get_claim(id)
            .map_err(|e| RegistryError::Store(e.to_string()))?
            .ok_or(RegistryError::NotFound(id))
    }

    fn ensure_active(&self, claim: &Claim) -> Result<(), RegistryError> {
        if claim.status != ClaimStatus::Active {
            return Err(RegistryError::NotActive {
                id: claim.id,
                status: claim.status,
            });
        }
        Ok(())
    }

    fn apply<S: ClaimStore>(
        &self,
        store: &mut S,
        id: ClaimId,
        expected: ClaimStatus,
        patch: &ClaimPatch,
    ) -> Result<Claim, RegistryError>
    where
        S::Error: std::fmt::Display,
    {
        store
            .update_claim(id, expected, patch)
            .map_err(|e| RegistryError::Store(e.to_string()))?
            .ok_or(RegistryError::VersionConflict(id))
    }
}
