//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Storage and notification implementations live in other
//! crates; the time source lives in [`crate::clock`].

use crate::claim::{Claim, ClaimId, Repository};
use crate::principal::PrincipalId;
use crate::status::ClaimStatus;

/// Trait for storing and retrieving claims
///
/// Implemented by the infrastructure layer (dibs-store). The store must
/// apply [`ClaimStore::update_claim`] atomically at single-claim
/// granularity: a reader never observes a partially applied patch, and two
/// concurrent conditional updates against the same claim cannot both
/// succeed unless both preconditions genuinely held in sequence.
pub trait ClaimStore {
    /// Error type for store operations
    type Error;

    /// Insert a new claim
    fn insert_claim(&mut self, claim: Claim) -> Result<ClaimId, Self::Error>;

    /// Get a claim by id
    fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>, Self::Error>;

    /// Query claims matching the given criteria
    fn query_claims(&self, query: &ClaimQuery) -> Result<Vec<Claim>, Self::Error>;

    /// Conditionally update a claim
    ///
    /// The patch is applied only if the claim exists and its current status
    /// equals `expected_status`. Returns the updated claim, or `Ok(None)`
    /// when the precondition failed - the claim is missing or was moved to
    /// another status by a concurrent writer.
    fn update_claim(
        &mut self,
        id: ClaimId,
        expected_status: ClaimStatus,
        patch: &ClaimPatch,
    ) -> Result<Option<Claim>, Self::Error>;
}

/// Query criteria for retrieving claims
#[derive(Debug, Clone, Default)]
pub struct ClaimQuery {
    /// Filter by status
    pub status: Option<ClaimStatus>,

    /// Filter by repository owner
    pub repo_owner: Option<String>,

    /// Filter by repository name
    pub repo_name: Option<String>,

    /// Filter by issue number
    pub issue_number: Option<u64>,

    /// Filter by the claim holder
    pub claimant: Option<PrincipalId>,

    /// Maximum results to return
    pub limit: Option<usize>,
}

impl ClaimQuery {
    /// Query for all claims in the given status
    pub fn with_status(status: ClaimStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Query for the active claim on a specific issue, if any
    pub fn active_for_issue(repository: &Repository, issue_number: u64) -> Self {
        Self {
            status: Some(ClaimStatus::Active),
            repo_owner: Some(repository.owner.clone()),
            repo_name: Some(repository.name.clone()),
            issue_number: Some(issue_number),
            ..Default::default()
        }
    }

    /// Query for all claims held by the given principal
    pub fn for_claimant(claimant: PrincipalId) -> Self {
        Self {
            claimant: Some(claimant),
            ..Default::default()
        }
    }
}

/// A partial update applied to a single claim
///
/// Fields left as `None` are untouched. `nudge_recorded_at` is a combined
/// operation: it bumps `nudge_count` and stamps `last_nudge_date` against
/// the store's current view of the claim, so concurrent nudges cannot lose
/// an increment.
#[derive(Debug, Clone, Default)]
pub struct ClaimPatch {
    /// New status
    pub status: Option<ClaimStatus>,

    /// New last-activity timestamp
    pub last_activity_date: Option<u64>,

    /// Release timestamp, stamped when the status becomes released
    pub release_date: Option<u64>,

    /// Replacement notes
    pub notes: Option<String>,

    /// Record a nudge at this timestamp
    pub nudge_recorded_at: Option<u64>,
}

impl ClaimPatch {
    /// Apply this patch to a claim
    ///
    /// `last_activity_date` never moves backward, regardless of the patch
    /// value.
    pub fn apply(&self, claim: &mut Claim) {
        if let Some(status) = self.status {
            claim.status = status;
        }
        if let Some(ts) = self.last_activity_date {
            claim.last_activity_date = claim.last_activity_date.max(ts);
        }
        if let Some(ts) = self.release_date {
            claim.release_date = Some(ts);
        }
        if let Some(notes) = &self.notes {
            claim.notes = Some(notes.clone());
        }
        if let Some(ts) = self.nudge_recorded_at {
            claim.nudge_count += 1;
            claim.last_nudge_date = Some(ts);
        }
    }
}

/// Trait for the outbound notification channel
///
/// Implemented by the hosting deployment (email, chat, or a log-only
/// stand-in). Delivery is best-effort: callers must treat a failure as
/// non-fatal and never reverse a committed state change because of it.
pub trait Notifier {
    /// Error type for notification delivery
    type Error;

    /// Notify the given principal with a human-readable message
    fn notify(&self, recipient: PrincipalId, message: &str) -> Result<(), Self::Error>;
}
