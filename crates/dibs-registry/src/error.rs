//! Error types for registry operations

use dibs_domain::{ClaimId, ClaimStatus};
use thiserror::Error;

/// Errors that can occur during registry operations
#[derive(Error, Debug)]
pub enum RegistryError {
    /// An active claim already exists for the target issue
    #[error("issue {repository}#{issue} is already claimed")]
    AlreadyClaimed {
        /// Repository as owner/name
        repository: String,
        /// Issue number
        issue: u64,
    },

    /// Unknown claim id
    #[error("claim not found: {0}")]
    NotFound(ClaimId),

    /// The claim reached a terminal status and cannot change again
    #[error("claim {id} is {status} and can no longer be updated")]
    InvalidTransition {
        /// Claim id
        id: ClaimId,
        /// Terminal status the claim is in
        status: ClaimStatus,
    },

    /// The operation requires an active claim
    #[error("claim {id} is {status}; the operation requires an active claim")]
    NotActive {
        /// Claim id
        id: ClaimId,
        /// Status the claim is in
        status: ClaimStatus,
    },

    /// The requester is not allowed to perform this operation
    #[error("not authorized: {0}")]
    Forbidden(String),

    /// Another writer moved the claim between our read and our update
    #[error("claim {0} was modified by another writer")]
    VersionConflict(ClaimId),

    /// Storage layer error
    #[error("storage error: {0}")]
    Store(String),
}

impl RegistryError {
    /// Whether this error means another actor already moved the claim
    ///
    /// The staleness sweep drops its intent silently on a lost race, since
    /// the claim's new state is presumed correct.
    pub fn is_lost_race(&self) -> bool {
        matches!(
            self,
            RegistryError::VersionConflict(_)
                | RegistryError::InvalidTransition { .. }
                | RegistryError::NotActive { .. }
                | RegistryError::NotFound(_)
        )
    }
}
