//! Dibs Claim Registry
//!
//! Guarded mutation of claims. Every write to a claim - human-initiated or
//! scheduler-initiated - passes through the registry, which is the sole
//! owner of invariant enforcement:
//!
//! - at most one active claim per (repository, issue) pair
//! - terminal statuses (completed, abandoned, released) reject further
//!   transitions
//! - `release_date` is stamped exactly when a claim becomes released
//! - nudges bump `nudge_count` and `last_nudge_date` without touching
//!   `last_activity_date`
//!
//! All writes go through the store's conditional update keyed on the
//! previously read status, so a concurrent "complete" and "release" against
//! the same claim cannot both apply; the loser observes
//! [`RegistryError::VersionConflict`].
//!
//! # Usage
//!
//! ```no_run
//! use dibs_domain::{ClaimStatus, Issue, PrincipalId, Repository, SystemClock};
//! use dibs_registry::ClaimRegistry;
//! use dibs_store::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! let registry = ClaimRegistry::new(SystemClock);
//!
//! let claim = registry.create(
//!     &mut store,
//!     Repository::new("octo", "widgets"),
//!     Issue::new(7, "https://example.com/octo/widgets/issues/7"),
//!     PrincipalId::new(),
//! ).unwrap();
//!
//! registry.set_status(&mut store, claim.id, ClaimStatus::Completed, None).unwrap();
//! ```

#![warn(missing_docs)]

mod error;
mod registry;

pub use error::RegistryError;
pub use registry::ClaimRegistry;
