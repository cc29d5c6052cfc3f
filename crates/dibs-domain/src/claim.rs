//! Claim module - the central entity of dibs
//!
//! A claim asserts that one contributor is working one repository issue. All
//! scheduling decisions (nudges, automatic release) are derived from the
//! timestamps carried on the claim itself.

use crate::principal::PrincipalId;
use crate::status::ClaimStatus;
use std::fmt;

const SECS_PER_DAY: u64 = 86_400;

/// Unique identifier for a claim based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability for temporal queries
/// - 128-bit uniqueness
/// - No coordination required for distributed generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClaimId(u128);

impl ClaimId {
    /// Generate a new UUIDv7-based ClaimId
    ///
    /// # Examples
    ///
    /// ```
    /// use dibs_domain::ClaimId;
    ///
    /// let id = ClaimId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a ClaimId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a ClaimId from a UUID string
    ///
    /// # Examples
    ///
    /// ```
    /// use dibs_domain::ClaimId;
    ///
    /// let id = ClaimId::new();
    /// let parsed = ClaimId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid claim id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Get the timestamp component of the UUIDv7 (milliseconds since Unix epoch)
    pub fn timestamp(&self) -> u64 {
        // UUIDv7: top 48 bits are Unix millisecond timestamp
        (self.0 >> 80) as u64
    }
}

impl Default for ClaimId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// The code repository a claim targets
///
/// Immutable after claim creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Repository owner (user or organization)
    pub owner: String,

    /// Repository name
    pub name: String,

    /// Optional web URL of the repository
    pub url: Option<String>,
}

impl Repository {
    /// Create a repository reference without a URL
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            url: None,
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The issue a claim targets
///
/// Immutable after claim creation. The URL is required; the title is carried
/// for display only and may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Issue number within the repository
    pub number: u64,

    /// Issue title, if known at claim time
    pub title: Option<String>,

    /// Web URL of the issue
    pub url: String,
}

impl Issue {
    /// Create an issue reference without a title
    pub fn new(number: u64, url: impl Into<String>) -> Self {
        Self {
            number,
            title: None,
            url: url.into(),
        }
    }
}

/// A claim - a record that a contributor is working a repository issue
///
/// All timestamps are seconds since the Unix epoch. The registry is the sole
/// writer of every field; other components read claims and request
/// transitions through registry operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    /// Unique identifier, assigned at creation
    pub id: ClaimId,

    /// Target repository (immutable after creation)
    pub repository: Repository,

    /// Target issue (immutable after creation)
    pub issue: Issue,

    /// The principal holding the claim, set once at creation
    pub claimant: PrincipalId,

    /// Current lifecycle status
    pub status: ClaimStatus,

    /// Most recent state-relevant event (creation or status change)
    pub last_activity_date: u64,

    /// Number of nudges recorded against this claim
    pub nudge_count: u32,

    /// When the most recent nudge was recorded, if ever
    pub last_nudge_date: Option<u64>,

    /// Set exactly once, when the status transitions to released
    pub release_date: Option<u64>,

    /// Free-text annotation, optionally set on transitions
    pub notes: Option<String>,

    /// When this claim was created
    pub created_at: u64,
}

impl Claim {
    /// Create a new active claim at the given time
    ///
    /// # Examples
    ///
    /// ```
    /// use dibs_domain::{Claim, Issue, PrincipalId, Repository};
    ///
    /// let claim = Claim::new(
    ///     Repository::new("rust-lang", "rust"),
    ///     Issue::new(101, "https://example.com/rust-lang/rust/issues/101"),
    ///     PrincipalId::new(),
    ///     1_700_000_000,
    /// );
    /// assert_eq!(claim.nudge_count, 0);
    /// assert_eq!(claim.last_activity_date, claim.created_at);
    /// ```
    pub fn new(repository: Repository, issue: Issue, claimant: PrincipalId, now: u64) -> Self {
        Self {
            id: ClaimId::new(),
            repository,
            issue,
            claimant,
            status: ClaimStatus::Active,
            last_activity_date: now,
            nudge_count: 0,
            last_nudge_date: None,
            release_date: None,
            notes: None,
            created_at: now,
        }
    }

    /// Whole days elapsed since the last state-relevant activity
    ///
    /// Partial days do not count.
    pub fn days_inactive(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_activity_date) / SECS_PER_DAY
    }

    /// Whether this claim has gone stale against the given expiry window
    pub fn is_stale(&self, now: u64, expiry_days: u64) -> bool {
        self.days_inactive(now) >= expiry_days
    }

    /// Whether this claim is due a reminder nudge
    ///
    /// The nudge clock starts at creation and resets on every recorded
    /// nudge. Only active claims are ever due a nudge.
    pub fn needs_nudge(&self, now: u64, interval_days: u64) -> bool {
        if self.status != ClaimStatus::Active {
            return false;
        }

        let last = self.last_nudge_date.unwrap_or(self.created_at);
        now.saturating_sub(last) / SECS_PER_DAY >= interval_days
    }
}
