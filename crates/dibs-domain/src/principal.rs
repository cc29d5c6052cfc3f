//! Principal module - the authenticated actors that hold and manage claims
//!
//! dibs does not validate credentials itself; an external identity provider
//! supplies an authenticated principal (id + role) with every human-initiated
//! call.

use std::fmt;

/// Unique identifier for a principal, based on UUIDv7
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrincipalId(u128);

impl PrincipalId {
    /// Generate a new UUIDv7-based PrincipalId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a PrincipalId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a PrincipalId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid principal id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Role granted to a principal by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Regular contributor: may claim issues and manage their own claims
    Contributor,

    /// Maintainer: may manage any claim and trigger manual nudges
    Maintainer,
}

impl Role {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Contributor => "contributor",
            Role::Maintainer => "maintainer",
        }
    }

    /// Parse a role from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "contributor" => Some(Role::Contributor),
            "maintainer" => Some(Role::Maintainer),
            _ => None,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid role: {}", s))
    }
}

/// An authenticated principal as supplied by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// Identifier assigned by the identity provider
    pub id: PrincipalId,

    /// Role granted to this principal
    pub role: Role,
}

impl Principal {
    /// Create a principal with the given id and role
    pub fn new(id: PrincipalId, role: Role) -> Self {
        Self { id, role }
    }

    /// Whether this principal carries maintainer privileges
    pub fn is_maintainer(&self) -> bool {
        self.role == Role::Maintainer
    }
}
