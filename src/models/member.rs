//! Household members and the resolved request principal
//!
//! Credentials live with the authentication service; a member record only
//! carries identity, role and membership state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::MemberId;

/// Membership state of a member within a household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    /// Waiting for the admin to approve the join request
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// A person belonging to (or asking to join) a household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Member {
    pub id: MemberId,

    pub name: String,

    /// Unique across all households
    pub email: String,

    /// Admins own exactly one household
    pub is_admin: bool,

    /// The admin whose household this member belongs to (None for admins)
    pub admin_id: Option<MemberId>,

    pub status: MembershipStatus,

    /// When the join request was made (non-admins only)
    pub requested_at: Option<DateTime<Utc>>,

    /// When the member became part of the household
    pub joined_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Create an approved admin member
    pub fn new_admin(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: MemberId::new(),
            name: name.into(),
            email: email.into(),
            is_admin: true,
            admin_id: None,
            status: MembershipStatus::Approved,
            requested_at: None,
            joined_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a pending join request under the given admin
    pub fn new_pending(
        name: impl Into<String>,
        email: impl Into<String>,
        admin_id: MemberId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: MemberId::new(),
            name: name.into(),
            email: email.into(),
            is_admin: false,
            admin_id: Some(admin_id),
            status: MembershipStatus::Pending,
            requested_at: Some(now),
            joined_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == MembershipStatus::Approved
    }

    pub fn is_pending(&self) -> bool {
        self.status == MembershipStatus::Pending
    }

    /// Build the principal for this member
    pub fn principal(&self) -> Principal {
        Principal {
            member_id: self.id,
            is_admin: self.is_admin,
            admin_id: self.admin_id,
        }
    }

    /// Validate the member
    pub fn validate(&self) -> Result<(), MemberValidationError> {
        if self.name.trim().is_empty() {
            return Err(MemberValidationError::EmptyName);
        }

        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(MemberValidationError::InvalidEmail(self.email.clone()));
        }

        if !self.is_admin && self.admin_id.is_none() {
            return Err(MemberValidationError::MissingAdmin);
        }

        Ok(())
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for members
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyName,
    InvalidEmail(String),
    MissingAdmin,
}

impl fmt::Display for MemberValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Member name cannot be empty"),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: '{}'", email),
            Self::MissingAdmin => write!(f, "Non-admin members must belong to an admin"),
        }
    }
}

impl std::error::Error for MemberValidationError {}

/// The authenticated identity attached to a request
///
/// Produced by the authentication collaborator; the core trusts it as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub member_id: MemberId,
    pub is_admin: bool,
    pub admin_id: Option<MemberId>,
}
