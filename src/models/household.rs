//! Household model
//!
//! The tenancy boundary: one admin, any number of approved members. The
//! household id is the admin's id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::{HouseholdId, MemberId};

/// Length of generated invitation codes
pub const INVITATION_CODE_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Household {
    pub id: HouseholdId,

    pub admin_id: MemberId,

    pub name: String,

    /// Code new members use to request to join
    pub invitation_code: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Household {
    /// Create a household owned by `admin_id`
    pub fn new(admin_id: MemberId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: HouseholdId::for_admin(admin_id),
            admin_id,
            name: name.into(),
            invitation_code: generate_invitation_code(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the invitation code with a fresh one
    pub fn regenerate_invitation_code(&mut self) -> &str {
        self.invitation_code = generate_invitation_code();
        self.updated_at = Utc::now();
        &self.invitation_code
    }

    /// Compare a user-entered code, ignoring case and surrounding whitespace
    pub fn matches_code(&self, code: &str) -> bool {
        normalize_code(code) == self.invitation_code
    }
}

/// Normalize a code the way it is stored
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Random upper-case alphanumeric code
pub fn generate_invitation_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .to_uppercase()
        .chars()
        .take(INVITATION_CODE_LEN)
        .collect()
}
