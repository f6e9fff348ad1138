//! Strongly-typed ID wrappers for all entity types
//!
//! Using newtype wrappers prevents accidentally mixing up IDs from different
//! entity types at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an ID from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an ID from a string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                s.parse()
            }

            /// Short form used in tables (prefix plus first 8 hex digits)
            pub fn short(&self) -> String {
                format!("{}{}", $display_prefix, &self.0.simple().to_string()[..8])
            }

            /// Whether `s` is this id, its short form, or a longer prefix of it
            pub fn matches_prefix(&self, s: &str) -> bool {
                let s = s.strip_prefix($display_prefix).unwrap_or(s).to_lowercase();
                s.len() >= 8 && self.0.to_string().starts_with(&s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(MemberId, "mem-");
define_id!(HouseholdId, "hh-");
define_id!(ChoreId, "chr-");
define_id!(SeriesId, "ser-");
define_id!(MissedTaskId, "mis-");
define_id!(ExpenseId, "exp-");
define_id!(PaymentId, "pmt-");
define_id!(AlertId, "alr-");

impl HouseholdId {
    /// The household owned by an admin shares the admin's id
    pub fn for_admin(admin_id: MemberId) -> Self {
        Self(*admin_id.as_uuid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ChoreId::new();
        assert!(!id.as_uuid().is_nil());
    }

    #[test]
    fn test_id_display_round_trips() {
        let id = ExpenseId::new();
        let display = id.to_string();
        assert!(display.starts_with("exp-"));

        let parsed: ExpenseId = display.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_parse_bare_uuid() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id = MemberId::parse(uuid_str).unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);
    }

    #[test]
    fn test_household_for_admin_shares_uuid() {
        let admin = MemberId::new();
        let household = HouseholdId::for_admin(admin);
        assert_eq!(household.as_uuid(), admin.as_uuid());
    }

    #[test]
    fn test_short_member_id() {
        let id = MemberId::new();
        assert_eq!(id.short().len(), 12);
    }

    #[test]
    fn test_matches_prefix() {
        let id = ChoreId::new();
        assert!(id.matches_prefix(&id.short()));
        assert!(id.matches_prefix(&id.to_string()));
        assert!(!id.matches_prefix("chr-"));

        let fixed = ChoreId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert!(fixed.matches_prefix("chr-550E8400"));
        assert!(!fixed.matches_prefix("chr-550e8401"));
    }

    #[test]
    fn test_id_serialization() {
        let id = PaymentId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: PaymentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
