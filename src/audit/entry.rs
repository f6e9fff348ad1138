//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Member,
    Household,
    Chore,
    MissedTask,
    Expense,
    Payment,
    Alert,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Member => write!(f, "Member"),
            EntityType::Household => write!(f, "Household"),
            EntityType::Chore => write!(f, "Chore"),
            EntityType::MissedTask => write!(f, "MissedTask"),
            EntityType::Expense => write!(f, "Expense"),
            EntityType::Payment => write!(f, "Payment"),
            EntityType::Alert => write!(f, "Alert"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    pub entity_id: String,

    /// Human-readable label (chore title, member name, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Snapshot before the operation (updates and deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    /// Snapshot after the operation (creates and updates)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn base(
        operation: Operation,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id,
            entity_name,
            before: None,
            after: None,
            diff_summary: None,
        }
    }

    /// Entry for a newly created entity
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::base(Operation::Create, entity_type, entity_id.into(), entity_name);
        entry.after = serde_json::to_value(entity).ok();
        entry
    }

    /// Entry for an update, with an optional diff summary
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Self {
        let mut entry = Self::base(Operation::Update, entity_type, entity_id.into(), entity_name);
        entry.before = serde_json::to_value(before).ok();
        entry.after = serde_json::to_value(after).ok();
        entry.diff_summary = diff_summary;
        entry
    }

    /// Entry for a deleted entity
    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::base(Operation::Delete, entity_type, entity_id.into(), entity_name);
        entry.before = serde_json::to_value(entity).ok();
        entry
    }

    /// One line for `chorebook audit` output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}
