//! Household alerts: issues reported by members and tracked until resolved

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AlertId, HouseholdId, MemberId};

/// What an alert is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    #[default]
    Maintenance,
    Utilities,
    Security,
    Emergency,
    Other,
}

impl AlertCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "maintenance" => Some(Self::Maintenance),
            "utilities" | "utility" => Some(Self::Utilities),
            "security" => Some(Self::Security),
            "emergency" => Some(Self::Emergency),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Maintenance => write!(f, "maintenance"),
            Self::Utilities => write!(f, "utilities"),
            Self::Security => write!(f, "security"),
            Self::Emergency => write!(f, "emergency"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// How urgent an alert is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl AlertPriority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for AlertPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// Where an alert is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
}

impl AlertStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "open" | "reopen" => Some(Self::Open),
            "in_progress" | "progress" | "started" => Some(Self::InProgress),
            "resolved" | "done" | "fixed" => Some(Self::Resolved),
            _ => None,
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::InProgress => write!(f, "in progress"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

/// An issue reported to the household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alert {
    pub id: AlertId,

    pub household_id: HouseholdId,

    pub title: String,

    pub description: String,

    pub category: AlertCategory,

    pub priority: AlertPriority,

    pub status: AlertStatus,

    pub reported_by: MemberId,

    pub reported_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<MemberId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Set while the alert is resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<MemberId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Create an open alert reported by `reported_by`
    pub fn new(
        household_id: HouseholdId,
        title: impl Into<String>,
        description: impl Into<String>,
        reported_by: MemberId,
        reported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AlertId::new(),
            household_id,
            title: title.into(),
            description: description.into(),
            category: AlertCategory::default(),
            priority: AlertPriority::default(),
            status: AlertStatus::Open,
            reported_by,
            reported_at,
            updated_by: None,
            updated_at: None,
            resolved_by: None,
            resolved_at: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == AlertStatus::Resolved
    }

    /// Move to `status`, stamping who changed it
    ///
    /// Resolving stamps `resolved_*`; leaving the resolved state clears them.
    pub fn set_status(&mut self, status: AlertStatus, by: MemberId, now: DateTime<Utc>) {
        self.status = status;
        self.updated_by = Some(by);
        self.updated_at = Some(now);
        if status == AlertStatus::Resolved {
            self.resolved_by = Some(by);
            self.resolved_at = Some(now);
        } else {
            self.resolved_by = None;
            self.resolved_at = None;
        }
    }

    pub fn validate(&self) -> Result<(), AlertValidationError> {
        if self.title.trim().is_empty() {
            return Err(AlertValidationError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(AlertValidationError::EmptyDescription);
        }
        Ok(())
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Validation errors for alerts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertValidationError {
    EmptyTitle,
    EmptyDescription,
}

impl fmt::Display for AlertValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Alert title cannot be empty"),
            Self::EmptyDescription => write!(f, "Alert description cannot be empty"),
        }
    }
}

impl std::error::Error for AlertValidationError {}
