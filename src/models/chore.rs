//! Chore and missed-task models
//!
//! Recurring chores form a series: every instance shares a `series_id` and
//! carries its position in the chain as `occurrence`. Completed instances
//! are kept as history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ChoreId, HouseholdId, MemberId, MissedTaskId, SeriesId};

/// Chore priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parse priority from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// How a recurring chore repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    /// Every `interval` days
    Custom,
    /// Any kind this build does not know about; treated as weekly
    #[serde(other)]
    Unrecognized,
}

impl RecurrenceKind {
    /// Parse a recurrence kind from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Custom => write!(f, "custom"),
            Self::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// Recurrence settings of a chore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recurrence {
    pub kind: RecurrenceKind,

    /// Number of kind-units between occurrences (at least 1)
    pub interval: u32,
}

impl Recurrence {
    pub fn new(kind: RecurrenceKind, interval: u32) -> Self {
        Self { kind, interval }
    }

    pub fn daily(interval: u32) -> Self {
        Self::new(RecurrenceKind::Daily, interval)
    }

    pub fn weekly(interval: u32) -> Self {
        Self::new(RecurrenceKind::Weekly, interval)
    }

    pub fn monthly(interval: u32) -> Self {
        Self::new(RecurrenceKind::Monthly, interval)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interval == 1 {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} x{}", self.kind, self.interval)
        }
    }
}

/// A household chore instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Chore {
    pub id: ChoreId,

    pub household_id: HouseholdId,

    /// Shared by every instance generated from the same definition
    pub series_id: SeriesId,

    /// Position within the series, starting at 0
    #[serde(default)]
    pub occurrence: u32,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub assigned_to: MemberId,

    pub due_date: DateTime<Utc>,

    #[serde(default)]
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<MemberId>,

    #[serde(default)]
    pub priority: Priority,

    pub category: String,

    /// None for one-off chores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,

    /// Due date of the following occurrence (recurring chores only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<DateTime<Utc>>,

    /// Set once the following occurrence has been created
    #[serde(default)]
    pub materialized: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Chore {
    /// Create a one-off chore; the first instance of a new series
    pub fn new(
        household_id: HouseholdId,
        title: impl Into<String>,
        assigned_to: MemberId,
        due_date: DateTime<Utc>,
        category: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ChoreId::new(),
            household_id,
            series_id: SeriesId::new(),
            occurrence: 0,
            title: title.into(),
            description: String::new(),
            assigned_to,
            due_date,
            completed: false,
            completed_at: None,
            completed_by: None,
            priority: Priority::default(),
            category: category.into(),
            recurrence: None,
            next_due_date: None,
            materialized: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Not completed and past its due date
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date < now
    }

    /// Validate the chore
    pub fn validate(&self) -> Result<(), ChoreValidationError> {
        if self.title.trim().is_empty() {
            return Err(ChoreValidationError::EmptyTitle);
        }

        if self.category.trim().is_empty() {
            return Err(ChoreValidationError::EmptyCategory);
        }

        if let Some(recurrence) = &self.recurrence {
            if recurrence.interval == 0 {
                return Err(ChoreValidationError::ZeroInterval);
            }
        }

        Ok(())
    }
}

impl fmt::Display for Chore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Validation errors for chores
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoreValidationError {
    EmptyTitle,
    EmptyCategory,
    ZeroInterval,
}

impl fmt::Display for ChoreValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Chore title cannot be empty"),
            Self::EmptyCategory => write!(f, "Chore category cannot be empty"),
            Self::ZeroInterval => write!(f, "Recurrence interval must be at least 1"),
        }
    }
}

impl std::error::Error for ChoreValidationError {}

/// Record of a chore that passed its due date without being completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MissedTask {
    pub id: MissedTaskId,

    pub household_id: HouseholdId,

    pub chore_id: ChoreId,

    pub chore_title: String,

    pub assigned_to: MemberId,

    pub due_date: DateTime<Utc>,

    /// When the miss was detected
    pub missed_date: DateTime<Utc>,

    pub priority: Priority,

    pub category: String,
}

impl MissedTask {
    /// Snapshot a missed-task record from an overdue chore
    pub fn from_chore(chore: &Chore, missed_date: DateTime<Utc>) -> Self {
        Self {
            id: MissedTaskId::new(),
            household_id: chore.household_id,
            chore_id: chore.id,
            chore_title: chore.title.clone(),
            assigned_to: chore.assigned_to,
            due_date: chore.due_date,
            missed_date,
            priority: chore.priority,
            category: chore.category.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_chore() -> Chore {
        let member = MemberId::new();
        Chore::new(
            HouseholdId::for_admin(member),
            "Take out bins",
            member,
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            "general",
        )
    }

    #[test]
    fn test_new_chore_defaults() {
        let chore = sample_chore();
        assert!(!chore.completed);
        assert!(!chore.is_recurring());
        assert_eq!(chore.occurrence, 0);
        assert_eq!(chore.priority, Priority::Medium);
        assert!(chore.validate().is_ok());
    }

    #[test]
    fn test_is_overdue() {
        let mut chore = sample_chore();
        let later = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert!(chore.is_overdue(later));
        assert!(!chore.is_overdue(chore.due_date));

        chore.completed = true;
        assert!(!chore.is_overdue(later));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut chore = sample_chore();
        chore.recurrence = Some(Recurrence::weekly(0));
        assert_eq!(chore.validate(), Err(ChoreValidationError::ZeroInterval));
    }

    #[test]
    fn test_unknown_recurrence_kind_deserializes() {
        let recurrence: Recurrence =
            serde_json::from_str(r#"{"kind":"fortnightly","interval":1}"#).unwrap();
        assert_eq!(recurrence.kind, RecurrenceKind::Unrecognized);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(RecurrenceKind::parse("Monthly"), Some(RecurrenceKind::Monthly));
        assert_eq!(RecurrenceKind::parse("hourly"), None);
    }

    #[test]
    fn test_missed_task_snapshot() {
        let chore = sample_chore();
        let now = Utc::now();
        let missed = MissedTask::from_chore(&chore, now);
        assert_eq!(missed.chore_id, chore.id);
        assert_eq!(missed.chore_title, chore.title);
        assert_eq!(missed.due_date, chore.due_date);
        assert_eq!(missed.missed_date, now);
    }
}
