//! JSON snapshot of one household
//!
//! Includes every member, chore, missed task, expense (with payments) and
//! alert, plus a schema version for compatibility checks on import.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory;
use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{Alert, Chore, Expense, Household, Member, MissedTask, Principal};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Household snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HouseholdExport {
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub household: Household,

    pub members: Vec<Member>,

    pub chores: Vec<Chore>,

    pub missed_tasks: Vec<MissedTask>,

    pub expenses: Vec<Expense>,

    /// Absent from snapshots written before alerts existed
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl HouseholdExport {
    /// Snapshot the actor's household
    pub fn from_storage(storage: &Storage, actor: &Principal) -> ChorebookResult<Self> {
        let household_id = directory::resolve_household_id(actor)?;
        let household = storage
            .households
            .get(household_id)?
            .ok_or_else(|| ChorebookError::household_not_found(household_id.to_string()))?;

        let mut members = storage.members.by_household(household_id)?;
        members.sort_by_key(|m| m.created_at);
        let mut chores = storage.chores.by_household(household_id)?;
        chores.sort_by_key(|c| (c.due_date, c.occurrence));
        let mut missed_tasks = storage.missed_tasks.by_household(household_id)?;
        missed_tasks.sort_by_key(|m| m.missed_date);
        let mut expenses = storage.expenses.by_household(household_id)?;
        expenses.sort_by_key(|e| (e.date, e.created_at));
        let mut alerts = storage.alerts.by_household(household_id)?;
        alerts.sort_by_key(|a| a.reported_at);

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            household,
            members,
            chores,
            missed_tasks,
            expenses,
            alerts,
        })
    }

    /// Check version and references between records
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let member_ids: HashSet<_> = self.members.iter().map(|m| m.id).collect();
        let chore_ids: HashSet<_> = self.chores.iter().map(|c| c.id).collect();

        for chore in &self.chores {
            if !member_ids.contains(&chore.assigned_to) {
                return Err(format!(
                    "Chore {} is assigned to unknown member {}",
                    chore.id, chore.assigned_to
                ));
            }
        }

        for missed in &self.missed_tasks {
            if !chore_ids.contains(&missed.chore_id) {
                return Err(format!(
                    "Missed task {} references unknown chore {}",
                    missed.id, missed.chore_id
                ));
            }
        }

        for expense in &self.expenses {
            let unknown = std::iter::once(&expense.paid_by)
                .chain(expense.split_between.iter())
                .find(|id| !member_ids.contains(id));
            if let Some(id) = unknown {
                return Err(format!(
                    "Expense {} references unknown member {}",
                    expense.id, id
                ));
            }
            expense
                .validate()
                .map_err(|e| format!("Expense {}: {}", expense.id, e))?;
        }

        for alert in &self.alerts {
            if !member_ids.contains(&alert.reported_by) {
                return Err(format!(
                    "Alert {} was reported by unknown member {}",
                    alert.id, alert.reported_by
                ));
            }
        }

        Ok(())
    }
}

/// Write the actor's household snapshot as JSON
pub fn export_household_json<W: Write>(
    storage: &Storage,
    actor: &Principal,
    writer: &mut W,
    pretty: bool,
) -> ChorebookResult<()> {
    let export = HouseholdExport::from_storage(storage, actor)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| ChorebookError::Export(e.to_string()))?;

    Ok(())
}

/// Parse and validate a snapshot
pub fn import_from_json(json_str: &str) -> ChorebookResult<HouseholdExport> {
    let export: HouseholdExport = serde_json::from_str(json_str)
        .map_err(|e| ChorebookError::Export(format!("Invalid export file: {}", e)))?;
    export.validate().map_err(ChorebookError::Export)?;
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::ChorebookPaths;
    use crate::models::{AlertCategory, AlertPriority, Money, Priority};
    use crate::services::{
        AlertService, ChoreService, CreateChoreInput, CreateExpenseInput, ExpenseService,
        HouseholdService, ReportAlertInput,
    };
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ChorebookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let households = HouseholdService::new(&storage);
        let (admin, _) = households.register("Ana", "ana@example.com", "Flat").unwrap();
        households.register("Jo", "jo@example.com", "Elsewhere").unwrap();
        let ana = admin.principal();

        ChoreService::new(&storage)
            .create(
                &ana,
                CreateChoreInput {
                    title: "Dust".into(),
                    description: None,
                    assigned_to: ana.member_id,
                    due_date: Utc::now(),
                    priority: Priority::Low,
                    category: "cleaning".into(),
                    recurrence: None,
                },
            )
            .unwrap();
        ExpenseService::new(&storage)
            .create(
                &ana,
                CreateExpenseInput {
                    title: "Soap".into(),
                    description: None,
                    category: None,
                    amount: Money::from_units(4),
                    paid_by: None,
                    split_between: Vec::new(),
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                },
            )
            .unwrap();
        AlertService::new(&storage)
            .report(
                &ana,
                ReportAlertInput {
                    title: "Smoke alarm chirping".into(),
                    description: "Battery low in the hallway".into(),
                    category: AlertCategory::Security,
                    priority: AlertPriority::High,
                },
                Utc::now(),
            )
            .unwrap();

        let mut out = Vec::new();
        export_household_json(&storage, &ana, &mut out, true).unwrap();
        let imported = import_from_json(&String::from_utf8(out).unwrap()).unwrap();

        assert_eq!(imported.household.name, "Flat");
        assert_eq!(imported.members.len(), 1);
        assert_eq!(imported.chores.len(), 1);
        assert_eq!(imported.expenses.len(), 1);
        assert_eq!(imported.alerts.len(), 1);
    }

    #[test]
    fn test_import_snapshot_without_alerts() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ChorebookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        let (admin, _) = HouseholdService::new(&storage)
            .register("Ana", "ana@example.com", "Flat")
            .unwrap();

        let export = HouseholdExport::from_storage(&storage, &admin.principal()).unwrap();
        let mut value = serde_json::to_value(&export).unwrap();
        value.as_object_mut().unwrap().remove("alerts");
        let imported = import_from_json(&value.to_string()).unwrap();
        assert!(imported.alerts.is_empty());
    }

    #[test]
    fn test_import_rejects_wrong_version() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ChorebookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        let (admin, _) = HouseholdService::new(&storage)
            .register("Ana", "ana@example.com", "Flat")
            .unwrap();

        let mut export = HouseholdExport::from_storage(&storage, &admin.principal()).unwrap();
        export.schema_version = "0.1.0".into();
        let json = serde_json::to_string(&export).unwrap();
        assert!(import_from_json(&json).is_err());
    }
}
