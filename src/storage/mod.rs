//! Storage layer for Chorebook
//!
//! One JSON file per collection with atomic writes. Every mutation locks the
//! collection file, re-reads it and writes it back before returning, so
//! there is no separate save step. Queries are simple equality predicates
//! over id, household and status, which is all the services need from a
//! document store.

pub mod collection;
pub mod file_io;

pub use collection::{Collection, Record};
pub use file_io::{read_json, write_json_atomic};

use serde::Serialize;
use tracing::warn;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::ChorebookPaths;
use crate::error::ChorebookResult;
use crate::models::{Alert, Chore, Expense, Household, Member, MissedTask};

/// Main storage coordinator that provides access to all collections
pub struct Storage {
    paths: ChorebookPaths,
    audit: Option<AuditLogger>,
    pub members: Collection<Member>,
    pub households: Collection<Household>,
    pub chores: Collection<Chore>,
    pub missed_tasks: Collection<MissedTask>,
    pub expenses: Collection<Expense>,
    pub alerts: Collection<Alert>,
}

impl Storage {
    /// Create a storage instance with audit logging enabled
    pub fn new(paths: ChorebookPaths) -> ChorebookResult<Self> {
        Self::with_audit(paths, true)
    }

    /// Create a storage instance, choosing whether to write the audit log
    pub fn with_audit(paths: ChorebookPaths, audit_enabled: bool) -> ChorebookResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: audit_enabled.then(|| AuditLogger::new(paths.audit_log())),
            members: Collection::new(paths.members_file()),
            households: Collection::new(paths.households_file()),
            chores: Collection::new(paths.chores_file()),
            missed_tasks: Collection::new(paths.missed_tasks_file()),
            expenses: Collection::new(paths.expenses_file()),
            alerts: Collection::new(paths.alerts_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &ChorebookPaths {
        &self.paths
    }

    /// The audit logger, if auditing is enabled
    pub fn audit(&self) -> Option<&AuditLogger> {
        self.audit.as_ref()
    }

    /// Load all data from disk
    pub fn load_all(&self) -> ChorebookResult<()> {
        self.members.load()?;
        self.households.load()?;
        self.chores.load()?;
        self.missed_tasks.load()?;
        self.expenses.load()?;
        self.alerts.load()?;
        Ok(())
    }

    /// Check if a household has ever been set up here
    pub fn is_initialized(&self) -> bool {
        self.paths.households_file().exists()
    }

    fn write_audit(&self, entry: AuditEntry) -> ChorebookResult<()> {
        if let Some(logger) = &self.audit {
            logger.log(&entry)?;
        }
        Ok(())
    }

    /// Record a create in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> ChorebookResult<()> {
        self.write_audit(AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update; the diff summary is generated when not supplied
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> ChorebookResult<()> {
        let diff_summary = diff_summary.or_else(|| {
            match (serde_json::to_value(before), serde_json::to_value(after)) {
                (Ok(b), Ok(a)) => generate_diff(&b, &a),
                _ => {
                    warn!(%entity_type, "could not snapshot entity for audit diff");
                    None
                }
            }
        });
        self.write_audit(AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary,
        ))
    }

    /// Record a delete in the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> ChorebookResult<()> {
        self.write_audit(AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}
