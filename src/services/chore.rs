//! Chore service
//!
//! Chore CRUD, completion toggling and the overdue/recurrence sweeps. The
//! scheduling rules live in `crate::recurrence`; this layer persists their
//! output and keeps repeated or concurrent sweeps from duplicating records.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::directory;
use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{Chore, ChoreId, MemberId, MissedTask, Priority, Principal, Recurrence};
use crate::recurrence;
use crate::storage::Storage;

/// Service for chore management
pub struct ChoreService<'a> {
    storage: &'a Storage,
}

/// Chore status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoreStatus {
    /// Not completed
    Open,
    Completed,
    /// Not completed and past due
    Overdue,
}

impl ChoreStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" | "pending" => Some(Self::Open),
            "completed" | "done" => Some(Self::Completed),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }
}

/// Options for filtering chores
#[derive(Debug, Clone, Default)]
pub struct ChoreFilter {
    pub status: Option<ChoreStatus>,
    pub priority: Option<Priority>,
    pub assignee: Option<MemberId>,
    /// Case-insensitive match on title, description or category
    pub search: Option<String>,
}

impl ChoreFilter {
    fn matches(&self, chore: &Chore, now: DateTime<Utc>) -> bool {
        let status_ok = match self.status {
            None => true,
            Some(ChoreStatus::Open) => !chore.completed,
            Some(ChoreStatus::Completed) => chore.completed,
            Some(ChoreStatus::Overdue) => chore.is_overdue(now),
        };

        let search_ok = self.search.as_deref().map_or(true, |term| {
            let term = term.to_lowercase();
            chore.title.to_lowercase().contains(&term)
                || chore.description.to_lowercase().contains(&term)
                || chore.category.to_lowercase().contains(&term)
        });

        status_ok
            && search_ok
            && self.priority.map_or(true, |p| chore.priority == p)
            && self.assignee.map_or(true, |a| chore.assigned_to == a)
    }
}

/// Input for creating a chore
#[derive(Debug, Clone)]
pub struct CreateChoreInput {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: MemberId,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub category: String,
    pub recurrence: Option<Recurrence>,
}

/// Changes to an existing chore; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct EditChoreInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<MemberId>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    /// `Some(None)` makes the chore one-off
    pub recurrence: Option<Option<Recurrence>>,
}

/// Records produced by one sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepOutcome {
    pub missed: Vec<MissedTask>,
    pub materialized: Vec<ChoreId>,
}

impl SweepOutcome {
    pub fn is_empty(&self) -> bool {
        self.missed.is_empty() && self.materialized.is_empty()
    }
}

impl<'a> ChoreService<'a> {
    /// Create a new chore service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn require_assignee(&self, actor: &Principal, member_id: MemberId) -> ChorebookResult<()> {
        let household_id = directory::resolve_household_id(actor)?;
        let member = self
            .storage
            .members
            .get(member_id)?
            .ok_or_else(|| ChorebookError::member_not_found(member_id.to_string()))?;
        if !directory::is_active_member(&member, household_id) {
            return Err(ChorebookError::Validation(format!(
                "{} is not an approved member of this household",
                member.name
            )));
        }
        Ok(())
    }

    /// Create a chore in the actor's household
    pub fn create(&self, actor: &Principal, input: CreateChoreInput) -> ChorebookResult<Chore> {
        let household_id = directory::resolve_household_id(actor)?;
        self.require_assignee(actor, input.assigned_to)?;

        let mut chore = Chore::new(
            household_id,
            input.title.trim(),
            input.assigned_to,
            input.due_date,
            input.category.trim(),
        );
        chore.description = input.description.unwrap_or_default().trim().to_string();
        chore.priority = input.priority;
        chore.recurrence = input.recurrence;
        chore.next_due_date = input
            .recurrence
            .as_ref()
            .map(|r| recurrence::next_due_date(chore.due_date, r));

        chore
            .validate()
            .map_err(|e| ChorebookError::Validation(e.to_string()))?;

        self.storage.chores.insert(chore.clone())?;

        self.storage.log_create(
            EntityType::Chore,
            chore.id.to_string(),
            Some(chore.title.clone()),
            &chore,
        )?;

        info!(chore = %chore.id, recurring = chore.is_recurring(), "chore created");
        Ok(chore)
    }

    /// Get a chore from the actor's household
    pub fn get(&self, actor: &Principal, id: ChoreId) -> ChorebookResult<Chore> {
        let chore = self
            .storage
            .chores
            .get(id)?
            .ok_or_else(|| ChorebookError::chore_not_found(id.to_string()))?;
        directory::require_same_household(actor, chore.household_id)?;
        Ok(chore)
    }

    /// Find a chore by id, short id or title, preferring open chores
    pub fn find(&self, actor: &Principal, identifier: &str) -> ChorebookResult<Chore> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<ChoreId>() {
            return self.get(actor, id);
        }

        let household_id = directory::resolve_household_id(actor)?;
        let mut matches = self.storage.chores.find(|c| {
            c.household_id == household_id
                && (c.id.matches_prefix(identifier) || c.title.eq_ignore_ascii_case(identifier))
        })?;
        matches.sort_by_key(|c| (c.completed, c.due_date));
        matches
            .into_iter()
            .next()
            .ok_or_else(|| ChorebookError::chore_not_found(identifier))
    }

    /// List chores in the actor's household, soonest due first
    pub fn list(
        &self,
        actor: &Principal,
        filter: &ChoreFilter,
        now: DateTime<Utc>,
    ) -> ChorebookResult<Vec<Chore>> {
        let household_id = directory::resolve_household_id(actor)?;
        let mut chores = self
            .storage
            .chores
            .find(|c| c.household_id == household_id && filter.matches(c, now))?;
        chores.sort_by_key(|c| (c.due_date, c.occurrence));
        Ok(chores)
    }

    /// Edit a chore; admin or assignee
    pub fn edit(
        &self,
        actor: &Principal,
        id: ChoreId,
        input: EditChoreInput,
    ) -> ChorebookResult<Chore> {
        let before = self.get(actor, id)?;
        directory::require_chore_completion(actor, &before)?;
        if let Some(assignee) = input.assigned_to {
            self.require_assignee(actor, assignee)?;
        }

        let after = self.storage.chores.modify(id, |chore| {
            if let Some(title) = &input.title {
                chore.title = title.trim().to_string();
            }
            if let Some(description) = &input.description {
                chore.description = description.trim().to_string();
            }
            if let Some(assignee) = input.assigned_to {
                chore.assigned_to = assignee;
            }
            if let Some(due_date) = input.due_date {
                chore.due_date = due_date;
            }
            if let Some(priority) = input.priority {
                chore.priority = priority;
            }
            if let Some(category) = &input.category {
                chore.category = category.trim().to_string();
            }
            if let Some(recurrence) = input.recurrence {
                chore.recurrence = recurrence;
            }

            // Re-derive the schedule for instances not yet handed on
            if !chore.materialized {
                chore.next_due_date = chore
                    .recurrence
                    .as_ref()
                    .map(|r| recurrence::next_due_date(chore.due_date, r));
            }

            chore
                .validate()
                .map_err(|e| ChorebookError::Validation(e.to_string()))?;
            chore.updated_at = Utc::now();
            Ok(chore.clone())
        })?;

        self.storage.log_update(
            EntityType::Chore,
            after.id.to_string(),
            Some(after.title.clone()),
            &before,
            &after,
            None,
        )?;

        Ok(after)
    }

    /// Delete a chore and its missed-task records; admin or assignee
    pub fn delete(&self, actor: &Principal, id: ChoreId) -> ChorebookResult<Chore> {
        let chore = self.get(actor, id)?;
        directory::require_chore_completion(actor, &chore)?;

        self.storage.chores.delete(id)?;
        let missed = self
            .storage
            .missed_tasks
            .delete_where(|m| recurrence::is_cleared_by(m, id))?;

        self.storage.log_delete(
            EntityType::Chore,
            chore.id.to_string(),
            Some(chore.title.clone()),
            &chore,
        )?;
        for record in &missed {
            self.storage.log_delete(
                EntityType::MissedTask,
                record.id.to_string(),
                Some(record.chore_title.clone()),
                record,
            )?;
        }

        info!(chore = %chore.id, missed_removed = missed.len(), "chore deleted");
        Ok(chore)
    }

    /// Complete an open chore or reopen a completed one
    ///
    /// Completing clears the chore's missed-task records.
    pub fn toggle_complete(
        &self,
        actor: &Principal,
        id: ChoreId,
        now: DateTime<Utc>,
    ) -> ChorebookResult<Chore> {
        let before = self.get(actor, id)?;
        directory::require_chore_completion(actor, &before)?;

        let after = self.storage.chores.modify(id, |chore| {
            *chore = if chore.completed {
                recurrence::on_chore_uncompleted(chore, now)
            } else {
                recurrence::on_chore_completed(chore, actor.member_id, now)
            };
            Ok(chore.clone())
        })?;

        let cleared = if after.completed {
            self.storage
                .missed_tasks
                .retain_with(|missed| recurrence::reconcile_on_complete(missed, id))?
        } else {
            Vec::new()
        };

        self.storage.log_update(
            EntityType::Chore,
            after.id.to_string(),
            Some(after.title.clone()),
            &before,
            &after,
            Some(format!("completed: {} -> {}", before.completed, after.completed)),
        )?;
        for record in &cleared {
            self.storage.log_delete(
                EntityType::MissedTask,
                record.id.to_string(),
                Some(record.chore_title.clone()),
                record,
            )?;
        }

        info!(chore = %after.id, completed = after.completed, "chore toggled");
        Ok(after)
    }

    /// Missed-task records in the actor's household, newest first
    pub fn missed_tasks(&self, actor: &Principal) -> ChorebookResult<Vec<MissedTask>> {
        let household_id = directory::resolve_household_id(actor)?;
        let mut missed = self.storage.missed_tasks.by_household(household_id)?;
        missed.sort_by(|a, b| b.missed_date.cmp(&a.missed_date));
        Ok(missed)
    }

    /// Run the overdue sweep, then the recurrence sweep, across all households
    ///
    /// Safe to call repeatedly and concurrently, from threads sharing one
    /// storage or from separate processes on the same data directory:
    /// a chore gets at most one missed-task record, and each completed
    /// recurring instance hands on to exactly one successor.
    pub fn run_sweeps(&self, now: DateTime<Utc>) -> ChorebookResult<SweepOutcome> {
        self.storage.chores.load()?;
        self.storage.missed_tasks.load()?;

        let mut outcome = SweepOutcome {
            missed: self.sweep_overdue(now)?,
            materialized: Vec::new(),
        };
        outcome.materialized = self.sweep_recurrence(now)?;

        if !outcome.is_empty() {
            info!(
                missed = outcome.missed.len(),
                materialized = outcome.materialized.len(),
                "sweep recorded changes"
            );
        }
        Ok(outcome)
    }

    fn sweep_overdue(&self, now: DateTime<Utc>) -> ChorebookResult<Vec<MissedTask>> {
        let overdue = self.storage.chores.find(|c| c.is_overdue(now))?;
        if overdue.is_empty() {
            return Ok(Vec::new());
        }
        let existing = self.storage.missed_tasks.find(|_| true)?;

        let mut recorded = Vec::new();
        for draft in recurrence::sweep_overdue(&overdue, &existing, now) {
            let chore_id = draft.chore_id;
            if self
                .storage
                .missed_tasks
                .insert_unless(draft.clone(), |m| m.chore_id == chore_id)?
            {
                recorded.push(draft);
            } else {
                debug!(chore = %chore_id, "missed task already recorded");
            }
        }

        for record in &recorded {
            self.storage.log_create(
                EntityType::MissedTask,
                record.id.to_string(),
                Some(record.chore_title.clone()),
                record,
            )?;
        }
        Ok(recorded)
    }

    fn sweep_recurrence(&self, now: DateTime<Utc>) -> ChorebookResult<Vec<ChoreId>> {
        let chores = self.storage.chores.find(|_| true)?;

        let mut created = Vec::new();
        for draft in recurrence::sweep_recurrence(&chores, now) {
            let source = chores
                .iter()
                .find(|c| c.series_id == draft.series_id && c.occurrence + 1 == draft.occurrence);
            let Some(source) = source else {
                continue;
            };

            // Claim the source first; a concurrent sweep that got there
            // earlier leaves it marked and we skip.
            let claimed = self.storage.chores.modify(source.id, |chore| {
                if !recurrence::is_due_for_materialization(chore, now) {
                    return Ok(false);
                }
                chore.materialized = true;
                chore.updated_at = now;
                Ok(true)
            })?;
            if !claimed {
                debug!(chore = %source.id, "already materialized");
                continue;
            }

            let (series_id, occurrence) = (draft.series_id, draft.occurrence);
            if self.storage.chores.insert_unless(draft.clone(), |c| {
                c.series_id == series_id && c.occurrence == occurrence
            })? {
                self.storage.log_create(
                    EntityType::Chore,
                    draft.id.to_string(),
                    Some(draft.title.clone()),
                    &draft,
                )?;
                created.push(draft.id);
            }
        }

        Ok(created)
    }
}
