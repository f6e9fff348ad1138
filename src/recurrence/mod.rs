//! Recurrence engine
//!
//! Pure functions over chores and missed tasks. Nothing here touches
//! storage; `ChoreService` persists what these functions produce and flips
//! the `materialized` marker so repeated sweeps stay idempotent.
//!
//! A sweep runs in two passes, overdue detection first, so an instance that
//! recurrence just created is never flagged missed in the same pass.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Months, Utc};

use crate::models::{Chore, ChoreId, MemberId, MissedTask, Recurrence, RecurrenceKind};

/// Due date of the occurrence after `current`
///
/// Monthly steps use calendar arithmetic and clamp to the end of shorter
/// months (Jan 31 + 1 month = Feb 28/29). An interval of zero is treated
/// as one.
pub fn next_due_date(current: DateTime<Utc>, recurrence: &Recurrence) -> DateTime<Utc> {
    let interval = recurrence.interval.max(1);
    let next = match recurrence.kind {
        RecurrenceKind::Daily | RecurrenceKind::Custom => {
            current.checked_add_signed(Duration::days(i64::from(interval)))
        }
        RecurrenceKind::Weekly => current.checked_add_signed(Duration::weeks(i64::from(interval))),
        RecurrenceKind::Monthly => current.checked_add_months(Months::new(interval)),
        RecurrenceKind::Unrecognized => current.checked_add_signed(Duration::weeks(1)),
    };
    next.unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Mark a chore completed
///
/// For recurring chores the next due date is computed from the chore's own
/// due date and stored on this instance. The following instance is not
/// created here; `sweep_recurrence` does that once the date arrives.
pub fn on_chore_completed(chore: &Chore, completed_by: MemberId, now: DateTime<Utc>) -> Chore {
    let mut updated = chore.clone();
    updated.completed = true;
    updated.completed_at = Some(now);
    updated.completed_by = Some(completed_by);
    updated.next_due_date = chore
        .recurrence
        .as_ref()
        .map(|recurrence| next_due_date(chore.due_date, recurrence));
    updated.updated_at = now;
    updated
}

/// Reopen a completed chore
///
/// `next_due_date` is left as it was and gets recomputed on the next
/// completion.
pub fn on_chore_uncompleted(chore: &Chore, now: DateTime<Utc>) -> Chore {
    let mut updated = chore.clone();
    updated.completed = false;
    updated.completed_at = None;
    updated.completed_by = None;
    updated.updated_at = now;
    updated
}

/// Whether a chore is due to have its following instance created
pub fn is_due_for_materialization(chore: &Chore, now: DateTime<Utc>) -> bool {
    chore.is_recurring()
        && chore.completed
        && !chore.materialized
        && chore.next_due_date.is_some_and(|next| next <= now)
}

/// Build the instance that follows `source` in its series
pub fn next_instance(source: &Chore, now: DateTime<Utc>) -> Option<Chore> {
    let recurrence = source.recurrence?;
    let due_date = source.next_due_date?;

    Some(Chore {
        id: ChoreId::new(),
        household_id: source.household_id,
        series_id: source.series_id,
        occurrence: source.occurrence + 1,
        title: source.title.clone(),
        description: source.description.clone(),
        assigned_to: source.assigned_to,
        due_date,
        completed: false,
        completed_at: None,
        completed_by: None,
        priority: source.priority,
        category: source.category.clone(),
        recurrence: Some(recurrence),
        next_due_date: Some(next_due_date(due_date, &recurrence)),
        materialized: false,
        created_at: now,
        updated_at: now,
    })
}

/// New chore instances for every completed recurring chore whose next due
/// date has arrived
///
/// Sources already marked `materialized`, and sources whose successor in
/// the series is already present in `chores`, produce nothing.
pub fn sweep_recurrence(chores: &[Chore], now: DateTime<Utc>) -> Vec<Chore> {
    let existing: HashSet<_> = chores
        .iter()
        .map(|chore| (chore.series_id, chore.occurrence))
        .collect();

    chores
        .iter()
        .filter(|chore| is_due_for_materialization(chore, now))
        .filter(|chore| !existing.contains(&(chore.series_id, chore.occurrence + 1)))
        .filter_map(|chore| next_instance(chore, now))
        .collect()
}

/// Missed-task records for overdue chores that do not have one yet
pub fn sweep_overdue(
    chores: &[Chore],
    missed_tasks: &[MissedTask],
    now: DateTime<Utc>,
) -> Vec<MissedTask> {
    let mut flagged: HashSet<ChoreId> = missed_tasks.iter().map(|m| m.chore_id).collect();

    chores
        .iter()
        .filter(|chore| chore.is_overdue(now))
        .filter(|chore| flagged.insert(chore.id))
        .map(|chore| MissedTask::from_chore(chore, now))
        .collect()
}

/// Whether completing `chore_id` clears this missed-task record
pub fn is_cleared_by(missed_task: &MissedTask, chore_id: ChoreId) -> bool {
    missed_task.chore_id == chore_id
}

/// The missed tasks that remain once `chore_id` is completed
pub fn reconcile_on_complete(missed_tasks: &[MissedTask], chore_id: ChoreId) -> Vec<MissedTask> {
    missed_tasks
        .iter()
        .filter(|missed| !is_cleared_by(missed, chore_id))
        .cloned()
        .collect()
}
