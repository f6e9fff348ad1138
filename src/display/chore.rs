//! Chore display formatting

use chrono::{DateTime, Utc};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Chore, MissedTask};

use super::report::truncate;
use super::{member_name, MemberNames};

#[derive(Tabled)]
struct ChoreRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Repeats")]
    repeats: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn status_label(chore: &Chore, now: DateTime<Utc>) -> &'static str {
    if chore.completed {
        "done"
    } else if chore.is_overdue(now) {
        "OVERDUE"
    } else {
        "open"
    }
}

/// Format a list of chores as a table
pub fn format_chore_list(chores: &[Chore], names: &MemberNames, now: DateTime<Utc>) -> String {
    if chores.is_empty() {
        return "No chores found.".to_string();
    }

    let rows = chores.iter().map(|chore| ChoreRow {
        id: chore.id.short(),
        title: truncate(&chore.title, 32),
        assignee: member_name(names, chore.assigned_to),
        due: chore.due_date.format("%Y-%m-%d").to_string(),
        priority: chore.priority.to_string(),
        repeats: chore
            .recurrence
            .map(|r| r.to_string())
            .unwrap_or_default(),
        status: status_label(chore, now).to_string(),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

/// Format a single chore's details
pub fn format_chore_details(chore: &Chore, names: &MemberNames, now: DateTime<Utc>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Chore: {}\n", chore.title));
    output.push_str(&format!("  ID:          {}\n", chore.id));
    if !chore.description.is_empty() {
        output.push_str(&format!("  Description: {}\n", chore.description));
    }
    output.push_str(&format!(
        "  Assigned to: {}\n",
        member_name(names, chore.assigned_to)
    ));
    output.push_str(&format!(
        "  Due:         {}\n",
        chore.due_date.format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!("  Priority:    {}\n", chore.priority));
    output.push_str(&format!("  Category:    {}\n", chore.category));
    output.push_str(&format!("  Status:      {}\n", status_label(chore, now)));

    if let (Some(at), Some(by)) = (chore.completed_at, chore.completed_by) {
        output.push_str(&format!(
            "  Completed:   {} by {}\n",
            at.format("%Y-%m-%d %H:%M"),
            member_name(names, by)
        ));
    }

    if let Some(recurrence) = &chore.recurrence {
        output.push_str(&format!(
            "  Repeats:     {} (occurrence {})\n",
            recurrence, chore.occurrence
        ));
        if let Some(next) = chore.next_due_date {
            output.push_str(&format!("  Next due:    {}\n", next.format("%Y-%m-%d")));
        }
    }

    output
}

#[derive(Tabled)]
struct MissedRow {
    #[tabled(rename = "Chore")]
    chore: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Was due")]
    due: String,
    #[tabled(rename = "Flagged")]
    flagged: String,
    #[tabled(rename = "Priority")]
    priority: String,
}

/// Format missed-task records as a table
pub fn format_missed_tasks(missed: &[MissedTask], names: &MemberNames) -> String {
    if missed.is_empty() {
        return "No missed chores.".to_string();
    }

    let rows = missed.iter().map(|m| MissedRow {
        chore: truncate(&m.chore_title, 32),
        assignee: member_name(names, m.assigned_to),
        due: m.due_date.format("%Y-%m-%d").to_string(),
        flagged: m.missed_date.format("%Y-%m-%d").to_string(),
        priority: m.priority.to_string(),
    });

    Table::new(rows).with(Style::psql()).to_string()
}
