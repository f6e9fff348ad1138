//! Chore CLI commands

use chrono::Utc;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::directory;
use crate::display::{format_chore_details, format_chore_list, format_missed_tasks};
use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{Priority, Recurrence, RecurrenceKind};
use crate::services::{
    ChoreFilter, ChoreService, ChoreStatus, CreateChoreInput, EditChoreInput, HouseholdService,
};
use crate::storage::Storage;

use super::{find_member, parse_due, require_actor};

/// Chore subcommands
#[derive(Subcommand)]
pub enum ChoreCommands {
    /// Add a chore
    Add {
        /// Chore title
        title: String,
        /// Assignee name, email or ID (defaults to you)
        #[arg(short, long)]
        assignee: Option<String>,
        /// Due date (YYYY-MM-DD or "YYYY-MM-DD HH:MM")
        #[arg(short, long)]
        due: String,
        /// Priority (low, medium, high)
        #[arg(short, long, default_value = "medium")]
        priority: String,
        /// Category
        #[arg(short, long)]
        category: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Repeat (daily, weekly, monthly, custom)
        #[arg(short, long)]
        repeat: Option<String>,
        /// Units between repeats (days for custom)
        #[arg(long, default_value = "1")]
        every: u32,
    },
    /// List chores
    List {
        /// Status (open, completed, overdue)
        #[arg(short, long)]
        status: Option<String>,
        /// Priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,
        /// Assignee name, email or ID
        #[arg(short, long)]
        assignee: Option<String>,
        /// Search title, description and category
        #[arg(short = 'q', long)]
        search: Option<String>,
        /// Only chores assigned to you
        #[arg(long)]
        mine: bool,
    },
    /// Show chore details
    Show {
        /// Chore title or ID
        chore: String,
    },
    /// Edit a chore
    Edit {
        /// Chore title or ID
        chore: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// New assignee name, email or ID
        #[arg(short, long)]
        assignee: Option<String>,
        #[arg(short, long)]
        due: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// New repeat kind (daily, weekly, monthly, custom)
        #[arg(short, long)]
        repeat: Option<String>,
        /// Units between repeats
        #[arg(long)]
        every: Option<u32>,
        /// Stop repeating
        #[arg(long, conflicts_with_all = ["repeat", "every"])]
        once: bool,
    },
    /// Delete a chore and its missed records
    Delete {
        /// Chore title or ID
        chore: String,
    },
    /// Mark a chore done, or reopen it if already done
    #[command(alias = "toggle")]
    Done {
        /// Chore title or ID
        chore: String,
    },
    /// List missed chores
    Missed,
    /// Run the overdue and recurrence sweeps now
    Sweep,
}

fn parse_priority(s: &str) -> ChorebookResult<Priority> {
    Priority::parse(s).ok_or_else(|| {
        ChorebookError::Validation(format!(
            "Invalid priority: '{}'. Use low, medium or high",
            s
        ))
    })
}

fn parse_recurrence(kind: &str, every: u32) -> ChorebookResult<Recurrence> {
    let kind = RecurrenceKind::parse(kind).ok_or_else(|| {
        ChorebookError::Validation(format!(
            "Invalid repeat: '{}'. Use daily, weekly, monthly or custom",
            kind
        ))
    })?;
    Ok(Recurrence::new(kind, every))
}

/// Handle a chore command
pub fn handle_chore_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: ChoreCommands,
) -> ChorebookResult<()> {
    let service = ChoreService::new(storage);
    let now = Utc::now();

    if let ChoreCommands::Sweep = cmd {
        let outcome = service.run_sweeps(now)?;
        println!(
            "Sweep complete: {} missed, {} new occurrence(s)",
            outcome.missed.len(),
            outcome.materialized.len()
        );
        return Ok(());
    }

    run_member_command(storage, settings, actor, cmd)
}

fn run_member_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: ChoreCommands,
) -> ChorebookResult<()> {
    let service = ChoreService::new(storage);
    let now = Utc::now();
    let principal = require_actor(storage, actor)?;
    let names = HouseholdService::new(storage)
        .member_names(directory::resolve_household_id(&principal)?)?;

    match cmd {
        ChoreCommands::Add {
            title,
            assignee,
            due,
            priority,
            category,
            description,
            repeat,
            every,
        } => {
            let assigned_to = match assignee {
                Some(identifier) => find_member(storage, &principal, &identifier)?.id,
                None => principal.member_id,
            };
            let input = CreateChoreInput {
                title,
                description,
                assigned_to,
                due_date: parse_due(&due)?,
                priority: parse_priority(&priority)?,
                category: category.unwrap_or_else(|| settings.default_chore_category.clone()),
                recurrence: repeat
                    .as_deref()
                    .map(|kind| parse_recurrence(kind, every))
                    .transpose()?,
            };

            let chore = service.create(&principal, input)?;
            println!("Created chore:");
            print!("{}", format_chore_details(&chore, &names, now));
        }

        ChoreCommands::List {
            status,
            priority,
            assignee,
            search,
            mine,
        } => {
            let mut filter = ChoreFilter {
                search,
                ..Default::default()
            };
            if let Some(status) = status {
                filter.status = Some(ChoreStatus::parse(&status).ok_or_else(|| {
                    ChorebookError::Validation(format!(
                        "Invalid status: '{}'. Use open, completed or overdue",
                        status
                    ))
                })?);
            }
            if let Some(priority) = priority {
                filter.priority = Some(parse_priority(&priority)?);
            }
            if mine {
                filter.assignee = Some(principal.member_id);
            } else if let Some(identifier) = assignee {
                filter.assignee = Some(find_member(storage, &principal, &identifier)?.id);
            }

            let chores = service.list(&principal, &filter, now)?;
            println!("{}", format_chore_list(&chores, &names, now));
        }

        ChoreCommands::Show { chore } => {
            let chore = service.find(&principal, &chore)?;
            print!("{}", format_chore_details(&chore, &names, now));
        }

        ChoreCommands::Edit {
            chore,
            title,
            description,
            assignee,
            due,
            priority,
            category,
            repeat,
            every,
            once,
        } => {
            let existing = service.find(&principal, &chore)?;

            let recurrence = if once {
                Some(None)
            } else {
                match (repeat, every) {
                    (Some(kind), every) => Some(Some(parse_recurrence(
                        &kind,
                        every.unwrap_or(1),
                    )?)),
                    (None, Some(every)) => {
                        let current = existing.recurrence.ok_or_else(|| {
                            ChorebookError::Validation(
                                "Chore does not repeat; pass --repeat as well".into(),
                            )
                        })?;
                        Some(Some(Recurrence::new(current.kind, every)))
                    }
                    (None, None) => None,
                }
            };

            let input = EditChoreInput {
                title,
                description,
                assigned_to: assignee
                    .map(|identifier| find_member(storage, &principal, &identifier).map(|m| m.id))
                    .transpose()?,
                due_date: due.as_deref().map(parse_due).transpose()?,
                priority: priority.as_deref().map(parse_priority).transpose()?,
                category,
                recurrence,
            };

            let chore = service.edit(&principal, existing.id, input)?;
            println!("Updated chore:");
            print!("{}", format_chore_details(&chore, &names, now));
        }

        ChoreCommands::Delete { chore } => {
            let chore = service.find(&principal, &chore)?;
            let deleted = service.delete(&principal, chore.id)?;
            println!("Deleted chore: {}", deleted.title);
        }

        ChoreCommands::Done { chore } => {
            let chore = service.find(&principal, &chore)?;
            let chore = service.toggle_complete(&principal, chore.id, now)?;
            if chore.completed {
                println!("Completed: {}", chore.title);
                if let Some(next) = chore.next_due_date {
                    println!("  Next due: {}", next.format(&settings.date_format));
                }
            } else {
                println!("Reopened: {}", chore.title);
            }
        }

        ChoreCommands::Missed => {
            let missed = service.missed_tasks(&principal)?;
            println!("{}", format_missed_tasks(&missed, &names));
        }

        ChoreCommands::Sweep => {
            service.run_sweeps(now)?;
        }
    }

    Ok(())
}
