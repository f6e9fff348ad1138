//! Alert CLI commands

use chrono::Utc;
use clap::Subcommand;

use crate::directory;
use crate::display::{format_alert_details, format_alert_list};
use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{AlertCategory, AlertPriority, AlertStatus};
use crate::services::{AlertFilter, AlertService, HouseholdService, ReportAlertInput};
use crate::storage::Storage;

use super::require_actor;

/// Alert subcommands
#[derive(Subcommand)]
pub enum AlertCommands {
    /// Report a household issue
    Report {
        /// Short title
        title: String,
        /// What is wrong
        #[arg(short, long)]
        description: String,
        /// Category (maintenance, utilities, security, emergency, other)
        #[arg(short, long, default_value = "maintenance")]
        category: String,
        /// Priority (low, medium, high, urgent)
        #[arg(short, long, default_value = "medium")]
        priority: String,
    },
    /// List alerts, unresolved first
    List {
        /// Status (open, in-progress, resolved)
        #[arg(short, long)]
        status: Option<String>,
        /// Category
        #[arg(short, long)]
        category: Option<String>,
        /// Priority
        #[arg(short, long)]
        priority: Option<String>,
    },
    /// Show alert details
    Show {
        /// Alert title or ID
        alert: String,
    },
    /// Mark an alert as being worked on
    Start {
        /// Alert title or ID
        alert: String,
    },
    /// Mark an alert as resolved
    Resolve {
        /// Alert title or ID
        alert: String,
    },
    /// Reopen an alert
    Reopen {
        /// Alert title or ID
        alert: String,
    },
    /// Delete an alert (admin)
    Delete {
        /// Alert title or ID
        alert: String,
    },
}

fn parse_category(s: &str) -> ChorebookResult<AlertCategory> {
    AlertCategory::parse(s).ok_or_else(|| {
        ChorebookError::Validation(format!(
            "Invalid category: '{}'. Use maintenance, utilities, security, emergency or other",
            s
        ))
    })
}

fn parse_priority(s: &str) -> ChorebookResult<AlertPriority> {
    AlertPriority::parse(s).ok_or_else(|| {
        ChorebookError::Validation(format!(
            "Invalid priority: '{}'. Use low, medium, high or urgent",
            s
        ))
    })
}

/// Handle an alert command
pub fn handle_alert_command(
    storage: &Storage,
    actor: Option<&str>,
    cmd: AlertCommands,
) -> ChorebookResult<()> {
    let principal = require_actor(storage, actor)?;
    let service = AlertService::new(storage);
    let names = HouseholdService::new(storage)
        .member_names(directory::resolve_household_id(&principal)?)?;
    let now = Utc::now();

    let set_status = |identifier: &str, status: AlertStatus| -> ChorebookResult<()> {
        let alert = service.find(&principal, identifier)?;
        let alert = service.update_status(&principal, alert.id, status, now)?;
        println!("'{}' is now {}", alert.title, alert.status);
        Ok(())
    };

    match cmd {
        AlertCommands::Report {
            title,
            description,
            category,
            priority,
        } => {
            let input = ReportAlertInput {
                title,
                description,
                category: parse_category(&category)?,
                priority: parse_priority(&priority)?,
            };
            let alert = service.report(&principal, input, now)?;
            println!("Reported alert:");
            print!("{}", format_alert_details(&alert, &names));
        }

        AlertCommands::List {
            status,
            category,
            priority,
        } => {
            let mut filter = AlertFilter::default();
            if let Some(status) = status {
                filter.status = Some(AlertStatus::parse(&status).ok_or_else(|| {
                    ChorebookError::Validation(format!(
                        "Invalid status: '{}'. Use open, in-progress or resolved",
                        status
                    ))
                })?);
            }
            if let Some(category) = category {
                filter.category = Some(parse_category(&category)?);
            }
            if let Some(priority) = priority {
                filter.priority = Some(parse_priority(&priority)?);
            }

            let alerts = service.list(&principal, &filter)?;
            println!("{}", format_alert_list(&alerts, &names));
        }

        AlertCommands::Show { alert } => {
            let alert = service.find(&principal, &alert)?;
            print!("{}", format_alert_details(&alert, &names));
        }

        AlertCommands::Start { alert } => set_status(&alert, AlertStatus::InProgress)?,
        AlertCommands::Resolve { alert } => set_status(&alert, AlertStatus::Resolved)?,
        AlertCommands::Reopen { alert } => set_status(&alert, AlertStatus::Open)?,

        AlertCommands::Delete { alert } => {
            let alert = service.find(&principal, &alert)?;
            let deleted = service.delete(&principal, alert.id)?;
            println!("Deleted alert '{}'", deleted.title);
        }
    }

    Ok(())
}
