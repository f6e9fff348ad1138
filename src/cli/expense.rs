//! Expense CLI commands

use chrono::Utc;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::directory;
use crate::display::{format_expense_breakdown, format_expense_list};
use crate::error::{ChorebookError, ChorebookResult};
use crate::models::MemberId;
use crate::services::{
    CreateExpenseInput, EditExpenseInput, ExpenseFilter, ExpenseService, ExpenseStatus,
    HouseholdService,
};
use crate::storage::Storage;

use super::{find_member, parse_date, parse_money, require_actor};

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Add a shared expense
    Add {
        /// Expense title
        title: String,
        /// Total amount (e.g. "90.00")
        amount: String,
        /// Who paid (defaults to you)
        #[arg(long)]
        paid_by: Option<String>,
        /// Members sharing the cost, comma separated (defaults to the payer)
        #[arg(short, long, value_delimiter = ',')]
        split: Vec<String>,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Category
        #[arg(short, long)]
        category: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
    },
    /// List expenses
    List {
        /// Filter (all, settled, pending)
        #[arg(short, long, default_value = "all")]
        filter: String,
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Search title and description
        #[arg(short = 'q', long)]
        search: Option<String>,
    },
    /// Show an expense with its shares and payments
    Show {
        /// Expense title or ID
        expense: String,
    },
    /// Edit an expense
    Edit {
        /// Expense title or ID
        expense: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        /// New total amount; shares are revalued
        #[arg(short, long)]
        amount: Option<String>,
        /// New participants, comma separated; shares are revalued
        #[arg(short, long, value_delimiter = ',')]
        split: Option<Vec<String>>,
    },
    /// Pay back your share of an expense
    Pay {
        /// Expense title or ID
        expense: String,
        /// Amount paid
        amount: String,
        /// Optional note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Toggle the settled state by hand
    Settle {
        /// Expense title or ID
        expense: String,
    },
    /// Drop a manual settle decision and go back to payment-based settlement
    ClearOverride {
        /// Expense title or ID
        expense: String,
    },
    /// Delete an expense and its payments
    Delete {
        /// Expense title or ID
        expense: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: ExpenseCommands,
) -> ChorebookResult<()> {
    let principal = require_actor(storage, actor)?;
    let service = ExpenseService::new(storage);
    let names = HouseholdService::new(storage)
        .member_names(directory::resolve_household_id(&principal)?)?;
    let symbol = settings.currency_symbol.as_str();
    let now = Utc::now();

    let resolve_members = |identifiers: &[String]| -> ChorebookResult<Vec<MemberId>> {
        identifiers
            .iter()
            .map(|identifier| find_member(storage, &principal, identifier.trim()).map(|m| m.id))
            .collect()
    };

    match cmd {
        ExpenseCommands::Add {
            title,
            amount,
            paid_by,
            split,
            date,
            category,
            description,
        } => {
            let paid_by = paid_by
                .map(|identifier| find_member(storage, &principal, &identifier).map(|m| m.id))
                .transpose()?;
            let input = CreateExpenseInput {
                title,
                description,
                category,
                amount: parse_money(&amount)?,
                paid_by,
                split_between: resolve_members(split.as_slice())?,
                date: match date {
                    Some(d) => parse_date(&d)?,
                    None => now.date_naive(),
                },
            };

            let expense = service.create(&principal, input)?;
            let breakdown = service.breakdown(&principal, expense.id)?;
            println!("Created expense:");
            print!("{}", format_expense_breakdown(&breakdown, &names, symbol));
        }

        ExpenseCommands::List {
            filter,
            category,
            search,
        } => {
            let status = ExpenseStatus::parse(&filter).ok_or_else(|| {
                ChorebookError::Validation(format!(
                    "Invalid filter: '{}'. Use all, settled or pending",
                    filter
                ))
            })?;
            let filter = ExpenseFilter {
                status,
                category,
                search,
            };
            let expenses = service.list(&principal, &filter)?;
            println!("{}", format_expense_list(&expenses, &names, symbol));
        }

        ExpenseCommands::Show { expense } => {
            let expense = service.find(&principal, &expense)?;
            let breakdown = service.breakdown(&principal, expense.id)?;
            print!("{}", format_expense_breakdown(&breakdown, &names, symbol));
        }

        ExpenseCommands::Edit {
            expense,
            title,
            description,
            category,
            date,
            amount,
            split,
        } => {
            let expense = service.find(&principal, &expense)?;
            let input = EditExpenseInput {
                title,
                description,
                category,
                date: date.as_deref().map(parse_date).transpose()?,
                amount: amount.as_deref().map(parse_money).transpose()?,
                split_between: split.as_deref().map(resolve_members).transpose()?,
            };

            let updated = service.edit(&principal, expense.id, input)?;
            if updated.amount != expense.amount && !updated.payments.is_empty() {
                println!(
                    "Note: {} in payments were recorded against the old amount",
                    updated.total_paid().format_with_symbol(symbol)
                );
            }
            let breakdown = service.breakdown(&principal, updated.id)?;
            println!("Updated expense:");
            print!("{}", format_expense_breakdown(&breakdown, &names, symbol));
        }

        ExpenseCommands::Pay {
            expense,
            amount,
            note,
        } => {
            let expense = service.find(&principal, &expense)?;
            let payment =
                service.record_payment(&principal, expense.id, parse_money(&amount)?, note, now)?;
            let breakdown = service.breakdown(&principal, expense.id)?;
            println!(
                "Recorded payment of {} toward {}",
                payment.amount.format_with_symbol(symbol),
                expense.title
            );
            if breakdown.expense.is_settled() {
                println!("Expense is now settled.");
            } else {
                println!(
                    "Outstanding: {}",
                    breakdown.status.outstanding().format_with_symbol(symbol)
                );
            }
        }

        ExpenseCommands::Settle { expense } => {
            let expense = service.find(&principal, &expense)?;
            let updated = service.toggle_settled(&principal, expense.id, now)?;
            if updated.is_settled() {
                println!("Marked settled: {}", updated.title);
            } else {
                println!("Marked unsettled: {}", updated.title);
            }
        }

        ExpenseCommands::ClearOverride { expense } => {
            let expense = service.find(&principal, &expense)?;
            let updated = service.clear_override(&principal, expense.id, now)?;
            println!(
                "Cleared manual settlement on {}; now {}",
                updated.title,
                if updated.is_settled() { "settled" } else { "unsettled" }
            );
        }

        ExpenseCommands::Delete { expense } => {
            let expense = service.find(&principal, &expense)?;
            let deleted = service.delete(&principal, expense.id)?;
            println!(
                "Deleted expense: {} ({} payment(s) removed)",
                deleted.title,
                deleted.payments.len()
            );
        }
    }

    Ok(())
}
