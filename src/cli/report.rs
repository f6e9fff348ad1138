//! CLI commands for reports

use chrono::Utc;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::format_balances;
use crate::error::ChorebookResult;
use crate::reports::{BalanceReport, DashboardReport};
use crate::storage::Storage;

use super::require_actor;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Household dashboard: chore completion, settlement and overdue work
    #[command(alias = "summary")]
    Dashboard,

    /// Who owes whom across unsettled expenses
    Balances,
}

/// Handle report commands
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: ReportCommands,
) -> ChorebookResult<()> {
    let principal = require_actor(storage, actor)?;
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ReportCommands::Dashboard => {
            let report = DashboardReport::generate(storage, &principal, Utc::now())?;
            print!("{}", report.format_terminal(symbol));
        }
        ReportCommands::Balances => {
            let report = BalanceReport::generate(storage, &principal)?;
            println!("{}", format_balances(&report, symbol));
        }
    }

    Ok(())
}
