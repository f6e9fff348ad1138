//! CLI commands for data export

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::error::{ChorebookError, ChorebookResult};
use crate::export::{self, HouseholdExport};
use crate::storage::Storage;

use super::require_actor;

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export expenses (or payments) to CSV
    Csv {
        /// Output file path
        output: PathBuf,

        /// Export one row per payment instead of per expense
        #[arg(long)]
        payments: bool,
    },

    /// Export a full household snapshot to JSON
    Json {
        /// Output file path
        output: PathBuf,

        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Check that a JSON snapshot is readable and consistent
    Verify {
        /// Snapshot file path
        input: PathBuf,
    },

    /// Show what a snapshot of your household would contain
    Info,
}

fn create_writer(output: &Path) -> ChorebookResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        ChorebookError::Export(format!(
            "Failed to create file {}: {}",
            output.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}

/// Handle export commands
pub fn handle_export_command(
    storage: &Storage,
    actor: Option<&str>,
    cmd: ExportCommands,
) -> ChorebookResult<()> {
    if let ExportCommands::Verify { input } = &cmd {
        return handle_verify(input);
    }

    let principal = require_actor(storage, actor)?;

    match cmd {
        ExportCommands::Csv { output, payments } => {
            let mut writer = create_writer(&output)?;
            let (count, kind) = if payments {
                (
                    export::export_payments_csv(storage, &principal, &mut writer)?,
                    "payments",
                )
            } else {
                (
                    export::export_expenses_csv(storage, &principal, &mut writer)?,
                    "expenses",
                )
            };
            writer.flush()?;
            println!("Exported {} {} to: {}", count, kind, output.display());
        }

        ExportCommands::Json { output, compact } => {
            let mut writer = create_writer(&output)?;
            export::export_household_json(storage, &principal, &mut writer, !compact)?;
            writer.flush()?;
            println!("Household exported to: {}", output.display());
        }

        ExportCommands::Info => {
            let snapshot = HouseholdExport::from_storage(storage, &principal)?;
            print_summary(&snapshot);
        }

        ExportCommands::Verify { input } => handle_verify(&input)?,
    }

    Ok(())
}

fn handle_verify(input: &Path) -> ChorebookResult<()> {
    let contents = fs::read_to_string(input).map_err(|e| {
        ChorebookError::Export(format!("Failed to read {}: {}", input.display(), e))
    })?;
    let snapshot = export::import_from_json(&contents)?;
    println!("Snapshot is valid.");
    print_summary(&snapshot);
    Ok(())
}

fn print_summary(snapshot: &HouseholdExport) {
    let payments: usize = snapshot.expenses.iter().map(|e| e.payments.len()).sum();

    println!("Household:      {}", snapshot.household.name);
    println!("Schema Version: {}", snapshot.schema_version);
    println!("App Version:    {}", snapshot.app_version);
    println!();
    println!("  Members:      {}", snapshot.members.len());
    println!("  Chores:       {}", snapshot.chores.len());
    println!("  Missed tasks: {}", snapshot.missed_tasks.len());
    println!("  Expenses:     {}", snapshot.expenses.len());
    println!("  Alerts:       {}", snapshot.alerts.len());
    println!("  Payments:     {}", payments);
}
