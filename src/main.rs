use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use chorebook::cli::{
    handle_alert_command, handle_chore_command, handle_expense_command, handle_export_command,
    handle_household_command, handle_report_command,
};
use chorebook::config::{paths::ChorebookPaths, settings::Settings};
use chorebook::services::ChoreService;
use chorebook::storage::Storage;

/// Environment variable holding the tracing filter
const LOG_ENV: &str = "CHOREBOOK_LOG";

#[derive(Parser)]
#[command(
    name = "chorebook",
    version,
    about = "Household chores and shared expenses from the terminal",
    long_about = "Chorebook keeps a household's chore rota and shared expense ledger. \
                  Chores can repeat and are flagged when missed; expenses are split \
                  equally and settle once every participant has paid their share."
)]
struct Cli {
    /// Act as this member (name, email or ID)
    #[arg(long = "as", global = true, env = "CHOREBOOK_MEMBER")]
    actor: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Household and membership commands
    #[command(subcommand, alias = "hh")]
    Household(chorebook::cli::HouseholdCommands),

    /// Chore commands
    #[command(subcommand)]
    Chore(chorebook::cli::ChoreCommands),

    /// Shared expense commands
    #[command(subcommand, alias = "exp")]
    Expense(chorebook::cli::ExpenseCommands),

    /// Household issue alerts
    #[command(subcommand)]
    Alert(chorebook::cli::AlertCommands),

    /// Reports
    #[command(subcommand)]
    Report(chorebook::cli::ReportCommands),

    /// Export household data
    #[command(subcommand)]
    Export(chorebook::cli::ExportCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Show current configuration and paths
    Config,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let paths = ChorebookPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let storage = Storage::with_audit(paths.clone(), settings.audit_enabled)?;
    storage.load_all()?;

    if settings.sweep_on_load && storage.is_initialized() {
        let outcome = ChoreService::new(&storage).run_sweeps(Utc::now())?;
        if !outcome.is_empty() {
            debug!(
                missed = outcome.missed.len(),
                materialized = outcome.materialized.len(),
                "sweeps ran on load"
            );
        }
    }

    let actor = cli.actor.as_deref();

    match cli.command {
        Some(Commands::Household(cmd)) => {
            if !paths.settings_file().exists() {
                settings.save(&paths)?;
            }
            handle_household_command(&storage, actor, cmd)?;
        }
        Some(Commands::Chore(cmd)) => {
            handle_chore_command(&storage, &settings, actor, cmd)?;
        }
        Some(Commands::Expense(cmd)) => {
            handle_expense_command(&storage, &settings, actor, cmd)?;
        }
        Some(Commands::Alert(cmd)) => {
            handle_alert_command(&storage, actor, cmd)?;
        }
        Some(Commands::Report(cmd)) => {
            handle_report_command(&storage, &settings, actor, cmd)?;
        }
        Some(Commands::Export(cmd)) => {
            handle_export_command(&storage, actor, cmd)?;
        }
        Some(Commands::Audit { limit }) => match storage.audit() {
            Some(logger) => {
                let entries = logger.read_recent(limit)?;
                if entries.is_empty() {
                    println!("No audit entries yet.");
                }
                for entry in entries {
                    println!("{}", entry.format_human_readable());
                }
            }
            None => {
                warn!("audit log requested while auditing is disabled");
                println!("Audit logging is disabled in settings.");
            }
        },
        Some(Commands::Config) => {
            println!("Chorebook Configuration");
            println!("=======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:        {}", settings.currency_symbol);
            println!("  Date format:            {}", settings.date_format);
            println!("  Audit enabled:          {}", settings.audit_enabled);
            println!("  Sweep on load:          {}", settings.sweep_on_load);
            println!("  Default chore category: {}", settings.default_chore_category);
        }
        None => {
            println!("Chorebook - household chores and shared expenses");
            println!();
            println!("Run 'chorebook --help' for usage information.");
            println!("Run 'chorebook household register <NAME> <EMAIL> -H <HOUSEHOLD>' to get started.");
        }
    }

    Ok(())
}
