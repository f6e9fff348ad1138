//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the
//! clap argument parsing with the service layer. Commands that act on a
//! household need an acting member, given with `--as` or `CHOREBOOK_MEMBER`.

pub mod alert;
pub mod chore;
pub mod expense;
pub mod export;
pub mod household;
pub mod report;

pub use alert::{handle_alert_command, AlertCommands};
pub use chore::{handle_chore_command, ChoreCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use household::{handle_household_command, HouseholdCommands};
pub use report::{handle_report_command, ReportCommands};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{Member, Money, Principal};
use crate::services::HouseholdService;
use crate::storage::Storage;

/// Resolve the acting member given on the command line
pub fn require_actor(storage: &Storage, actor: Option<&str>) -> ChorebookResult<Principal> {
    let identifier = actor.ok_or_else(|| {
        ChorebookError::Validation(
            "This command needs an acting member. Pass --as <name|email|id> or set CHOREBOOK_MEMBER"
                .into(),
        )
    })?;
    HouseholdService::new(storage).principal_for(identifier)
}

/// Resolve a household member argument
pub fn find_member(storage: &Storage, actor: &Principal, identifier: &str) -> ChorebookResult<Member> {
    HouseholdService::new(storage).find_household_member(actor, identifier)
}

/// Parse a money amount such as "12.50" or "12"
pub fn parse_money(s: &str) -> ChorebookResult<Money> {
    Money::parse(s).map_err(|e| {
        ChorebookError::Validation(format!(
            "Invalid amount: '{}'. Use a format like '12.50'. Error: {}",
            s, e
        ))
    })
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(s: &str) -> ChorebookResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        ChorebookError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", s))
    })
}

/// Parse a due date: RFC 3339, "YYYY-MM-DD HH:MM", or a bare date (midnight UTC)
pub fn parse_due(s: &str) -> ChorebookResult<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(dt.and_utc());
    }
    parse_date(s).map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_due() {
        assert_eq!(
            parse_due("2024-01-08").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_due("2024-01-08 18:30").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 8, 18, 30, 0).unwrap()
        );
        assert_eq!(
            parse_due("2024-01-08T10:00:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 8, 8, 0, 0).unwrap()
        );
        assert!(parse_due("next tuesday").unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("12.50").unwrap(), Money::from_cents(1250));
        assert!(parse_money("12.505").unwrap_err().is_validation());
    }
}
