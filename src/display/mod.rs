//! Display formatting for terminal output
//!
//! List views are rendered as `tabled` tables; detail views are plain
//! aligned text.

pub mod alert;
pub mod chore;
pub mod expense;
pub mod member;
pub mod report;

use std::collections::HashMap;

use crate::models::MemberId;

pub use alert::{format_alert_details, format_alert_list};
pub use chore::{format_chore_details, format_chore_list, format_missed_tasks};
pub use expense::{format_expense_breakdown, format_expense_list};
pub use member::{format_balances, format_member_list};

/// Member display names keyed by id
pub type MemberNames = HashMap<MemberId, String>;

/// Name for a member id, falling back to the short id
pub fn member_name(names: &MemberNames, id: MemberId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.short())
}
