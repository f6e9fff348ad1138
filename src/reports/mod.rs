//! Reports module for Chorebook
//!
//! Household dashboard statistics and per-member balances.

pub mod balances;
pub mod dashboard;

pub use balances::{BalanceReport, MemberBalance};
pub use dashboard::{DashboardReport, MemberChoreStats};

/// Percentage of `part` in `whole`, zero when `whole` is zero
pub(crate) fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
