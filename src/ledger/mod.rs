//! Ledger engine
//!
//! Pure functions over an [`Expense`](crate::models::Expense): equal shares,
//! what each participant still owes the payer, and settlement state.
//!
//! Settlement has two inputs that never overwrite each other:
//!
//! - `payment_settled` is latched by [`record_payment`] once the recorded
//!   payments cover everything owed to the payer.
//! - `manual_override` is set by [`toggle_settled`] and takes precedence
//!   until [`clear_override`] hands control back to the payments.

mod settlement;
mod shares;

pub use settlement::{
    clear_override, record_payment, resplit, revalue, settlement_status, toggle_settled,
    Revaluation, SettlementStatus,
};
pub use shares::{amount_owed, compute_share, share_of, shares, total_owed};
