//! Service layer for Chorebook
//!
//! The service layer applies the ledger, recurrence and directory rules on
//! top of the storage layer. Every mutating call validates, authorizes,
//! persists and writes an audit entry, in that order.

pub mod alert;
pub mod chore;
pub mod expense;
pub mod household;

pub use alert::{AlertFilter, AlertService, ReportAlertInput};
pub use chore::{ChoreFilter, ChoreService, ChoreStatus, CreateChoreInput, EditChoreInput, SweepOutcome};
pub use expense::{
    CreateExpenseInput, EditExpenseInput, ExpenseBreakdown, ExpenseFilter, ExpenseService,
    ExpenseStatus, ShareLine,
};
pub use household::HouseholdService;
