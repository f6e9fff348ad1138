//! Core data models for Chorebook
//!
//! This module contains the data structures of the household domain:
//! members, households, chores, missed tasks, expenses and payments, plus
//! the alerts members raise about the home itself.

pub mod alert;
pub mod chore;
pub mod expense;
pub mod household;
pub mod ids;
pub mod member;
pub mod money;

pub use alert::{Alert, AlertCategory, AlertPriority, AlertStatus};
pub use chore::{Chore, MissedTask, Priority, Recurrence, RecurrenceKind};
pub use expense::{Expense, Payment};
pub use household::Household;
pub use ids::{AlertId, ChoreId, ExpenseId, HouseholdId, MemberId, MissedTaskId, PaymentId, SeriesId};
pub use member::{Member, MembershipStatus, Principal};
pub use money::Money;
