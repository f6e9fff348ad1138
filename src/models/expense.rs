//! Shared expense and payment models
//!
//! An expense is paid up front by one member and split equally between its
//! participants. Participants pay the payer back through payments, which
//! are stored inline on the expense in the order they were recorded.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::ids::{ExpenseId, HouseholdId, MemberId, PaymentId};
use super::money::Money;

/// A payment from a participant toward an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Payment {
    pub id: PaymentId,

    pub expense_id: ExpenseId,

    pub household_id: HouseholdId,

    /// The member paying back their share
    pub paid_by: MemberId,

    pub amount: Money,

    pub date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Payment {
    /// Create a payment toward `expense`
    pub fn new(
        expense: &Expense,
        paid_by: MemberId,
        amount: Money,
        date: DateTime<Utc>,
        note: Option<String>,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            expense_id: expense.id,
            household_id: expense.household_id,
            paid_by,
            amount,
            date,
            note: note.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// A household expense split between members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expense {
    pub id: ExpenseId,

    pub household_id: HouseholdId,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: String,

    /// Date the expense was incurred
    pub date: NaiveDate,

    /// Total amount paid by `paid_by`
    pub amount: Money,

    /// The member who covered the expense
    pub paid_by: MemberId,

    /// Members sharing the cost (never empty)
    pub split_between: BTreeSet<MemberId>,

    /// Payments in the order they were recorded
    #[serde(default)]
    pub payments: Vec<Payment>,

    /// Latched once recorded payments cover everything owed to the payer
    #[serde(default)]
    pub payment_settled: bool,

    /// Explicit settlement decision by a member; wins over the payment latch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_override: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_by: Option<MemberId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new unsettled expense
    pub fn new(
        household_id: HouseholdId,
        title: impl Into<String>,
        amount: Money,
        paid_by: MemberId,
        split_between: impl IntoIterator<Item = MemberId>,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            household_id,
            title: title.into(),
            description: String::new(),
            category: String::new(),
            date,
            amount,
            paid_by,
            split_between: split_between.into_iter().collect(),
            payments: Vec::new(),
            payment_settled: false,
            manual_override: None,
            settled_at: None,
            settled_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Effective settlement state
    pub fn is_settled(&self) -> bool {
        self.manual_override.unwrap_or(self.payment_settled)
    }

    /// Check whether the member takes part in this expense
    pub fn is_participant(&self, member_id: MemberId) -> bool {
        self.split_between.contains(&member_id)
    }

    /// Check whether the member is involved as payer or participant
    pub fn involves(&self, member_id: MemberId) -> bool {
        self.paid_by == member_id || self.is_participant(member_id)
    }

    /// Sum of every recorded payment
    pub fn total_paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Sum of payments made by one member
    pub fn paid_by_member(&self, member_id: MemberId) -> Money {
        self.payments
            .iter()
            .filter(|p| p.paid_by == member_id)
            .map(|p| p.amount)
            .sum()
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.title.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyTitle);
        }

        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }

        if self.split_between.is_empty() {
            return Err(ExpenseValidationError::EmptySplit);
        }

        if let Some(payment) = self.payments.iter().find(|p| !p.amount.is_positive()) {
            return Err(ExpenseValidationError::NonPositivePayment(payment.amount));
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.amount)
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    EmptyTitle,
    NonPositiveAmount(Money),
    EmptySplit,
    NonPositivePayment(Money),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Expense title cannot be empty"),
            Self::NonPositiveAmount(amount) => {
                write!(f, "Expense amount must be positive, got {}", amount)
            }
            Self::EmptySplit => write!(f, "An expense must be split between at least one member"),
            Self::NonPositivePayment(amount) => {
                write!(f, "Payment amount must be positive, got {}", amount)
            }
        }
    }
}

impl std::error::Error for ExpenseValidationError {}
