//! Expense service
//!
//! Expense CRUD plus the payment and settlement operations. Each mutation
//! is a single `Collection::modify` call, so two payments against the same
//! expense are applied one after the other, even from separate processes,
//! and the overpayment check always sees every earlier payment.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::audit::EntityType;
use crate::directory;
use crate::error::{ChorebookError, ChorebookResult};
use crate::ledger::{self, SettlementStatus};
use crate::models::{Expense, ExpenseId, MemberId, Money, Payment, Principal};
use crate::storage::Storage;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

/// Expense settlement filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseStatus {
    Settled,
    /// Not yet settled
    Pending,
}

impl ExpenseStatus {
    /// Parse a status name; `all` means no status filter
    pub fn parse(s: &str) -> Option<Option<Self>> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(None),
            "settled" => Some(Some(Self::Settled)),
            "pending" | "unsettled" => Some(Some(Self::Pending)),
            _ => None,
        }
    }
}

/// Options for filtering expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub status: Option<ExpenseStatus>,
    /// Exact category, ignoring case
    pub category: Option<String>,
    /// Case-insensitive match on title or description
    pub search: Option<String>,
}

impl ExpenseFilter {
    fn matches(&self, expense: &Expense) -> bool {
        let status_ok = match self.status {
            None => true,
            Some(ExpenseStatus::Settled) => expense.is_settled(),
            Some(ExpenseStatus::Pending) => !expense.is_settled(),
        };

        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |category| expense.category.eq_ignore_ascii_case(category.trim()));

        let search_ok = self.search.as_deref().map_or(true, |term| {
            let term = term.to_lowercase();
            expense.title.to_lowercase().contains(&term)
                || expense.description.to_lowercase().contains(&term)
        });

        status_ok && category_ok && search_ok
    }
}

/// Input for creating an expense
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Money,
    /// Defaults to the acting member
    pub paid_by: Option<MemberId>,
    /// Defaults to just the payer when empty
    pub split_between: Vec<MemberId>,
    pub date: NaiveDate,
}

/// Changes to an existing expense; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct EditExpenseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<Money>,
    pub split_between: Option<Vec<MemberId>>,
}

/// One participant's position on an expense
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLine {
    pub member_id: MemberId,
    pub share: Money,
    pub paid: Money,
    pub owed: Money,
}

/// An expense with its derived ledger figures
#[derive(Debug, Clone)]
pub struct ExpenseBreakdown {
    pub expense: Expense,
    pub status: SettlementStatus,
    pub nominal_share: Money,
    pub lines: Vec<ShareLine>,
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn require_participants(
        &self,
        actor: &Principal,
        members: impl IntoIterator<Item = MemberId>,
    ) -> ChorebookResult<()> {
        let household_id = directory::resolve_household_id(actor)?;
        for member_id in members {
            let member = self
                .storage
                .members
                .get(member_id)?
                .ok_or_else(|| ChorebookError::member_not_found(member_id.to_string()))?;
            if !directory::is_active_member(&member, household_id) {
                return Err(ChorebookError::Validation(format!(
                    "{} is not an approved member of this household",
                    member.name
                )));
            }
        }
        Ok(())
    }

    /// Create an expense in the actor's household
    pub fn create(&self, actor: &Principal, input: CreateExpenseInput) -> ChorebookResult<Expense> {
        let household_id = directory::resolve_household_id(actor)?;
        let paid_by = input.paid_by.unwrap_or(actor.member_id);

        let mut split_between: BTreeSet<MemberId> = input.split_between.into_iter().collect();
        if split_between.is_empty() {
            split_between.insert(paid_by);
        }
        self.require_participants(actor, std::iter::once(paid_by).chain(split_between.iter().copied()))?;

        let mut expense = Expense::new(
            household_id,
            input.title.trim(),
            input.amount,
            paid_by,
            split_between,
            input.date,
        );
        expense.description = input.description.unwrap_or_default().trim().to_string();
        expense.category = input.category.unwrap_or_default().trim().to_string();

        expense
            .validate()
            .map_err(|e| ChorebookError::Validation(e.to_string()))?;

        self.storage.expenses.insert(expense.clone())?;

        self.storage.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.title.clone()),
            &expense,
        )?;

        info!(expense = %expense.id, amount = %expense.amount, "expense created");
        Ok(expense)
    }

    /// Get an expense from the actor's household
    pub fn get(&self, actor: &Principal, id: ExpenseId) -> ChorebookResult<Expense> {
        let expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| ChorebookError::expense_not_found(id.to_string()))?;
        directory::require_same_household(actor, expense.household_id)?;
        Ok(expense)
    }

    /// Find an expense by id, short id or title, preferring unsettled ones
    pub fn find(&self, actor: &Principal, identifier: &str) -> ChorebookResult<Expense> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            return self.get(actor, id);
        }

        let household_id = directory::resolve_household_id(actor)?;
        let mut matches = self.storage.expenses.find(|e| {
            e.household_id == household_id
                && (e.id.matches_prefix(identifier) || e.title.eq_ignore_ascii_case(identifier))
        })?;
        matches.sort_by(|a, b| {
            a.is_settled()
                .cmp(&b.is_settled())
                .then_with(|| b.date.cmp(&a.date))
        });
        matches
            .into_iter()
            .next()
            .ok_or_else(|| ChorebookError::expense_not_found(identifier))
    }

    /// List expenses in the actor's household, newest first
    pub fn list(&self, actor: &Principal, filter: &ExpenseFilter) -> ChorebookResult<Vec<Expense>> {
        let household_id = directory::resolve_household_id(actor)?;
        let mut expenses = self
            .storage
            .expenses
            .find(|e| e.household_id == household_id && filter.matches(e))?;
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        Ok(expenses)
    }

    /// Shares, payments and owed amounts for one expense
    pub fn breakdown(&self, actor: &Principal, id: ExpenseId) -> ChorebookResult<ExpenseBreakdown> {
        let expense = self.get(actor, id)?;
        let shares = ledger::shares(&expense)?;

        let lines = shares
            .into_iter()
            .map(|(member_id, share)| {
                Ok(ShareLine {
                    member_id,
                    share,
                    paid: expense.paid_by_member(member_id),
                    owed: ledger::amount_owed(&expense, member_id)?,
                })
            })
            .collect::<ChorebookResult<Vec<_>>>()?;

        Ok(ExpenseBreakdown {
            status: ledger::settlement_status(&expense)?,
            nominal_share: ledger::compute_share(&expense)?,
            lines,
            expense,
        })
    }

    /// Edit an expense; admin or payer
    ///
    /// Changing the amount or the split revalues every share. Payments
    /// already recorded stay as they are.
    pub fn edit(
        &self,
        actor: &Principal,
        id: ExpenseId,
        input: EditExpenseInput,
    ) -> ChorebookResult<Expense> {
        let before = self.get(actor, id)?;
        directory::require_expense_edit(actor, &before)?;

        let split_between = match input.split_between {
            Some(members) if members.is_empty() => {
                return Err(ChorebookError::Validation(
                    "An expense must be split between at least one member".into(),
                ))
            }
            Some(members) => {
                let members: BTreeSet<MemberId> = members.into_iter().collect();
                self.require_participants(actor, members.iter().copied())?;
                Some(members)
            }
            None => None,
        };

        let now = Utc::now();
        let after = self.storage.expenses.modify(id, |expense| {
            if let Some(title) = &input.title {
                expense.title = title.trim().to_string();
            }
            if let Some(description) = &input.description {
                expense.description = description.trim().to_string();
            }
            if let Some(category) = &input.category {
                expense.category = category.trim().to_string();
            }
            if let Some(date) = input.date {
                expense.date = date;
            }
            if let Some(amount) = input.amount {
                if amount != expense.amount {
                    ledger::revalue(expense, amount, now)?;
                }
            }
            if let Some(split_between) = split_between {
                if split_between != expense.split_between {
                    ledger::resplit(expense, split_between, now)?;
                }
            }

            expense
                .validate()
                .map_err(|e| ChorebookError::Validation(e.to_string()))?;
            expense.updated_at = now;
            Ok(expense.clone())
        })?;

        let diff_summary = (before.amount != after.amount).then(|| {
            format!("amount: {} -> {} (shares revalued)", before.amount, after.amount)
        });
        if diff_summary.is_some() && !after.payments.is_empty() {
            warn!(
                expense = %after.id,
                from = %before.amount,
                to = %after.amount,
                "amount edited after payments were recorded"
            );
        }
        if before.is_settled() != after.is_settled() {
            info!(expense = %after.id, settled = after.is_settled(), "settlement changed by edit");
        }

        self.storage.log_update(
            EntityType::Expense,
            after.id.to_string(),
            Some(after.title.clone()),
            &before,
            &after,
            diff_summary,
        )?;

        Ok(after)
    }

    /// Record a payment from the acting member toward their share
    pub fn record_payment(
        &self,
        actor: &Principal,
        id: ExpenseId,
        amount: Money,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> ChorebookResult<Payment> {
        let (payment, expense) = self.storage.expenses.modify(id, |expense| {
            directory::require_same_household(actor, expense.household_id)?;
            let payment = ledger::record_payment(expense, actor.member_id, amount, note, now)?;
            Ok((payment, expense.clone()))
        })?;

        self.storage.log_create(
            EntityType::Payment,
            payment.id.to_string(),
            Some(format!("{} toward {}", payment.amount, expense.title)),
            &payment,
        )?;

        info!(
            expense = %expense.id,
            payment = %payment.id,
            amount = %payment.amount,
            settled = expense.is_settled(),
            "payment recorded"
        );
        Ok(payment)
    }

    /// Flip the settlement state by hand
    pub fn toggle_settled(
        &self,
        actor: &Principal,
        id: ExpenseId,
        now: DateTime<Utc>,
    ) -> ChorebookResult<Expense> {
        let before = self.get(actor, id)?;
        let after = self.storage.expenses.modify(id, |expense| {
            ledger::toggle_settled(expense, actor, now)?;
            Ok(expense.clone())
        })?;

        self.storage.log_update(
            EntityType::Expense,
            after.id.to_string(),
            Some(after.title.clone()),
            &before,
            &after,
            Some(format!(
                "settled: {} -> {} (manual)",
                before.is_settled(),
                after.is_settled()
            )),
        )?;

        Ok(after)
    }

    /// Remove a manual settlement decision
    pub fn clear_override(
        &self,
        actor: &Principal,
        id: ExpenseId,
        now: DateTime<Utc>,
    ) -> ChorebookResult<Expense> {
        let before = self.get(actor, id)?;
        directory::require_settle(actor, &before)?;

        let (changed, after) = self.storage.expenses.modify(id, |expense| {
            let changed = ledger::clear_override(expense, now);
            Ok((changed, expense.clone()))
        })?;
        if !changed {
            return Ok(after);
        }

        self.storage.log_update(
            EntityType::Expense,
            after.id.to_string(),
            Some(after.title.clone()),
            &before,
            &after,
            Some("manual_override cleared".into()),
        )?;

        Ok(after)
    }

    /// Delete an expense together with its payments; admin or payer
    pub fn delete(&self, actor: &Principal, id: ExpenseId) -> ChorebookResult<Expense> {
        let expense = self.get(actor, id)?;
        directory::require_expense_edit(actor, &expense)?;

        self.storage.expenses.delete(id)?;

        self.storage.log_delete(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.title.clone()),
            &expense,
        )?;

        info!(expense = %expense.id, payments = expense.payments.len(), "expense deleted");
        Ok(expense)
    }
}
