//! CSV export of the expense ledger

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::directory;
use crate::error::ChorebookResult;
use crate::ledger;
use crate::models::{MemberId, Principal};
use crate::services::HouseholdService;
use crate::storage::Storage;

#[derive(Debug, Serialize)]
struct ExpenseRow<'a> {
    id: String,
    date: String,
    title: &'a str,
    category: &'a str,
    amount: String,
    paid_by: String,
    split_between: String,
    share: String,
    total_paid: String,
    total_owed: String,
    settled: bool,
    manual_override: Option<bool>,
}

#[derive(Debug, Serialize)]
struct PaymentRow<'a> {
    id: String,
    expense_id: String,
    expense_title: &'a str,
    date: String,
    paid_by: String,
    amount: String,
    note: &'a str,
}

fn name_of(names: &HashMap<MemberId, String>, id: MemberId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

/// Write one row per expense in the actor's household
pub fn export_expenses_csv<W: Write>(
    storage: &Storage,
    actor: &Principal,
    writer: W,
) -> ChorebookResult<usize> {
    let household_id = directory::resolve_household_id(actor)?;
    let names = HouseholdService::new(storage).member_names(household_id)?;
    let mut expenses = storage.expenses.by_household(household_id)?;
    expenses.sort_by_key(|e| (e.date, e.created_at));

    let mut csv_writer = ::csv::Writer::from_writer(writer);
    for expense in &expenses {
        let status = ledger::settlement_status(expense)?;
        let split_between = expense
            .split_between
            .iter()
            .map(|id| name_of(&names, *id))
            .collect::<Vec<_>>()
            .join("; ");

        csv_writer.serialize(ExpenseRow {
            id: expense.id.to_string(),
            date: expense.date.to_string(),
            title: &expense.title,
            category: &expense.category,
            amount: expense.amount.to_decimal_string(),
            paid_by: name_of(&names, expense.paid_by),
            split_between,
            share: ledger::compute_share(expense)?.to_decimal_string(),
            total_paid: status.total_paid.to_decimal_string(),
            total_owed: status.total_owed.to_decimal_string(),
            settled: status.settled,
            manual_override: expense.manual_override,
        })?;
    }
    csv_writer.flush()?;

    Ok(expenses.len())
}

/// Write one row per payment in the actor's household
pub fn export_payments_csv<W: Write>(
    storage: &Storage,
    actor: &Principal,
    writer: W,
) -> ChorebookResult<usize> {
    let household_id = directory::resolve_household_id(actor)?;
    let names = HouseholdService::new(storage).member_names(household_id)?;
    let mut expenses = storage.expenses.by_household(household_id)?;
    expenses.sort_by_key(|e| (e.date, e.created_at));

    let mut csv_writer = ::csv::Writer::from_writer(writer);
    let mut count = 0;
    for expense in &expenses {
        for payment in &expense.payments {
            csv_writer.serialize(PaymentRow {
                id: payment.id.to_string(),
                expense_id: expense.id.to_string(),
                expense_title: &expense.title,
                date: payment.date.format("%Y-%m-%d %H:%M:%S").to_string(),
                paid_by: name_of(&names, payment.paid_by),
                amount: payment.amount.to_decimal_string(),
                note: payment.note.as_deref().unwrap_or(""),
            })?;
            count += 1;
        }
    }
    csv_writer.flush()?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::ChorebookPaths;
    use crate::models::Money;
    use crate::services::{CreateExpenseInput, ExpenseService};
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_export_expenses_and_payments() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ChorebookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let households = HouseholdService::new(&storage);
        let (admin, household) = households.register("Ana", "ana@example.com", "Flat").unwrap();
        let ben = households
            .request_join("Ben", "ben@example.com", &household.invitation_code)
            .unwrap();
        let ben = households
            .approve_member(&admin.principal(), ben.id)
            .unwrap()
            .principal();
        let ana = admin.principal();

        let expenses = ExpenseService::new(&storage);
        let expense = expenses
            .create(
                &ana,
                CreateExpenseInput {
                    title: "Pizza, large".into(),
                    description: None,
                    category: Some("food".into()),
                    amount: Money::from_cents(2550),
                    paid_by: None,
                    split_between: vec![ana.member_id, ben.member_id],
                    date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                },
            )
            .unwrap();
        expenses
            .record_payment(&ben, expense.id, Money::from_cents(500), Some("cash".into()), Utc::now())
            .unwrap();

        let mut out = Vec::new();
        assert_eq!(export_expenses_csv(&storage, &ana, &mut out).unwrap(), 1);
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("id,date,title,category,amount"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Pizza, large\""));
        assert!(row.contains("25.50"));
        assert!(row.contains("Ana; Ben") || row.contains("Ben; Ana"));

        let mut out = Vec::new();
        assert_eq!(export_payments_csv(&storage, &ben, &mut out).unwrap(), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("5.00"));
        assert!(text.contains("cash"));
    }
}
