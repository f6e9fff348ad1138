//! Expense display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Expense;
use crate::services::ExpenseBreakdown;

use super::report::truncate;
use super::{member_name, MemberNames};

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Paid by")]
    paid_by: String,
    #[tabled(rename = "Split")]
    split: usize,
    #[tabled(rename = "Paid back")]
    paid_back: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn settlement_label(expense: &Expense) -> &'static str {
    match (expense.is_settled(), expense.manual_override.is_some()) {
        (true, false) => "settled",
        (true, true) => "settled (manual)",
        (false, false) => "pending",
        (false, true) => "pending (manual)",
    }
}

/// Format a list of expenses as a table
pub fn format_expense_list(expenses: &[Expense], names: &MemberNames, symbol: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.".to_string();
    }

    let rows = expenses.iter().map(|expense| ExpenseRow {
        id: expense.id.short(),
        date: expense.date.to_string(),
        title: truncate(&expense.title, 32),
        amount: expense.amount.format_with_symbol(symbol),
        paid_by: member_name(names, expense.paid_by),
        split: expense.split_between.len(),
        paid_back: expense.total_paid().format_with_symbol(symbol),
        status: settlement_label(expense).to_string(),
    });

    let total: crate::models::Money = expenses.iter().map(|e| e.amount).sum();
    format!(
        "{}\nTotal: {}",
        Table::new(rows).with(Style::psql()),
        total.format_with_symbol(symbol)
    )
}

#[derive(Tabled)]
struct ShareRow {
    #[tabled(rename = "Member")]
    member: String,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "Paid")]
    paid: String,
    #[tabled(rename = "Owes")]
    owes: String,
}

/// Format an expense with its per-member shares and payments
pub fn format_expense_breakdown(
    breakdown: &ExpenseBreakdown,
    names: &MemberNames,
    symbol: &str,
) -> String {
    let expense = &breakdown.expense;
    let mut output = String::new();

    output.push_str(&format!("Expense: {}\n", expense.title));
    output.push_str(&format!("  ID:        {}\n", expense.id));
    output.push_str(&format!("  Date:      {}\n", expense.date));
    output.push_str(&format!(
        "  Amount:    {}\n",
        expense.amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Paid by:   {}\n",
        member_name(names, expense.paid_by)
    ));
    if !expense.category.is_empty() {
        output.push_str(&format!("  Category:  {}\n", expense.category));
    }
    output.push_str(&format!(
        "  Repaid:    {} of {}\n",
        breakdown.status.total_paid.format_with_symbol(symbol),
        breakdown.status.total_owed.format_with_symbol(symbol)
    ));
    output.push_str(&format!("  Status:    {}\n", settlement_label(expense)));
    if let (Some(at), Some(by)) = (expense.settled_at, expense.settled_by) {
        output.push_str(&format!(
            "  Settled:   {} by {}\n",
            at.format("%Y-%m-%d"),
            member_name(names, by)
        ));
    }

    let rows = breakdown.lines.iter().map(|line| ShareRow {
        member: member_name(names, line.member_id),
        share: line.share.format_with_symbol(symbol),
        paid: line.paid.format_with_symbol(symbol),
        owes: line.owed.format_with_symbol(symbol),
    });
    output.push('\n');
    output.push_str(&Table::new(rows).with(Style::psql()).to_string());
    output.push('\n');

    if !expense.payments.is_empty() {
        output.push_str("\nPayments:\n");
        for payment in &expense.payments {
            output.push_str(&format!(
                "  {}  {:<12} {:>10}  {}\n",
                payment.date.format("%Y-%m-%d"),
                member_name(names, payment.paid_by),
                payment.amount.format_with_symbol(symbol),
                payment.note.as_deref().unwrap_or("")
            ));
        }
    }

    output
}
