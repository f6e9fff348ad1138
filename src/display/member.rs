//! Member and balance display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Member;
use crate::reports::BalanceReport;

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: &'static str,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Since")]
    since: String,
}

/// Format members as a table
pub fn format_member_list(members: &[Member]) -> String {
    if members.is_empty() {
        return "No members found.".to_string();
    }

    let rows = members.iter().map(|m| MemberRow {
        id: m.id.short(),
        name: m.name.clone(),
        email: m.email.clone(),
        role: if m.is_admin { "admin" } else { "member" },
        status: m.status.to_string(),
        since: m
            .joined_at
            .or(m.requested_at)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Member")]
    member: String,
    #[tabled(rename = "Owes")]
    owes: String,
    #[tabled(rename = "Is owed")]
    owed_to: String,
    #[tabled(rename = "Net")]
    net: String,
}

/// Format member balances as a table
pub fn format_balances(report: &BalanceReport, symbol: &str) -> String {
    if report.unsettled_expenses == 0 {
        return "All expenses are settled.".to_string();
    }

    let rows = report.balances.iter().map(|b| BalanceRow {
        member: b.name.clone(),
        owes: b.owes.format_with_symbol(symbol),
        owed_to: b.owed_to.format_with_symbol(symbol),
        net: b.net().format_with_symbol(symbol),
    });

    format!(
        "{}\n{} unsettled expense(s), {} outstanding",
        Table::new(rows).with(Style::psql()),
        report.unsettled_expenses,
        report.total_outstanding().format_with_symbol(symbol)
    )
}
