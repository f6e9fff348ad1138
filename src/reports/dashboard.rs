//! Household dashboard
//!
//! Summary figures for one member's view of their household: chore
//! completion, expense settlement, spend, overdue work and the top
//! performer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::directory;
use crate::display::report::{format_bar, format_percentage};
use crate::error::ChorebookResult;
use crate::ledger;
use crate::models::{Chore, MemberId, Money, Principal};
use crate::services::HouseholdService;
use crate::storage::Storage;

use super::rate;

/// Chore statistics for one member
#[derive(Debug, Clone, PartialEq)]
pub struct MemberChoreStats {
    pub member_id: MemberId,
    pub name: String,
    pub assigned: usize,
    pub completed: usize,
    pub open: usize,
    pub overdue: usize,
    pub completion_rate: f64,
}

/// Dashboard report
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub household_name: String,
    pub total_chores: usize,
    pub completed_chores: usize,
    pub completion_rate: f64,
    pub total_expenses: usize,
    pub settled_expenses: usize,
    pub settlement_rate: f64,
    pub total_spend: Money,
    /// Open chores past due, oldest first
    pub overdue_chores: Vec<Chore>,
    /// Open chores assigned to the viewing member
    pub my_open_chores: usize,
    /// What the viewing member still owes across unsettled expenses
    pub amount_i_owe: Money,
    pub members: Vec<MemberChoreStats>,
    /// Most chores completed, ties broken by completion rate
    pub top_performer: Option<MemberChoreStats>,
}

impl DashboardReport {
    /// Generate the dashboard for the actor's household
    pub fn generate(
        storage: &Storage,
        actor: &Principal,
        now: DateTime<Utc>,
    ) -> ChorebookResult<Self> {
        let households = HouseholdService::new(storage);
        let household = households.household(actor)?;
        let household_id = directory::resolve_household_id(actor)?;

        let chores = storage.chores.by_household(household_id)?;
        let expenses = storage.expenses.by_household(household_id)?;

        let completed_chores = chores.iter().filter(|c| c.completed).count();
        let settled_expenses = expenses.iter().filter(|e| e.is_settled()).count();
        let total_spend: Money = expenses.iter().map(|e| e.amount).sum();

        let mut overdue_chores: Vec<Chore> =
            chores.iter().filter(|c| c.is_overdue(now)).cloned().collect();
        overdue_chores.sort_by_key(|c| c.due_date);

        let mut amount_i_owe = Money::zero();
        for expense in expenses.iter().filter(|e| !e.is_settled()) {
            amount_i_owe += ledger::amount_owed(expense, actor.member_id)?;
        }

        let mut by_member: HashMap<MemberId, Vec<&Chore>> = HashMap::new();
        for chore in &chores {
            by_member.entry(chore.assigned_to).or_default().push(chore);
        }

        let members: Vec<MemberChoreStats> = households
            .members(actor)?
            .into_iter()
            .map(|member| {
                let assigned = by_member.get(&member.id).map(Vec::as_slice).unwrap_or(&[]);
                let completed = assigned.iter().filter(|c| c.completed).count();
                MemberChoreStats {
                    member_id: member.id,
                    name: member.name,
                    assigned: assigned.len(),
                    completed,
                    open: assigned.len() - completed,
                    overdue: assigned.iter().filter(|c| c.is_overdue(now)).count(),
                    completion_rate: rate(completed, assigned.len()),
                }
            })
            .collect();

        let top_performer = members
            .iter()
            .filter(|m| m.completed > 0)
            .max_by(|a, b| {
                a.completed.cmp(&b.completed).then_with(|| {
                    a.completion_rate
                        .partial_cmp(&b.completion_rate)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
            })
            .cloned();

        let my_open_chores = members
            .iter()
            .find(|m| m.member_id == actor.member_id)
            .map_or(0, |m| m.open);

        Ok(Self {
            generated_at: now,
            household_name: household.name,
            total_chores: chores.len(),
            completed_chores,
            completion_rate: rate(completed_chores, chores.len()),
            total_expenses: expenses.len(),
            settled_expenses,
            settlement_rate: rate(settled_expenses, expenses.len()),
            total_spend,
            overdue_chores,
            my_open_chores,
            amount_i_owe,
            members,
            top_performer,
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", self.household_name));
        output.push_str(&format!("{}\n\n", "=".repeat(self.household_name.len().max(9))));

        output.push_str(&format!(
            "Chores:    {} {}/{} completed ({})\n",
            format_bar(self.completion_rate, 20),
            self.completed_chores,
            self.total_chores,
            format_percentage(self.completion_rate)
        ));
        output.push_str(&format!(
            "Expenses:  {} {}/{} settled ({})\n",
            format_bar(self.settlement_rate, 20),
            self.settled_expenses,
            self.total_expenses,
            format_percentage(self.settlement_rate)
        ));
        output.push_str(&format!(
            "Spend:     {}\n",
            self.total_spend.format_with_symbol(symbol)
        ));
        output.push_str(&format!(
            "You owe:   {}\n",
            self.amount_i_owe.format_with_symbol(symbol)
        ));
        output.push_str(&format!("Your open chores: {}\n", self.my_open_chores));

        if let Some(top) = &self.top_performer {
            output.push_str(&format!(
                "Top performer: {} ({} completed, {})\n",
                top.name,
                top.completed,
                format_percentage(top.completion_rate)
            ));
        }

        if !self.overdue_chores.is_empty() {
            output.push_str(&format!("\nOverdue ({}):\n", self.overdue_chores.len()));
            for chore in &self.overdue_chores {
                output.push_str(&format!(
                    "  {}  {}  [{}]\n",
                    chore.due_date.format("%Y-%m-%d"),
                    chore.title,
                    chore.priority
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::ChorebookPaths;
    use crate::models::Priority;
    use crate::services::{ChoreService, CreateChoreInput, CreateExpenseInput, ExpenseService};
    use chrono::{NaiveDate, TimeZone};
    use tempfile::TempDir;

    #[test]
    fn test_generate_dashboard() {
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

        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let chores = ChoreService::new(&storage);
        for (title, assignee, day) in [
            ("Dishes", ana.member_id, 1),
            ("Laundry", ana.member_id, 20),
            ("Bins", ben.member_id, 2),
        ] {
            chores
                .create(
                    &ana,
                    CreateChoreInput {
                        title: title.into(),
                        description: None,
                        assigned_to: assignee,
                        due_date: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
                        priority: Priority::Medium,
                        category: "general".into(),
                        recurrence: None,
                    },
                )
                .unwrap();
        }
        let dishes = chores.find(&ana, "Dishes").unwrap();
        chores.toggle_complete(&ana, dishes.id, now).unwrap();

        let expenses = ExpenseService::new(&storage);
        expenses
            .create(
                &ana,
                CreateExpenseInput {
                    title: "Groceries".into(),
                    description: None,
                    category: None,
                    amount: Money::from_units(50),
                    paid_by: None,
                    split_between: vec![ana.member_id, ben.member_id],
                    date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                },
            )
            .unwrap();

        let report = DashboardReport::generate(&storage, &ben, now).unwrap();
        assert_eq!(report.household_name, "Flat");
        assert_eq!(report.total_chores, 3);
        assert_eq!(report.completed_chores, 1);
        assert_eq!(report.overdue_chores.len(), 1);
        assert_eq!(report.overdue_chores[0].title, "Bins");
        assert_eq!(report.my_open_chores, 1);
        assert_eq!(report.amount_i_owe, Money::from_units(25));
        assert_eq!(report.total_spend, Money::from_units(50));
        assert_eq!(report.settlement_rate, 0.0);

        let top = report.top_performer.as_ref().unwrap();
        assert_eq!(top.member_id, ana.member_id);
        assert_eq!(top.completion_rate, 50.0);

        let text = report.format_terminal("$");
        assert!(text.contains("Top performer: Ana"));
        assert!(text.contains("Bins"));
    }
}
