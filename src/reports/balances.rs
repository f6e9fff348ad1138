//! Member balances across unsettled expenses

use std::collections::BTreeMap;

use crate::directory;
use crate::error::ChorebookResult;
use crate::ledger;
use crate::models::{MemberId, Money, Principal};
use crate::services::HouseholdService;
use crate::storage::Storage;

/// One member's position across the household
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberBalance {
    pub member_id: MemberId,
    pub name: String,
    /// Still owed by this member to payers
    pub owes: Money,
    /// Still owed to this member by participants
    pub owed_to: Money,
}

impl MemberBalance {
    /// Positive when the member is owed more than they owe
    pub fn net(&self) -> Money {
        self.owed_to - self.owes
    }
}

/// Balances for every approved member
#[derive(Debug, Clone)]
pub struct BalanceReport {
    pub balances: Vec<MemberBalance>,
    pub unsettled_expenses: usize,
}

impl BalanceReport {
    /// Generate balances for the actor's household
    ///
    /// Settled expenses, whether by payments or by hand, count as clear.
    pub fn generate(storage: &Storage, actor: &Principal) -> ChorebookResult<Self> {
        let household_id = directory::resolve_household_id(actor)?;
        let expenses = storage
            .expenses
            .find(|e| e.household_id == household_id && !e.is_settled())?;

        let mut owes: BTreeMap<MemberId, Money> = BTreeMap::new();
        let mut owed_to: BTreeMap<MemberId, Money> = BTreeMap::new();
        for expense in &expenses {
            for &member_id in &expense.split_between {
                let owed = ledger::amount_owed(expense, member_id)?;
                if owed.is_zero() {
                    continue;
                }
                *owes.entry(member_id).or_insert_with(Money::zero) += owed;
                *owed_to.entry(expense.paid_by).or_insert_with(Money::zero) += owed;
            }
        }

        let balances = HouseholdService::new(storage)
            .members(actor)?
            .into_iter()
            .map(|member| MemberBalance {
                owes: owes.get(&member.id).copied().unwrap_or_else(Money::zero),
                owed_to: owed_to.get(&member.id).copied().unwrap_or_else(Money::zero),
                member_id: member.id,
                name: member.name,
            })
            .collect();

        Ok(Self {
            balances,
            unsettled_expenses: expenses.len(),
        })
    }

    /// Balance for one member
    pub fn for_member(&self, member_id: MemberId) -> Option<&MemberBalance> {
        self.balances.iter().find(|b| b.member_id == member_id)
    }

    /// The household-wide total still outstanding
    pub fn total_outstanding(&self) -> Money {
        self.balances.iter().map(|b| b.owes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::ChorebookPaths;
    use crate::services::{CreateExpenseInput, ExpenseService};
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_balances() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ChorebookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let households = HouseholdService::new(&storage);
        let (admin, household) = households.register("Ana", "ana@example.com", "Flat").unwrap();
        let ana = admin.principal();
        let mut others = Vec::new();
        for (name, email) in [("Ben", "ben@example.com"), ("Cy", "cy@example.com")] {
            let m = households
                .request_join(name, email, &household.invitation_code)
                .unwrap();
            others.push(households.approve_member(&ana, m.id).unwrap().principal());
        }
        let (ben, cy) = (others[0], others[1]);

        let expenses = ExpenseService::new(&storage);
        let rent = expenses
            .create(
                &ana,
                CreateExpenseInput {
                    title: "Power".into(),
                    description: None,
                    category: None,
                    amount: Money::from_units(90),
                    paid_by: None,
                    split_between: vec![ana.member_id, ben.member_id, cy.member_id],
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                },
            )
            .unwrap();
        expenses
            .record_payment(&ben, rent.id, Money::from_units(10), None, Utc::now())
            .unwrap();

        let report = BalanceReport::generate(&storage, &cy).unwrap();
        assert_eq!(report.unsettled_expenses, 1);
        assert_eq!(report.for_member(ana.member_id).unwrap().owed_to, Money::from_units(50));
        assert_eq!(report.for_member(ben.member_id).unwrap().owes, Money::from_units(20));
        assert_eq!(report.for_member(cy.member_id).unwrap().net(), Money::from_units(-30));
        assert_eq!(report.total_outstanding(), Money::from_units(50));

        expenses.toggle_settled(&ana, rent.id, Utc::now()).unwrap();
        let cleared = BalanceReport::generate(&storage, &cy).unwrap();
        assert_eq!(cleared.total_outstanding(), Money::zero());
    }
}
