//! Share and owed-amount calculations

use std::collections::BTreeMap;

use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{Expense, MemberId, Money};

fn empty_split(expense: &Expense) -> ChorebookError {
    ChorebookError::DivisionByZero(format!(
        "expense {} has no members to split between",
        expense.id
    ))
}

/// Nominal equal share: `amount / |split_between|`, rounded to the cent
pub fn compute_share(expense: &Expense) -> ChorebookResult<Money> {
    expense
        .amount
        .divide_rounded(expense.split_between.len())
        .ok_or_else(|| empty_split(expense))
}

/// Exact per-member shares that sum to the expense amount
///
/// Leftover cents go one each to participants in ascending id order, so the
/// result does not depend on the order members were added in.
pub fn shares(expense: &Expense) -> ChorebookResult<BTreeMap<MemberId, Money>> {
    let portions = expense
        .amount
        .allocate(expense.split_between.len())
        .ok_or_else(|| empty_split(expense))?;

    Ok(expense
        .split_between
        .iter()
        .copied()
        .zip(portions)
        .collect())
}

/// One member's exact share; zero for non-participants
pub fn share_of(expense: &Expense, member_id: MemberId) -> ChorebookResult<Money> {
    Ok(shares(expense)?
        .get(&member_id)
        .copied()
        .unwrap_or_else(Money::zero))
}

/// What a member still owes the payer on this expense
///
/// Zero for the payer and for members outside the split; otherwise the
/// member's share minus what they have paid, never below zero.
pub fn amount_owed(expense: &Expense, member_id: MemberId) -> ChorebookResult<Money> {
    if member_id == expense.paid_by || !expense.is_participant(member_id) {
        return Ok(Money::zero());
    }

    let share = share_of(expense, member_id)?;
    Ok(share.saturating_sub_floor(expense.paid_by_member(member_id)))
}

/// Everything owed to the payer: the amount minus the payer's own share
pub fn total_owed(expense: &Expense) -> ChorebookResult<Money> {
    Ok(expense.amount - share_of(expense, expense.paid_by)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HouseholdId, Payment};
    use chrono::{NaiveDate, Utc};

    fn expense(amount: Money, paid_by: MemberId, split: &[MemberId]) -> Expense {
        Expense::new(
            HouseholdId::for_admin(paid_by),
            "Groceries",
            amount,
            paid_by,
            split.iter().copied(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        )
    }

    fn pay(expense: &mut Expense, member: MemberId, cents: i64) {
        let payment = Payment::new(expense, member, Money::from_cents(cents), Utc::now(), None);
        expense.payments.push(payment);
    }

    #[test]
    fn test_equal_share() {
        let (a, b, c) = (MemberId::new(), MemberId::new(), MemberId::new());
        let e = expense(Money::from_units(90), a, &[a, b, c]);

        assert_eq!(compute_share(&e).unwrap(), Money::from_units(30));
        assert_eq!(amount_owed(&e, b).unwrap(), Money::from_units(30));
        assert_eq!(amount_owed(&e, a).unwrap(), Money::zero());
        assert_eq!(total_owed(&e).unwrap(), Money::from_units(60));
    }

    #[test]
    fn test_empty_split_is_division_by_zero() {
        let a = MemberId::new();
        let e = expense(Money::from_units(90), a, &[]);

        assert!(matches!(
            compute_share(&e),
            Err(ChorebookError::DivisionByZero(_))
        ));
        assert!(matches!(shares(&e), Err(ChorebookError::DivisionByZero(_))));
    }

    #[test]
    fn test_shares_sum_to_amount_exactly() {
        let members: Vec<MemberId> = (0..7).map(|_| MemberId::new()).collect();
        for cents in [1, 99, 100, 1001, 123_457] {
            let e = expense(Money::from_cents(cents), members[0], &members);
            let total: Money = shares(&e).unwrap().values().sum();
            assert_eq!(total, Money::from_cents(cents));
        }
    }

    #[test]
    fn test_shares_independent_of_order() {
        let (a, b, c) = (MemberId::new(), MemberId::new(), MemberId::new());
        let forward = expense(Money::from_cents(10000), a, &[a, b, c]);
        let backward = expense(Money::from_cents(10000), a, &[c, b, a]);

        assert_eq!(shares(&forward).unwrap(), shares(&backward).unwrap());
        assert_eq!(compute_share(&forward).unwrap(), compute_share(&backward).unwrap());
    }

    #[test]
    fn test_non_participant_owes_nothing() {
        let (a, b, outsider) = (MemberId::new(), MemberId::new(), MemberId::new());
        let e = expense(Money::from_units(50), a, &[a, b]);
        assert_eq!(share_of(&e, outsider).unwrap(), Money::zero());
        assert_eq!(amount_owed(&e, outsider).unwrap(), Money::zero());
    }

    #[test]
    fn test_payer_excluded_from_split() {
        let (a, b, c) = (MemberId::new(), MemberId::new(), MemberId::new());
        let e = expense(Money::from_units(60), a, &[b, c]);
        assert_eq!(total_owed(&e).unwrap(), Money::from_units(60));
        assert_eq!(amount_owed(&e, b).unwrap(), Money::from_units(30));
    }

    #[test]
    fn test_owed_monotonic_and_never_negative() {
        let (a, b) = (MemberId::new(), MemberId::new());
        let mut e = expense(Money::from_units(40), a, &[a, b]);

        let mut previous = amount_owed(&e, b).unwrap();
        for cents in [500, 700, 800, 500] {
            pay(&mut e, b, cents);
            let owed = amount_owed(&e, b).unwrap();
            assert!(owed <= previous);
            assert!(!owed.is_negative());
            previous = owed;
        }
        assert_eq!(previous, Money::zero());
    }
}
