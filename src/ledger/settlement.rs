//! Payments and settlement state

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::directory;
use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{Expense, MemberId, Money, Payment, Principal};

use super::shares::{amount_owed, compute_share, total_owed};

/// Derived view of how far an expense has been paid back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementStatus {
    /// Sum of all recorded payments
    pub total_paid: Money,
    /// Amount owed to the payer (amount minus the payer's share)
    pub total_owed: Money,
    /// Payments cover everything owed
    pub covered: bool,
    /// Effective state, including any manual override
    pub settled: bool,
}

impl SettlementStatus {
    /// Amount still outstanding across all participants
    pub fn outstanding(&self) -> Money {
        self.total_owed.saturating_sub_floor(self.total_paid)
    }
}

/// Compute the settlement view of an expense
pub fn settlement_status(expense: &Expense) -> ChorebookResult<SettlementStatus> {
    let total_paid = expense.total_paid();
    let total_owed = total_owed(expense)?;
    Ok(SettlementStatus {
        total_paid,
        total_owed,
        covered: total_paid >= total_owed,
        settled: expense.is_settled(),
    })
}

/// Validate and append a payment from `payer_id`
///
/// Rejects non-positive amounts and any amount above what the payer owes
/// right now. On success the payment is appended and the payment latch is
/// re-checked; the latch only ever moves from unsettled to settled here.
pub fn record_payment(
    expense: &mut Expense,
    payer_id: MemberId,
    amount: Money,
    note: Option<String>,
    now: DateTime<Utc>,
) -> ChorebookResult<Payment> {
    if !amount.is_positive() {
        return Err(ChorebookError::Validation(format!(
            "Payment amount must be positive, got {}",
            amount
        )));
    }

    let owed = amount_owed(expense, payer_id)?;
    if amount > owed {
        return Err(ChorebookError::Overpayment {
            owed,
            attempted: amount,
        });
    }

    let was_settled = expense.is_settled();
    let payment = Payment::new(expense, payer_id, amount, now, note);
    expense.payments.push(payment.clone());
    expense.updated_at = now;

    if !expense.payment_settled && expense.total_paid() >= total_owed(expense)? {
        expense.payment_settled = true;
    }
    restamp(expense, was_settled, now);

    Ok(payment)
}

/// Keep `settled_at`/`settled_by` in step with the effective state
///
/// Stamps when the expense becomes settled through payments, crediting the
/// most recent payer, and clears the stamps when it stops being settled.
fn restamp(expense: &mut Expense, was_settled: bool, now: DateTime<Utc>) {
    match (was_settled, expense.is_settled()) {
        (false, true) => {
            expense.settled_at = Some(now);
            expense.settled_by = expense.payments.last().map(|p| p.paid_by);
        }
        (true, false) => {
            expense.settled_at = None;
            expense.settled_by = None;
        }
        _ => {}
    }
}

/// Flip the effective settlement state as an explicit member decision
///
/// Does not look at payments. Returns the new effective state.
pub fn toggle_settled(
    expense: &mut Expense,
    actor: &Principal,
    now: DateTime<Utc>,
) -> ChorebookResult<bool> {
    directory::require_settle(actor, expense)?;

    let settled = !expense.is_settled();
    expense.manual_override = Some(settled);
    if settled {
        expense.settled_at = Some(now);
        expense.settled_by = Some(actor.member_id);
    } else {
        expense.settled_at = None;
        expense.settled_by = None;
    }
    expense.updated_at = now;

    Ok(settled)
}

/// Drop a manual override so the payment latch decides again
pub fn clear_override(expense: &mut Expense, now: DateTime<Utc>) -> bool {
    let was_settled = expense.is_settled();
    if expense.manual_override.take().is_none() {
        return false;
    }
    restamp(expense, was_settled, now);
    expense.updated_at = now;
    true
}

/// Effect of changing an expense's amount or split on its shares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revaluation {
    pub old_share: Money,
    pub new_share: Money,
    /// Payments already recorded against the old shares
    pub had_payments: bool,
}

fn rederive_latch(expense: &mut Expense, now: DateTime<Utc>) -> ChorebookResult<()> {
    let was_settled = expense.is_settled();
    expense.payment_settled = expense.total_paid() >= total_owed(expense)?
        && !expense.payments.is_empty();
    restamp(expense, was_settled, now);
    Ok(())
}

/// Change the expense amount, revaluing every share
///
/// Existing payments are kept as recorded and the payment latch is derived
/// again against the new total.
pub fn revalue(
    expense: &mut Expense,
    new_amount: Money,
    now: DateTime<Utc>,
) -> ChorebookResult<Revaluation> {
    if !new_amount.is_positive() {
        return Err(ChorebookError::Validation(format!(
            "Expense amount must be positive, got {}",
            new_amount
        )));
    }

    let old_share = compute_share(expense)?;
    expense.amount = new_amount;
    rederive_latch(expense, now)?;
    expense.updated_at = now;

    Ok(Revaluation {
        old_share,
        new_share: compute_share(expense)?,
        had_payments: !expense.payments.is_empty(),
    })
}

/// Replace the set of participants, revaluing every share
pub fn resplit(
    expense: &mut Expense,
    split_between: BTreeSet<MemberId>,
    now: DateTime<Utc>,
) -> ChorebookResult<Revaluation> {
    if split_between.is_empty() {
        return Err(ChorebookError::Validation(
            "An expense must be split between at least one member".into(),
        ));
    }

    let old_share = compute_share(expense)?;
    expense.split_between = split_between;
    rederive_latch(expense, now)?;
    expense.updated_at = now;

    Ok(Revaluation {
        old_share,
        new_share: compute_share(expense)?,
        had_payments: !expense.payments.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HouseholdId;
    use chrono::NaiveDate;

    struct Fixture {
        expense: Expense,
        a: MemberId,
        b: MemberId,
        c: MemberId,
    }

    fn fixture() -> Fixture {
        let (a, b, c) = (MemberId::new(), MemberId::new(), MemberId::new());
        let expense = Expense::new(
            HouseholdId::for_admin(a),
            "Dinner",
            Money::from_units(90),
            a,
            [a, b, c],
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        );
        Fixture { expense, a, b, c }
    }

    fn principal(member_id: MemberId, is_admin: bool) -> Principal {
        Principal {
            member_id,
            is_admin,
            admin_id: None,
        }
    }

    #[test]
    fn test_partial_then_full_settlement() {
        let Fixture { mut expense, b, c, .. } = fixture();
        let now = Utc::now();

        record_payment(&mut expense, b, Money::from_units(20), None, now).unwrap();
        assert_eq!(amount_owed(&expense, b).unwrap(), Money::from_units(10));
        let status = settlement_status(&expense).unwrap();
        assert_eq!(status.total_paid, Money::from_units(20));
        assert_eq!(status.total_owed, Money::from_units(60));
        assert!(!status.settled);

        record_payment(&mut expense, b, Money::from_units(10), None, now).unwrap();
        assert!(!expense.is_settled());
        record_payment(&mut expense, c, Money::from_units(30), Some("cash".into()), now).unwrap();

        assert!(expense.is_settled());
        assert_eq!(expense.settled_by, Some(c));
        assert_eq!(expense.settled_at, Some(now));
        assert_eq!(settlement_status(&expense).unwrap().outstanding(), Money::zero());
    }

    #[test]
    fn test_overpayment_rejected_without_changes() {
        let Fixture { mut expense, b, .. } = fixture();
        let before = expense.clone();

        let err = record_payment(&mut expense, b, Money::from_units(40), None, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            ChorebookError::Overpayment { owed, attempted }
                if owed == Money::from_units(30) && attempted == Money::from_units(40)
        ));
        assert_eq!(expense, before);
    }

    #[test]
    fn test_payer_cannot_pay_themselves() {
        let Fixture { mut expense, a, .. } = fixture();
        let err = record_payment(&mut expense, a, Money::from_units(1), None, Utc::now())
            .unwrap_err();
        assert!(err.is_overpayment());
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        let Fixture { mut expense, b, .. } = fixture();
        let err = record_payment(&mut expense, b, Money::zero(), None, Utc::now()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_toggle_is_independent_of_payments() {
        let Fixture { mut expense, b, .. } = fixture();
        let now = Utc::now();

        assert!(toggle_settled(&mut expense, &principal(b, false), now).unwrap());
        assert!(expense.is_settled());
        assert!(!expense.payment_settled);
        assert_eq!(expense.settled_by, Some(b));

        assert!(!toggle_settled(&mut expense, &principal(b, false), now).unwrap());
        assert!(!expense.is_settled());
        assert!(expense.settled_at.is_none());
        assert!(expense.settled_by.is_none());
    }

    #[test]
    fn test_toggle_requires_involvement() {
        let Fixture { mut expense, .. } = fixture();
        let outsider = principal(MemberId::new(), false);
        let err = toggle_settled(&mut expense, &outsider, Utc::now()).unwrap_err();
        assert!(err.is_unauthorized());
        assert!(expense.manual_override.is_none());

        let admin = principal(MemberId::new(), true);
        assert!(toggle_settled(&mut expense, &admin, Utc::now()).unwrap());
    }

    #[test]
    fn test_override_survives_payments_until_cleared() {
        let Fixture { mut expense, a, b, c } = fixture();
        let now = Utc::now();

        // Marked settled by hand, then explicitly reopened
        toggle_settled(&mut expense, &principal(a, false), now).unwrap();
        toggle_settled(&mut expense, &principal(a, false), now).unwrap();
        assert_eq!(expense.manual_override, Some(false));

        record_payment(&mut expense, b, Money::from_units(30), None, now).unwrap();
        record_payment(&mut expense, c, Money::from_units(30), None, now).unwrap();
        assert!(expense.payment_settled);
        assert!(!expense.is_settled());

        let later = now + chrono::Duration::minutes(5);
        assert!(clear_override(&mut expense, later));
        assert!(expense.is_settled());
        assert_eq!(expense.settled_at, Some(later));
        assert_eq!(expense.settled_by, Some(c));
        assert!(!clear_override(&mut expense, later));
    }

    #[test]
    fn test_clearing_a_settled_override_without_payments_unstamps() {
        let Fixture { mut expense, b, .. } = fixture();
        let now = Utc::now();
        toggle_settled(&mut expense, &principal(b, false), now).unwrap();
        assert!(expense.settled_at.is_some());

        assert!(clear_override(&mut expense, now));
        assert!(!expense.is_settled());
        assert!(expense.settled_at.is_none());
        assert!(expense.settled_by.is_none());
    }

    #[test]
    fn test_revalue_rederives_latch() {
        let Fixture { mut expense, b, c, .. } = fixture();
        let now = Utc::now();
        record_payment(&mut expense, b, Money::from_units(30), None, now).unwrap();
        record_payment(&mut expense, c, Money::from_units(30), None, now).unwrap();
        assert!(expense.is_settled());

        let revaluation = revalue(&mut expense, Money::from_units(120), now).unwrap();
        assert_eq!(revaluation.old_share, Money::from_units(30));
        assert_eq!(revaluation.new_share, Money::from_units(40));
        assert!(revaluation.had_payments);
        assert!(!expense.is_settled());
        assert!(expense.settled_at.is_none());
        assert!(expense.settled_by.is_none());
        assert_eq!(amount_owed(&expense, b).unwrap(), Money::from_units(10));

        assert!(revalue(&mut expense, Money::zero(), now).unwrap_err().is_validation());
    }

    #[test]
    fn test_shrinking_amount_settles_with_stamp() {
        let (a, b) = (MemberId::new(), MemberId::new());
        let mut expense = Expense::new(
            HouseholdId::for_admin(a),
            "Groceries",
            Money::from_units(100),
            a,
            [a, b],
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        );
        let now = Utc::now();
        record_payment(&mut expense, b, Money::from_units(30), None, now).unwrap();
        assert!(!expense.is_settled());
        assert!(expense.settled_at.is_none());

        let later = now + chrono::Duration::hours(1);
        revalue(&mut expense, Money::from_units(60), later).unwrap();
        assert!(expense.is_settled());
        assert_eq!(expense.settled_at, Some(later));
        assert_eq!(expense.settled_by, Some(b));
    }

    #[test]
    fn test_stamps_follow_effective_state() {
        let Fixture { mut expense, a, b, c } = fixture();
        let now = Utc::now();
        let stamped = |e: &Expense| {
            e.is_settled() == e.settled_at.is_some() && e.is_settled() == e.settled_by.is_some()
        };

        record_payment(&mut expense, b, Money::from_units(30), None, now).unwrap();
        assert!(stamped(&expense));
        record_payment(&mut expense, c, Money::from_units(30), None, now).unwrap();
        assert!(stamped(&expense));
        revalue(&mut expense, Money::from_units(150), now).unwrap();
        assert!(stamped(&expense));
        resplit(&mut expense, [a, b].into_iter().collect(), now).unwrap();
        assert!(stamped(&expense));
        toggle_settled(&mut expense, &principal(a, true), now).unwrap();
        assert!(stamped(&expense));
        resplit(&mut expense, [a, b, c].into_iter().collect(), now).unwrap();
        assert!(stamped(&expense));
        clear_override(&mut expense, now);
        assert!(stamped(&expense));
    }

    #[test]
    fn test_resplit() {
        let Fixture { mut expense, a, b, .. } = fixture();
        let now = Utc::now();
        let revaluation = resplit(&mut expense, [a, b].into_iter().collect(), now).unwrap();
        assert_eq!(revaluation.new_share, Money::from_units(45));
        assert!(resplit(&mut expense, BTreeSet::new(), now).unwrap_err().is_validation());
    }
}
