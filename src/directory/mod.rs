//! Household directory capability checks
//!
//! Every authorization decision the services make goes through here so the
//! rules stay in one place. The checks are pure; the `require_*` variants
//! turn a refusal into `ChorebookError::Unauthorized`.

use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{Chore, Expense, HouseholdId, Member, Principal};

/// The household an actor belongs to
///
/// An admin's household shares the admin's id; everyone else resolves
/// through the admin they joined.
pub fn resolve_household_id(actor: &Principal) -> ChorebookResult<HouseholdId> {
    if actor.is_admin {
        return Ok(HouseholdId::for_admin(actor.member_id));
    }

    actor.admin_id.map(HouseholdId::for_admin).ok_or_else(|| {
        ChorebookError::Unauthorized(format!(
            "member {} does not belong to a household",
            actor.member_id
        ))
    })
}

/// Admins and the assignee may complete a chore
pub fn can_mark_chore_complete(actor: &Principal, chore: &Chore) -> bool {
    actor.is_admin || chore.assigned_to == actor.member_id
}

/// Admins, the payer and participants may change settlement
pub fn can_settle_expense(actor: &Principal, expense: &Expense) -> bool {
    actor.is_admin || expense.involves(actor.member_id)
}

/// Admins and the payer may edit or delete an expense
pub fn can_edit_expense(actor: &Principal, expense: &Expense) -> bool {
    actor.is_admin || expense.paid_by == actor.member_id
}

/// Fail unless the actor is the household admin
pub fn require_admin(actor: &Principal, action: &str) -> ChorebookResult<()> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(ChorebookError::Unauthorized(format!(
            "only the household admin can {}",
            action
        )))
    }
}

pub fn require_chore_completion(actor: &Principal, chore: &Chore) -> ChorebookResult<()> {
    if can_mark_chore_complete(actor, chore) {
        Ok(())
    } else {
        Err(ChorebookError::Unauthorized(format!(
            "only an admin or the assignee can complete '{}'",
            chore.title
        )))
    }
}

pub fn require_expense_edit(actor: &Principal, expense: &Expense) -> ChorebookResult<()> {
    if can_edit_expense(actor, expense) {
        Ok(())
    } else {
        Err(ChorebookError::Unauthorized(format!(
            "only an admin or the payer can change '{}'",
            expense.title
        )))
    }
}

pub fn require_settle(actor: &Principal, expense: &Expense) -> ChorebookResult<()> {
    if can_settle_expense(actor, expense) {
        Ok(())
    } else {
        Err(ChorebookError::Unauthorized(
            "only an admin or a member involved in the expense can change its settlement".into(),
        ))
    }
}

/// Fail unless the record lives in the actor's household
pub fn require_same_household(
    actor: &Principal,
    household_id: HouseholdId,
) -> ChorebookResult<()> {
    if resolve_household_id(actor)? == household_id {
        Ok(())
    } else {
        Err(ChorebookError::Unauthorized(
            "record belongs to another household".into(),
        ))
    }
}

/// Check that a member is an approved member of the household
pub fn is_active_member(member: &Member, household_id: HouseholdId) -> bool {
    let home = HouseholdId::for_admin(member.admin_id.unwrap_or(member.id));
    home == household_id && member.is_approved()
}
