//! Household service
//!
//! Registration, join requests and membership approval. Rejection deletes
//! the pending record outright.

use chrono::Utc;
use tracing::info;

use crate::audit::EntityType;
use crate::directory;
use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{Household, HouseholdId, Member, MemberId, MembershipStatus, Principal};
use crate::storage::Storage;

/// Service for household and membership management
pub struct HouseholdService<'a> {
    storage: &'a Storage,
}

impl<'a> HouseholdService<'a> {
    /// Create a new household service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn ensure_email_free(&self, email: &str) -> ChorebookResult<()> {
        let taken = self
            .storage
            .members
            .find_one(|m| m.email.eq_ignore_ascii_case(email))?;
        if taken.is_some() {
            return Err(ChorebookError::Duplicate {
                entity_type: "Member",
                identifier: email.to_string(),
            });
        }
        Ok(())
    }

    /// Register an admin together with their new household
    pub fn register(
        &self,
        name: &str,
        email: &str,
        household_name: &str,
    ) -> ChorebookResult<(Member, Household)> {
        let email = email.trim();
        let household_name = household_name.trim();
        if household_name.is_empty() {
            return Err(ChorebookError::Validation(
                "Household name cannot be empty".into(),
            ));
        }

        let admin = Member::new_admin(name.trim(), email);
        admin
            .validate()
            .map_err(|e| ChorebookError::Validation(e.to_string()))?;
        self.ensure_email_free(email)?;

        let household = Household::new(admin.id, household_name);

        self.storage.members.insert(admin.clone())?;
        self.storage.households.insert(household.clone())?;

        self.storage.log_create(
            EntityType::Member,
            admin.id.to_string(),
            Some(admin.name.clone()),
            &admin,
        )?;
        self.storage.log_create(
            EntityType::Household,
            household.id.to_string(),
            Some(household.name.clone()),
            &household,
        )?;

        info!(household = %household.id, admin = %admin.id, "registered household");
        Ok((admin, household))
    }

    /// Ask to join the household owning `invitation_code`
    pub fn request_join(
        &self,
        name: &str,
        email: &str,
        invitation_code: &str,
    ) -> ChorebookResult<Member> {
        let household = self
            .storage
            .households
            .find_one(|h| h.matches_code(invitation_code))?
            .ok_or_else(|| ChorebookError::household_not_found(invitation_code.trim()))?;

        let email = email.trim();
        let member = Member::new_pending(name.trim(), email, household.admin_id);
        member
            .validate()
            .map_err(|e| ChorebookError::Validation(e.to_string()))?;
        self.ensure_email_free(email)?;

        self.storage.members.insert(member.clone())?;

        self.storage.log_create(
            EntityType::Member,
            member.id.to_string(),
            Some(member.name.clone()),
            &member,
        )?;

        info!(household = %household.id, member = %member.id, "join requested");
        Ok(member)
    }

    /// The actor's household
    pub fn household(&self, actor: &Principal) -> ChorebookResult<Household> {
        let id = directory::resolve_household_id(actor)?;
        self.storage
            .households
            .get(id)?
            .ok_or_else(|| ChorebookError::household_not_found(id.to_string()))
    }

    /// Replace the invitation code; admin only
    pub fn regenerate_invitation_code(&self, actor: &Principal) -> ChorebookResult<String> {
        directory::require_admin(actor, "regenerate the invitation code")?;
        let id = directory::resolve_household_id(actor)?;

        let (before, after) = self.storage.households.modify(id, |household| {
            let before = household.clone();
            household.regenerate_invitation_code();
            Ok((before, household.clone()))
        })?;

        self.storage.log_update(
            EntityType::Household,
            id.to_string(),
            Some(after.name.clone()),
            &before,
            &after,
            Some("invitation_code regenerated".into()),
        )?;

        Ok(after.invitation_code)
    }

    /// Approved members of the actor's household, admin first
    pub fn members(&self, actor: &Principal) -> ChorebookResult<Vec<Member>> {
        let household_id = directory::resolve_household_id(actor)?;
        let mut members = self
            .storage
            .members
            .find(|m| directory::is_active_member(m, household_id))?;
        members.sort_by(|a, b| {
            b.is_admin
                .cmp(&a.is_admin)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(members)
    }

    /// Pending join requests; admin only
    pub fn pending_requests(&self, actor: &Principal) -> ChorebookResult<Vec<Member>> {
        directory::require_admin(actor, "review join requests")?;
        let mut pending = self
            .storage
            .members
            .find(|m| m.admin_id == Some(actor.member_id) && m.is_pending())?;
        pending.sort_by_key(|m| m.requested_at);
        Ok(pending)
    }

    fn pending_request(&self, actor: &Principal, member_id: MemberId) -> ChorebookResult<Member> {
        directory::require_admin(actor, "review join requests")?;
        let member = self
            .storage
            .members
            .get(member_id)?
            .filter(|m| m.admin_id == Some(actor.member_id))
            .ok_or_else(|| ChorebookError::member_not_found(member_id.to_string()))?;

        if !member.is_pending() {
            return Err(ChorebookError::Validation(format!(
                "{} is not awaiting approval (status: {})",
                member.name, member.status
            )));
        }
        Ok(member)
    }

    /// Approve a pending join request, stamping `joined_at`
    pub fn approve_member(&self, actor: &Principal, member_id: MemberId) -> ChorebookResult<Member> {
        let before = self.pending_request(actor, member_id)?;

        let member = self.storage.members.modify(member_id, |member| {
            let now = Utc::now();
            member.status = MembershipStatus::Approved;
            member.joined_at = Some(now);
            member.updated_at = now;
            Ok(member.clone())
        })?;

        self.storage.log_update(
            EntityType::Member,
            member.id.to_string(),
            Some(member.name.clone()),
            &before,
            &member,
            Some("status: pending -> approved".into()),
        )?;

        info!(member = %member.id, "member approved");
        Ok(member)
    }

    /// Reject a pending join request; the record is deleted
    pub fn reject_member(&self, actor: &Principal, member_id: MemberId) -> ChorebookResult<Member> {
        let member = self.pending_request(actor, member_id)?;

        self.storage.members.delete(member_id)?;

        self.storage.log_delete(
            EntityType::Member,
            member.id.to_string(),
            Some(member.name.clone()),
            &member,
        )?;

        info!(member = %member.id, "join request rejected");
        Ok(member)
    }

    /// Change the acting member's own name or email
    pub fn update_profile(
        &self,
        actor: &Principal,
        name: Option<&str>,
        email: Option<&str>,
    ) -> ChorebookResult<Member> {
        if name.is_none() && email.is_none() {
            return Err(ChorebookError::Validation(
                "Nothing to update: give a new name or email".into(),
            ));
        }

        let before = self
            .storage
            .members
            .get(actor.member_id)?
            .ok_or_else(|| ChorebookError::member_not_found(actor.member_id.to_string()))?;
        let email = email.map(str::trim);
        if let Some(email) = email {
            if !email.eq_ignore_ascii_case(&before.email) {
                self.ensure_email_free(email)?;
            }
        }

        let after = self.storage.members.modify(actor.member_id, |member| {
            if let Some(name) = name {
                member.name = name.trim().to_string();
            }
            if let Some(email) = email {
                member.email = email.to_string();
            }
            member
                .validate()
                .map_err(|e| ChorebookError::Validation(e.to_string()))?;
            member.updated_at = Utc::now();
            Ok(member.clone())
        })?;

        self.storage.log_update(
            EntityType::Member,
            after.id.to_string(),
            Some(after.name.clone()),
            &before,
            &after,
            None,
        )?;

        info!(member = %after.id, "profile updated");
        Ok(after)
    }

    /// Look up a member by id, email or name (case-insensitive)
    pub fn find_member(&self, identifier: &str) -> ChorebookResult<Option<Member>> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<MemberId>() {
            if let Some(member) = self.storage.members.get(id)? {
                return Ok(Some(member));
            }
        }

        if let Some(member) = self
            .storage
            .members
            .find_one(|m| m.email.eq_ignore_ascii_case(identifier))?
        {
            return Ok(Some(member));
        }

        self.storage
            .members
            .find_one(|m| m.name.eq_ignore_ascii_case(identifier))
    }

    /// Find a member of the actor's household by id, email or name
    pub fn find_household_member(
        &self,
        actor: &Principal,
        identifier: &str,
    ) -> ChorebookResult<Member> {
        let household_id = directory::resolve_household_id(actor)?;
        let identifier = identifier.trim();

        let by_id = identifier
            .parse::<MemberId>()
            .ok()
            .map(|id| self.storage.members.get(id))
            .transpose()?
            .flatten();

        let found = match by_id {
            Some(member) => Some(member),
            None => self.storage.members.find_one(|m| {
                directory::is_active_member(m, household_id)
                    && (m.email.eq_ignore_ascii_case(identifier)
                        || m.name.eq_ignore_ascii_case(identifier))
            })?,
        };

        found
            .filter(|m| directory::is_active_member(m, household_id))
            .ok_or_else(|| ChorebookError::member_not_found(identifier))
    }

    /// Resolve the principal for an acting member
    ///
    /// Only approved members may act.
    pub fn principal_for(&self, identifier: &str) -> ChorebookResult<Principal> {
        let member = self
            .find_member(identifier)?
            .ok_or_else(|| ChorebookError::member_not_found(identifier.trim()))?;

        if !member.is_approved() {
            return Err(ChorebookError::Unauthorized(format!(
                "{} has not been approved yet",
                member.name
            )));
        }
        Ok(member.principal())
    }

    /// Map member ids in a household to display names
    pub fn member_names(
        &self,
        household_id: HouseholdId,
    ) -> ChorebookResult<std::collections::HashMap<MemberId, String>> {
        Ok(self
            .storage
            .members
            .find(|m| HouseholdId::for_admin(m.admin_id.unwrap_or(m.id)) == household_id)?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect())
    }
}
