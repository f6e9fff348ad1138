//! Household CLI commands
//!
//! Registration, join requests and membership review.

use clap::Subcommand;

use crate::display::format_member_list;
use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{MemberId, Principal};
use crate::services::HouseholdService;
use crate::storage::Storage;

use super::require_actor;

/// Household subcommands
#[derive(Subcommand)]
pub enum HouseholdCommands {
    /// Register as admin of a new household
    Register {
        /// Your name
        #[arg(short, long)]
        name: String,
        /// Your email address
        #[arg(short, long)]
        email: String,
        /// Household name
        #[arg(short = 'H', long)]
        household: String,
    },
    /// Ask to join a household with its invitation code
    Join {
        /// Invitation code from the household admin
        code: String,
        /// Your name
        #[arg(short, long)]
        name: String,
        /// Your email address
        #[arg(short, long)]
        email: String,
    },
    /// Show household details and the invitation code
    Show,
    /// List approved members
    Members,
    /// List pending join requests (admin)
    Pending,
    /// Approve a pending join request (admin)
    Approve {
        /// Member name, email or ID
        member: String,
    },
    /// Reject and delete a pending join request (admin)
    Reject {
        /// Member name, email or ID
        member: String,
    },
    /// Generate a new invitation code (admin)
    NewCode,
    /// Change your own name or email
    Profile {
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New email address
        #[arg(short, long)]
        email: Option<String>,
    },
}

/// Handle a household command
pub fn handle_household_command(
    storage: &Storage,
    actor: Option<&str>,
    cmd: HouseholdCommands,
) -> ChorebookResult<()> {
    let service = HouseholdService::new(storage);

    match cmd {
        HouseholdCommands::Register {
            name,
            email,
            household,
        } => {
            let (admin, household) = service.register(&name, &email, &household)?;
            println!("Registered household: {}", household.name);
            println!("  Admin:           {} <{}>", admin.name, admin.email);
            println!("  Member ID:       {}", admin.id);
            println!("  Invitation code: {}", household.invitation_code);
            println!();
            println!("Share the invitation code so others can run 'chorebook household join'.");
        }

        HouseholdCommands::Join { code, name, email } => {
            let member = service.request_join(&name, &email, &code)?;
            println!("Join request sent for {} <{}>", member.name, member.email);
            println!("  Member ID: {}", member.id);
            println!("The household admin needs to approve it before you can act.");
        }

        HouseholdCommands::Show => {
            let principal = require_actor(storage, actor)?;
            let household = service.household(&principal)?;
            let members = service.members(&principal)?;
            println!("Household: {}", household.name);
            println!("  ID:              {}", household.id);
            println!("  Members:         {}", members.len());
            if principal.is_admin {
                println!("  Invitation code: {}", household.invitation_code);
            }
        }

        HouseholdCommands::Members => {
            let principal = require_actor(storage, actor)?;
            println!("{}", format_member_list(&service.members(&principal)?));
        }

        HouseholdCommands::Pending => {
            let principal = require_actor(storage, actor)?;
            let pending = service.pending_requests(&principal)?;
            if pending.is_empty() {
                println!("No pending join requests.");
            } else {
                println!("{}", format_member_list(&pending));
            }
        }

        HouseholdCommands::Approve { member } => {
            let principal = require_actor(storage, actor)?;
            let target = pending_member(&service, &principal, &member)?;
            let approved = service.approve_member(&principal, target)?;
            println!("Approved {} <{}>", approved.name, approved.email);
        }

        HouseholdCommands::Reject { member } => {
            let principal = require_actor(storage, actor)?;
            let target = pending_member(&service, &principal, &member)?;
            let rejected = service.reject_member(&principal, target)?;
            println!("Rejected join request from {} <{}>", rejected.name, rejected.email);
        }

        HouseholdCommands::NewCode => {
            let principal = require_actor(storage, actor)?;
            let code = service.regenerate_invitation_code(&principal)?;
            println!("New invitation code: {}", code);
        }

        HouseholdCommands::Profile { name, email } => {
            let principal = require_actor(storage, actor)?;
            let member = service.update_profile(&principal, name.as_deref(), email.as_deref())?;
            println!("Updated profile: {} <{}>", member.name, member.email);
        }
    }

    Ok(())
}

/// Pending members are not yet household members, so look them up among
/// the admin's requests first.
fn pending_member(
    service: &HouseholdService<'_>,
    principal: &Principal,
    identifier: &str,
) -> ChorebookResult<MemberId> {
    let identifier = identifier.trim();
    let pending = service.pending_requests(principal)?;
    if let Some(member) = pending.iter().find(|m| {
        m.id.matches_prefix(identifier)
            || m.email.eq_ignore_ascii_case(identifier)
            || m.name.eq_ignore_ascii_case(identifier)
    }) {
        return Ok(member.id);
    }
    Err(ChorebookError::member_not_found(identifier))
}
