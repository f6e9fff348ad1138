//! Alert service
//!
//! Members report household issues, move them through open, in progress
//! and resolved, and the admin clears them out.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::audit::EntityType;
use crate::directory;
use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{Alert, AlertCategory, AlertId, AlertPriority, AlertStatus, Principal};
use crate::storage::Storage;

/// Service for household alerts
pub struct AlertService<'a> {
    storage: &'a Storage,
}

/// Input for reporting an alert
#[derive(Debug, Clone)]
pub struct ReportAlertInput {
    pub title: String,
    pub description: String,
    pub category: AlertCategory,
    pub priority: AlertPriority,
}

/// Options for filtering alerts
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub category: Option<AlertCategory>,
    pub priority: Option<AlertPriority>,
}

impl AlertFilter {
    fn matches(&self, alert: &Alert) -> bool {
        self.status.map_or(true, |s| alert.status == s)
            && self.category.map_or(true, |c| alert.category == c)
            && self.priority.map_or(true, |p| alert.priority == p)
    }
}

impl<'a> AlertService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Report a new open alert in the actor's household
    pub fn report(
        &self,
        actor: &Principal,
        input: ReportAlertInput,
        now: DateTime<Utc>,
    ) -> ChorebookResult<Alert> {
        let household_id = directory::resolve_household_id(actor)?;

        let mut alert = Alert::new(
            household_id,
            input.title.trim(),
            input.description.trim(),
            actor.member_id,
            now,
        );
        alert.category = input.category;
        alert.priority = input.priority;
        alert
            .validate()
            .map_err(|e| ChorebookError::Validation(e.to_string()))?;

        self.storage.alerts.insert(alert.clone())?;

        self.storage.log_create(
            EntityType::Alert,
            alert.id.to_string(),
            Some(alert.title.clone()),
            &alert,
        )?;

        info!(alert = %alert.id, priority = %alert.priority, "alert reported");
        Ok(alert)
    }

    pub fn get(&self, actor: &Principal, id: AlertId) -> ChorebookResult<Alert> {
        let alert = self
            .storage
            .alerts
            .get(id)?
            .ok_or_else(|| ChorebookError::alert_not_found(id.to_string()))?;
        directory::require_same_household(actor, alert.household_id)?;
        Ok(alert)
    }

    /// Find an alert by id, short id or title, preferring unresolved ones
    pub fn find(&self, actor: &Principal, identifier: &str) -> ChorebookResult<Alert> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<AlertId>() {
            return self.get(actor, id);
        }

        let household_id = directory::resolve_household_id(actor)?;
        let mut matches = self.storage.alerts.find(|a| {
            a.household_id == household_id
                && (a.id.matches_prefix(identifier) || a.title.eq_ignore_ascii_case(identifier))
        })?;
        matches.sort_by(|a, b| {
            a.is_resolved()
                .cmp(&b.is_resolved())
                .then_with(|| b.reported_at.cmp(&a.reported_at))
        });
        matches
            .into_iter()
            .next()
            .ok_or_else(|| ChorebookError::alert_not_found(identifier))
    }

    /// Alerts in the actor's household
    ///
    /// Unresolved alerts come first, most urgent and then newest first;
    /// resolved ones follow, most recently resolved first.
    pub fn list(&self, actor: &Principal, filter: &AlertFilter) -> ChorebookResult<Vec<Alert>> {
        let household_id = directory::resolve_household_id(actor)?;
        let mut alerts = self
            .storage
            .alerts
            .find(|a| a.household_id == household_id && filter.matches(a))?;
        alerts.sort_by(|a, b| {
            a.is_resolved()
                .cmp(&b.is_resolved())
                .then_with(|| b.resolved_at.cmp(&a.resolved_at))
                .then_with(|| b.priority.cmp(&a.priority))
                .then_with(|| b.reported_at.cmp(&a.reported_at))
        });
        Ok(alerts)
    }

    /// Move an alert to a new status; any household member may
    pub fn update_status(
        &self,
        actor: &Principal,
        id: AlertId,
        status: AlertStatus,
        now: DateTime<Utc>,
    ) -> ChorebookResult<Alert> {
        let before = self.get(actor, id)?;

        let after = self.storage.alerts.modify(id, |alert| {
            alert.set_status(status, actor.member_id, now);
            Ok(alert.clone())
        })?;

        self.storage.log_update(
            EntityType::Alert,
            after.id.to_string(),
            Some(after.title.clone()),
            &before,
            &after,
            Some(format!("status: {} -> {}", before.status, after.status)),
        )?;

        info!(alert = %after.id, status = %after.status, "alert status changed");
        Ok(after)
    }

    /// Delete an alert; admin only
    pub fn delete(&self, actor: &Principal, id: AlertId) -> ChorebookResult<Alert> {
        let alert = self.get(actor, id)?;
        directory::require_admin(actor, "delete alerts")?;

        self.storage.alerts.delete(id)?;

        self.storage.log_delete(
            EntityType::Alert,
            alert.id.to_string(),
            Some(alert.title.clone()),
            &alert,
        )?;

        info!(alert = %alert.id, "alert deleted");
        Ok(alert)
    }
}
