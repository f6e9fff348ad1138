//! Alert display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Alert, AlertPriority};

use super::report::truncate;
use super::{member_name, MemberNames};

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Reported")]
    reported: String,
}

fn priority_label(priority: AlertPriority) -> String {
    match priority {
        AlertPriority::Urgent => "URGENT".to_string(),
        other => other.to_string(),
    }
}

/// Format a list of alerts as a table
pub fn format_alert_list(alerts: &[Alert], names: &MemberNames) -> String {
    if alerts.is_empty() {
        return "No alerts.".to_string();
    }

    let rows = alerts.iter().map(|alert| AlertRow {
        id: alert.id.short(),
        title: truncate(&alert.title, 32),
        category: alert.category.to_string(),
        priority: priority_label(alert.priority),
        status: alert.status.to_string(),
        reported: format!(
            "{} by {}",
            alert.reported_at.format("%Y-%m-%d"),
            member_name(names, alert.reported_by)
        ),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

/// Format a single alert's details
pub fn format_alert_details(alert: &Alert, names: &MemberNames) -> String {
    let mut output = String::new();

    output.push_str(&format!("Alert: {}\n", alert.title));
    output.push_str(&format!("  ID:          {}\n", alert.id));
    output.push_str(&format!("  Description: {}\n", alert.description));
    output.push_str(&format!("  Category:    {}\n", alert.category));
    output.push_str(&format!("  Priority:    {}\n", priority_label(alert.priority)));
    output.push_str(&format!("  Status:      {}\n", alert.status));
    output.push_str(&format!(
        "  Reported:    {} by {}\n",
        alert.reported_at.format("%Y-%m-%d %H:%M"),
        member_name(names, alert.reported_by)
    ));

    if let (Some(at), Some(by)) = (alert.resolved_at, alert.resolved_by) {
        output.push_str(&format!(
            "  Resolved:    {} by {}\n",
            at.format("%Y-%m-%d %H:%M"),
            member_name(names, by)
        ));
    } else if let (Some(at), Some(by)) = (alert.updated_at, alert.updated_by) {
        output.push_str(&format!(
            "  Updated:     {} by {}\n",
            at.format("%Y-%m-%d %H:%M"),
            member_name(names, by)
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertStatus, HouseholdId, MemberId};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_alert_list_and_details() {
        let member = MemberId::new();
        let mut names = MemberNames::new();
        names.insert(member, "Sam".into());

        let at = Utc.with_ymd_and_hms(2024, 3, 2, 18, 30, 0).unwrap();
        let mut alert = Alert::new(
            HouseholdId::for_admin(member),
            "Boiler pressure low",
            "No hot water upstairs",
            member,
            at,
        );
        alert.priority = AlertPriority::Urgent;

        let table = format_alert_list(&[alert.clone()], &names);
        assert!(table.contains("Boiler pressure low"));
        assert!(table.contains("URGENT"));
        assert!(table.contains("2024-03-02 by Sam"));

        alert.set_status(AlertStatus::Resolved, member, at);
        let details = format_alert_details(&alert, &names);
        assert!(details.contains("Status:      resolved"));
        assert!(details.contains("Resolved:    2024-03-02 18:30 by Sam"));
        assert_eq!(format_alert_list(&[], &names), "No alerts.");
    }
}
