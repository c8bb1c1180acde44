//! Alert shapes. Alerts are constructed fresh per request and never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Alert class, carried for consumer styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Opportunity,
    Success,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Opportunity => "opportunity",
            Severity::Success => "success",
        }
    }
}

/// Sort rank across the merged feed. Variant order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    Urgent,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    /// Which rule family produced this alert.
    pub category: String,
    pub severity: Severity,
    pub priority: Priority,
    /// High / Medium / Low trust in the underlying signal.
    pub confidence: String,
    pub message: String,
    pub related_metrics: Vec<String>,
    /// Suggested follow-ups, free-form.
    pub actions: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        category: &str,
        severity: Severity,
        priority: Priority,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            category: category.to_string(),
            severity,
            priority,
            confidence: "High".to_string(),
            message: message.into(),
            related_metrics: Vec::new(),
            actions: Vec::new(),
            status: "active".to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn with_confidence(mut self, confidence: &str) -> Self {
        self.confidence = confidence.to_string();
        self
    }

    pub fn with_metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }
}

/// Per-class counts for the feed header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub total: u64,
    pub critical: u64,
    pub warning: u64,
    pub opportunity: u64,
    pub success: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertFeed {
    pub alerts: Vec<Alert>,
    pub summary: AlertSummary,
}

impl AlertFeed {
    /// Sorted feed plus per-class counts.
    pub fn from_alerts(mut alerts: Vec<Alert>) -> Self {
        alerts.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let mut summary = AlertSummary {
            total: alerts.len() as u64,
            ..Default::default()
        };
        for alert in &alerts {
            match alert.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Opportunity => summary.opportunity += 1,
                Severity::Success => summary.success += 1,
            }
        }

        Self { alerts, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_sorts_by_priority_then_recency() {
        let old_critical = Alert::new("cashflow", Severity::Critical, Priority::Critical, "a");
        let low = Alert::new("opportunity", Severity::Opportunity, Priority::Low, "b");
        let newer_critical = Alert {
            created_at: old_critical.created_at + chrono::Duration::seconds(5),
            ..Alert::new("customer", Severity::Critical, Priority::Critical, "c")
        };

        let feed = AlertFeed::from_alerts(vec![low, old_critical, newer_critical]);
        assert_eq!(feed.alerts[0].message, "c");
        assert_eq!(feed.alerts[1].message, "a");
        assert_eq!(feed.alerts[2].message, "b");
        assert_eq!(feed.summary.total, 3);
        assert_eq!(feed.summary.critical, 2);
        assert_eq!(feed.summary.opportunity, 1);
    }

    #[test]
    fn priority_order_matches_declaration() {
        assert!(Priority::Critical < Priority::Urgent);
        assert!(Priority::Urgent < Priority::High);
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
    }

    #[test]
    fn alert_serializes_camel_case() {
        let alert = Alert::new("aging", Severity::Warning, Priority::High, "m")
            .with_metrics(["aging.summary.totalOutstanding"])
            .with_actions(["Review collections queue"]);
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["priority"], "high");
        assert!(json["createdAt"].is_string());
        assert_eq!(json["relatedMetrics"][0], "aging.summary.totalOutstanding");
    }
}
