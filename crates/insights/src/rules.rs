//! The six alert rule families and the pipeline runner.

use chrono::{Datelike, NaiveDate};

use ledgeriq_core::AnalyticsResult;
use ledgeriq_metrics::{
    AgingReport, CustomerRow, DelayAnalysis, SummaryMetrics, TopItems,
};
use ledgeriq_scoring::Benchmarks;

use crate::alert::{Alert, Priority, Severity};

/// Pre-fetched metric snapshot the rules evaluate against. The engine
/// assembles it once per request; rules never touch the store directly.
#[derive(Debug, Clone, Default)]
pub struct AlertContext {
    pub summary: SummaryMetrics,
    /// Summary over the prior equal-length window, when one exists.
    pub prior_summary: Option<SummaryMetrics>,
    pub aging: AgingReport,
    pub customers: Vec<CustomerRow>,
    pub items: TopItems,
    pub delays: DelayAnalysis,
    pub benchmarks: Benchmarks,
    pub today: NaiveDate,
}

/// One independent rule family. Evaluation is infallible in the common
/// case; the `Result` exists so a rule with a bad input can fail alone.
pub trait AlertRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &AlertContext) -> AnalyticsResult<Vec<Alert>>;
}

/// The fixed rule set, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn AlertRule>> {
    vec![
        Box::new(CashFlowRiskRule),
        Box::new(CustomerRiskRule),
        Box::new(AgingRule),
        Box::new(RevenueOpportunityRule),
        Box::new(TaxComplianceRule),
        Box::new(PerformanceAchievementRule),
    ]
}

/// Run every rule, isolating failures: a failing rule is logged and its
/// alerts omitted, the remaining rules still run.
pub fn run_rules(rules: &[Box<dyn AlertRule>], ctx: &AlertContext) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for rule in rules {
        match rule.evaluate(ctx) {
            Ok(mut produced) => alerts.append(&mut produced),
            Err(err) => {
                tracing::warn!(rule = rule.name(), %err, "alert rule failed; omitting its alerts");
            }
        }
    }
    alerts
}

fn bucket_amount(aging: &AgingReport, bucket: &str) -> f64 {
    aging
        .aging_buckets
        .iter()
        .find(|b| b.bucket == bucket)
        .map(|b| b.amount)
        .unwrap_or(0.0)
}

/// Total outstanding against the worst aging bucket.
pub struct CashFlowRiskRule;

impl AlertRule for CashFlowRiskRule {
    fn name(&self) -> &'static str {
        "cash-flow-risk"
    }

    fn evaluate(&self, ctx: &AlertContext) -> AnalyticsResult<Vec<Alert>> {
        let total = ctx.aging.summary.total_outstanding;
        let severe = bucket_amount(&ctx.aging, "90+");

        let mut alerts = Vec::new();
        if total > 1_000_000.0 && severe > 500_000.0 {
            alerts.push(
                Alert::new(
                    self.name(),
                    Severity::Critical,
                    Priority::Critical,
                    format!(
                        "Cash flow at risk: {total:.0} outstanding with {severe:.0} more than 90 days past due"
                    ),
                )
                .with_metrics(["aging.summary.totalOutstanding", "aging.buckets.90+"])
                .with_actions(["Escalate 90+ accounts to collections", "Pause credit for repeat offenders"]),
            );
        } else if total > 500_000.0 || severe > 100_000.0 {
            alerts.push(
                Alert::new(
                    self.name(),
                    Severity::Warning,
                    Priority::High,
                    format!("Outstanding receivables building up: {total:.0} total, {severe:.0} past 90 days"),
                )
                .with_metrics(["aging.summary.totalOutstanding"])
                .with_actions(["Review the aging report"]),
            );
        }
        Ok(alerts)
    }
}

/// Individual customers with dangerous overdue exposure.
pub struct CustomerRiskRule;

impl AlertRule for CustomerRiskRule {
    fn name(&self) -> &'static str {
        "customer-risk"
    }

    fn evaluate(&self, ctx: &AlertContext) -> AnalyticsResult<Vec<Alert>> {
        let mut alerts = Vec::new();

        for customer in ctx.customers.iter().filter(|c| c.overdue_amount > 100_000.0) {
            alerts.push(
                Alert::new(
                    self.name(),
                    Severity::Critical,
                    Priority::Urgent,
                    format!(
                        "{} has {:.0} overdue across {} invoice(s)",
                        customer.name, customer.overdue_amount, customer.overdue_count
                    ),
                )
                .with_metrics(["customers.overdueAmount"])
                .with_actions(["Contact the account owner", "Hold further deliveries"]),
            );
        }

        let avg_delay = ctx.delays.summary_metrics.avg_delay;
        if avg_delay > 60.0 {
            alerts.push(
                Alert::new(
                    self.name(),
                    Severity::Warning,
                    Priority::High,
                    format!("Average payment delay has reached {avg_delay:.0} days"),
                )
                .with_metrics(["delays.summaryMetrics.avgDelay"]),
            );
        }
        Ok(alerts)
    }
}

/// Absolute-amount thresholds on the late aging buckets.
pub struct AgingRule;

impl AlertRule for AgingRule {
    fn name(&self) -> &'static str {
        "aging"
    }

    fn evaluate(&self, ctx: &AlertContext) -> AnalyticsResult<Vec<Alert>> {
        let mut alerts = Vec::new();

        let severe = bucket_amount(&ctx.aging, "90+");
        if severe > 250_000.0 {
            alerts.push(
                Alert::new(
                    self.name(),
                    Severity::Warning,
                    Priority::High,
                    format!("{severe:.0} in receivables is more than 90 days past due"),
                )
                .with_metrics(["aging.buckets.90+"])
                .with_actions(["Consider write-off review for the oldest invoices"]),
            );
        }

        let late = bucket_amount(&ctx.aging, "61-90");
        if late > 150_000.0 {
            alerts.push(
                Alert::new(
                    self.name(),
                    Severity::Warning,
                    Priority::Medium,
                    format!("{late:.0} in receivables is 61-90 days past due"),
                )
                .with_metrics(["aging.buckets.61-90"]),
            );
        }
        Ok(alerts)
    }
}

/// Upside signals: strong customers worth expanding and high-margin items
/// worth promoting.
pub struct RevenueOpportunityRule;

impl AlertRule for RevenueOpportunityRule {
    fn name(&self) -> &'static str {
        "revenue-opportunity"
    }

    fn evaluate(&self, ctx: &AlertContext) -> AnalyticsResult<Vec<Alert>> {
        let mut alerts = Vec::new();

        let strong: Vec<&str> = ctx
            .customers
            .iter()
            .filter(|c| (c.tier == "Premium" || c.tier == "Gold") && c.payment_rate >= 80.0)
            .map(|c| c.name.as_str())
            .take(3)
            .collect();
        if !strong.is_empty() {
            alerts.push(
                Alert::new(
                    self.name(),
                    Severity::Opportunity,
                    Priority::Medium,
                    format!(
                        "{} reliable high-tier customer(s) may absorb expanded volume: {}",
                        strong.len(),
                        strong.join(", ")
                    ),
                )
                .with_confidence("Medium")
                .with_metrics(["customers.tier", "customers.paymentRate"])
                .with_actions(["Offer volume pricing to listed accounts"]),
            );
        }

        let hot_items: Vec<&str> = ctx
            .items
            .items
            .iter()
            .filter(|i| i.margin_pct > 40.0 && i.performance_score >= 70.0)
            .map(|i| i.name.as_str())
            .take(3)
            .collect();
        if !hot_items.is_empty() {
            alerts.push(
                Alert::new(
                    self.name(),
                    Severity::Opportunity,
                    Priority::Medium,
                    format!("High-margin items performing well: {}", hot_items.join(", ")),
                )
                .with_confidence("Medium")
                .with_metrics(["items.marginPct", "items.performanceScore"]),
            );
        }
        Ok(alerts)
    }
}

/// Imminent filing-deadline window.
pub struct TaxComplianceRule;

impl AlertRule for TaxComplianceRule {
    fn name(&self) -> &'static str {
        "tax-compliance"
    }

    fn evaluate(&self, ctx: &AlertContext) -> AnalyticsResult<Vec<Alert>> {
        let cutoff = ctx.benchmarks.filing_cutoff_day;
        let day = ctx.today.day();
        let mut alerts = Vec::new();

        if day <= cutoff {
            let remaining = (cutoff - day) as i64;
            if remaining <= ctx.benchmarks.filing_warning_days {
                let message = if remaining == 0 {
                    "Tax filing is due today".to_string()
                } else {
                    format!("Tax filing due in {remaining} day(s), on the {cutoff}th")
                };
                alerts.push(
                    Alert::new(self.name(), Severity::Warning, Priority::High, message)
                        .with_actions(["Reconcile the monthly tax report before filing"]),
                );
            }
        }
        Ok(alerts)
    }
}

/// Milestones and month-over-month improvements worth celebrating.
pub struct PerformanceAchievementRule;

impl AlertRule for PerformanceAchievementRule {
    fn name(&self) -> &'static str {
        "performance-achievement"
    }

    fn evaluate(&self, ctx: &AlertContext) -> AnalyticsResult<Vec<Alert>> {
        let mut alerts = Vec::new();

        if let Some(prior) = &ctx.prior_summary {
            let gain = ctx.summary.collection_efficiency - prior.collection_efficiency;
            if gain >= 5.0 {
                alerts.push(
                    Alert::new(
                        self.name(),
                        Severity::Success,
                        Priority::Low,
                        format!("Collection efficiency improved {gain:.0} points over the prior period"),
                    )
                    .with_metrics(["summary.collectionEfficiency"]),
                );
            }
        }

        if ctx.summary.total_revenue > 1_000_000.0 {
            alerts.push(
                Alert::new(
                    self.name(),
                    Severity::Success,
                    Priority::Low,
                    format!("Revenue milestone reached: {:.0} in the selected window", ctx.summary.total_revenue),
                )
                .with_metrics(["summary.totalRevenue"]),
            );
        }
        Ok(alerts)
    }
}
