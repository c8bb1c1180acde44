//! Payment delay analysis: monthly punctuality trends and per-customer
//! payment behavior.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ledgeriq_core::{
    AnalyticsResult, CustomerId, FilterSpec, Invoice, InvoiceStatus, Predicate,
    filter::month_key,
};
use ledgeriq_scoring::ScoringConfig;
use ledgeriq_store::LedgerStore;

use crate::util::{mean, pct, trailing_month_keys};

/// Months of history in the monthly trend block.
const TREND_MONTHS: usize = 12;
/// Days past due beyond which a payment counts as very late.
const VERY_LATE_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDelayRow {
    pub month: String,
    pub invoice_count: u64,
    pub avg_delay: f64,
    pub on_time_pct: f64,
    pub late_pct: f64,
    pub very_late_pct: f64,
}

/// One customer's payment punctuality profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBehaviorRow {
    pub customer_id: CustomerId,
    pub name: String,
    pub paid_invoices: u64,
    pub avg_delay: f64,
    pub on_time_pct: f64,
    /// Improving / Stable / Deteriorating by average delay band.
    pub classification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayOpportunity {
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelaySummary {
    pub avg_delay: f64,
    pub on_time_pct: f64,
    pub very_late_pct: f64,
    pub standard_target_days: f64,
    pub industry_benchmark_days: f64,
    /// Positive when slower than the industry benchmark.
    pub vs_benchmark: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayAnalysis {
    pub monthly_trends: Vec<MonthlyDelayRow>,
    pub customer_behavior: Vec<CustomerBehaviorRow>,
    pub optimization_opportunities: Vec<DelayOpportunity>,
    pub summary_metrics: DelaySummary,
    pub insights: Vec<String>,
}

impl DelayAnalysis {
    /// Degraded shape when the query fails: all twelve trend months are
    /// still present so charts keep their axis.
    pub fn empty(config: &ScoringConfig, today: NaiveDate) -> Self {
        Self {
            monthly_trends: trailing_month_keys(today, TREND_MONTHS)
                .into_iter()
                .map(|month| MonthlyDelayRow {
                    month,
                    ..Default::default()
                })
                .collect(),
            summary_metrics: DelaySummary {
                standard_target_days: config.benchmarks.standard_payment_days,
                industry_benchmark_days: config.benchmarks.industry_delay_days,
                vs_benchmark: -config.benchmarks.industry_delay_days,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Delay analysis over paid invoices in the filtered ledger.
///
/// Delay is measured against the due date; settlement month (the paid date)
/// decides which trend bucket a payment lands in. Returns `Err` on store
/// failure; the engine degrades it to `DelayAnalysis::empty()`.
pub async fn payment_delay_analysis(
    store: &dyn LedgerStore,
    filter: &FilterSpec,
    config: &ScoringConfig,
    today: NaiveDate,
) -> AnalyticsResult<DelayAnalysis> {
    let invoices = store
        .invoices(&Predicate::build(filter))
        .await
        .map_err(|e| e.context("delay analysis"))?;
    let names: HashMap<CustomerId, String> = store
        .customers()
        .await
        .map_err(|e| e.context("delay analysis (master data)"))?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let paid: Vec<&Invoice> = invoices
        .iter()
        .filter(|i| i.status == InvoiceStatus::Paid && i.paid_date.is_some())
        .collect();

    let mut analysis = DelayAnalysis::empty(config, today);
    analysis.monthly_trends = monthly_trends(&paid, today);
    analysis.customer_behavior = customer_behavior(&paid, &names, today);

    let delays: Vec<f64> = paid.iter().map(|i| i.delay_days(today) as f64).collect();
    let on_time = paid.iter().filter(|i| i.delay_days(today) <= 0).count();
    let very_late = paid
        .iter()
        .filter(|i| i.delay_days(today) > VERY_LATE_DAYS)
        .count();

    let avg_delay = mean(&delays);
    let on_time_pct = pct(on_time as f64, paid.len() as f64);
    let very_late_pct = pct(very_late as f64, paid.len() as f64);
    analysis.summary_metrics = DelaySummary {
        avg_delay,
        on_time_pct,
        very_late_pct,
        standard_target_days: config.benchmarks.standard_payment_days,
        industry_benchmark_days: config.benchmarks.industry_delay_days,
        vs_benchmark: avg_delay - config.benchmarks.industry_delay_days,
    };

    analysis.optimization_opportunities = opportunities(&analysis.summary_metrics);
    analysis.insights = insights(&analysis.summary_metrics, paid.len());
    Ok(analysis)
}

fn monthly_trends(paid: &[&Invoice], today: NaiveDate) -> Vec<MonthlyDelayRow> {
    #[derive(Default)]
    struct Acc {
        delays: Vec<f64>,
        on_time: u64,
        late: u64,
        very_late: u64,
    }

    let months = trailing_month_keys(today, TREND_MONTHS);
    let mut by_month: HashMap<&str, Acc> = HashMap::new();
    for inv in paid {
        let Some(settled) = inv.paid_date else { continue };
        let settled_month = month_key(settled);
        let Some(key) = months.iter().find(|m| **m == settled_month) else {
            continue;
        };
        let acc = by_month.entry(key).or_default();
        let delay = inv.delay_days(today);
        acc.delays.push(delay as f64);
        match delay {
            d if d <= 0 => acc.on_time += 1,
            d if d <= VERY_LATE_DAYS => acc.late += 1,
            _ => acc.very_late += 1,
        }
    }

    months
        .iter()
        .map(|month| {
            let acc = by_month.remove(month.as_str()).unwrap_or_default();
            let count = acc.delays.len() as u64;
            MonthlyDelayRow {
                month: month.clone(),
                invoice_count: count,
                avg_delay: mean(&acc.delays),
                on_time_pct: pct(acc.on_time as f64, count as f64),
                late_pct: pct(acc.late as f64, count as f64),
                very_late_pct: pct(acc.very_late as f64, count as f64),
            }
        })
        .collect()
}

fn customer_behavior(
    paid: &[&Invoice],
    names: &HashMap<CustomerId, String>,
    today: NaiveDate,
) -> Vec<CustomerBehaviorRow> {
    let mut per_customer: HashMap<CustomerId, Vec<f64>> = HashMap::new();
    for inv in paid {
        per_customer
            .entry(inv.customer_id)
            .or_default()
            .push(inv.delay_days(today) as f64);
    }

    let mut rows: Vec<CustomerBehaviorRow> = per_customer
        .into_iter()
        .map(|(customer_id, delays)| {
            let avg_delay = mean(&delays);
            let on_time = delays.iter().filter(|d| **d <= 0.0).count();
            CustomerBehaviorRow {
                customer_id,
                name: names
                    .get(&customer_id)
                    .cloned()
                    .unwrap_or_else(|| customer_id.to_string()),
                paid_invoices: delays.len() as u64,
                avg_delay,
                on_time_pct: pct(on_time as f64, delays.len() as f64),
                classification: classify(avg_delay).to_string(),
            }
        })
        .collect();

    // Worst payers first.
    rows.sort_by(|a, b| {
        b.avg_delay
            .partial_cmp(&a.avg_delay)
            .unwrap_or(core::cmp::Ordering::Equal)
    });
    rows
}

fn classify(avg_delay: f64) -> &'static str {
    if avg_delay <= 20.0 {
        "Improving"
    } else if avg_delay <= 40.0 {
        "Stable"
    } else {
        "Deteriorating"
    }
}

fn opportunities(summary: &DelaySummary) -> Vec<DelayOpportunity> {
    let mut out = Vec::new();
    if summary.avg_delay > summary.standard_target_days {
        out.push(DelayOpportunity {
            category: "Payment terms".to_string(),
            description: format!(
                "Average delay of {:.0} days exceeds the {:.0}-day target; consider shorter terms or early-payment discounts",
                summary.avg_delay, summary.standard_target_days
            ),
        });
    }
    if summary.on_time_pct < 70.0 {
        out.push(DelayOpportunity {
            category: "Reminder automation".to_string(),
            description: format!(
                "Only {:.0}% of payments arrive on time; automated due-date reminders usually lift this",
                summary.on_time_pct
            ),
        });
    }
    if summary.very_late_pct > 20.0 {
        out.push(DelayOpportunity {
            category: "Collections escalation".to_string(),
            description: format!(
                "{:.0}% of payments arrive more than {VERY_LATE_DAYS} days late; escalate these accounts to active collections",
                summary.very_late_pct
            ),
        });
    }
    out
}

fn insights(summary: &DelaySummary, paid_count: usize) -> Vec<String> {
    if paid_count == 0 {
        return vec!["No settled invoices in the selected window".to_string()];
    }
    let mut out = Vec::new();
    if summary.vs_benchmark <= 0.0 {
        out.push(format!(
            "Collections run {:.0} days faster than the industry benchmark",
            -summary.vs_benchmark
        ));
    } else {
        out.push(format!(
            "Collections run {:.0} days slower than the industry benchmark",
            summary.vs_benchmark
        ));
    }
    if summary.on_time_pct >= 90.0 {
        out.push("Payment punctuality is excellent".to_string());
    }
    out
}
