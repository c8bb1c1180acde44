//! Company-split analysis with quarterly trends and peer benchmarks.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use ledgeriq_core::{
    AnalyticsResult, CompanyId, CustomerId, FilterSpec, InvoiceStatus, Predicate,
    filter::quarter_key,
};
use ledgeriq_scoring::{CompanyMetricsInput, CompanyScores, ScoringConfig, company_scores};
use ledgeriq_store::LedgerStore;

use crate::util::{growth_pct, mean, months_between, pct, percentile, ratio};

/// One quarter of a company's revenue trend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyRevenue {
    pub quarter: String,
    pub revenue: f64,
    /// Quarter-over-quarter growth percentage; 0 for the first quarter.
    pub growth_rate: f64,
}

/// One company with its aggregates, trend and derived scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRow {
    pub company_id: CompanyId,
    pub name: String,
    pub total_revenue: f64,
    pub invoice_count: u64,
    pub paid_amount: f64,
    pub outstanding_amount: f64,
    pub payment_rate: f64,
    pub on_time_rate: f64,
    pub avg_payment_days: f64,
    pub distinct_customers: u64,
    pub revenue_per_customer: f64,
    pub years_in_business: f64,
    /// The four most recent calendar quarters, oldest first; quarters with
    /// no invoices are present with zero revenue.
    pub quarterly_revenue: Vec<QuarterlyRevenue>,
    pub scores: CompanyScores,
    /// Revenue standing against the other companies in the result.
    pub competitive_position: String,
}

/// Peer percentiles across the companies in the result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryBenchmarks {
    pub revenue_p25: f64,
    pub revenue_p50: f64,
    pub revenue_p75: f64,
    pub revenue_p90: f64,
    pub payment_rate_p50: f64,
    pub payment_rate_p90: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySplitSummary {
    pub total_companies: u64,
    pub total_revenue: f64,
    pub avg_payment_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySplit {
    pub companies: Vec<CompanyRow>,
    pub industry_benchmarks: IndustryBenchmarks,
    pub summary: CompanySplitSummary,
}

/// Split the ledger per company and derive scores and peer standings.
///
/// Contract: upstream query failures propagate.
pub async fn company_split(
    store: &dyn LedgerStore,
    filter: &FilterSpec,
    config: &ScoringConfig,
    today: NaiveDate,
) -> AnalyticsResult<CompanySplit> {
    let invoices = store
        .invoices(&Predicate::build(filter))
        .await
        .map_err(|e| e.context("company split"))?;
    let master: HashMap<CompanyId, (String, Option<NaiveDate>)> = store
        .companies()
        .await
        .map_err(|e| e.context("company split (master data)"))?
        .into_iter()
        .map(|c| (c.id, (c.name, c.established)))
        .collect();

    #[derive(Default)]
    struct Acc {
        revenue: f64,
        count: u64,
        paid_count: u64,
        paid_amount: f64,
        outstanding: f64,
        overdue_count: u64,
        on_time_count: u64,
        payment_days: Vec<f64>,
        customers: HashSet<CustomerId>,
        first_invoice: Option<NaiveDate>,
        by_quarter: BTreeMap<String, f64>,
    }

    let mut per_company: HashMap<CompanyId, Acc> = HashMap::new();
    for inv in &invoices {
        let acc = per_company.entry(inv.company_id).or_default();
        acc.revenue += inv.total_amount;
        acc.count += 1;
        acc.customers.insert(inv.customer_id);
        acc.first_invoice = Some(match acc.first_invoice {
            Some(d) => d.min(inv.invoice_date),
            None => inv.invoice_date,
        });
        *acc.by_quarter.entry(quarter_key(inv.invoice_date)).or_insert(0.0) +=
            inv.total_amount;

        match inv.status {
            InvoiceStatus::Paid => {
                acc.paid_count += 1;
                acc.paid_amount += inv.total_amount;
                if let Some(paid) = inv.paid_date {
                    acc.payment_days.push((paid - inv.invoice_date).num_days().max(0) as f64);
                    if paid <= inv.due_date {
                        acc.on_time_count += 1;
                    }
                }
            }
            InvoiceStatus::Pending => acc.outstanding += inv.total_amount,
            InvoiceStatus::Overdue => {
                acc.outstanding += inv.total_amount;
                acc.overdue_count += 1;
            }
            InvoiceStatus::Draft | InvoiceStatus::Cancelled => {}
        }
    }

    let quarters = trailing_quarter_keys(today);

    let mut rows: Vec<CompanyRow> = per_company
        .into_iter()
        .map(|(company_id, acc)| {
            let quarterly = quarterly_trend(&quarters, &acc.by_quarter);
            let latest_growth = quarterly.last().map(|q| q.growth_rate).unwrap_or(0.0);

            let payment_rate = pct(acc.paid_count as f64, acc.count as f64);
            let on_time_rate = pct(acc.on_time_count as f64, acc.paid_count as f64);
            let avg_payment_days = mean(&acc.payment_days);
            let active_months = acc
                .first_invoice
                .map(|first| months_between(first, today).max(1.0))
                .unwrap_or(1.0);

            let (name, established) = master
                .get(&company_id)
                .cloned()
                .unwrap_or_else(|| (company_id.to_string(), None));
            let years_in_business = established
                .map(|e| months_between(e, today) / 12.0)
                .unwrap_or(0.0);

            let input = CompanyMetricsInput {
                total_revenue: acc.revenue,
                payment_rate,
                on_time_rate,
                collection_rate: pct(acc.paid_amount, acc.revenue),
                overdue_rate: pct(acc.overdue_count as f64, acc.count as f64),
                avg_payment_days,
                invoices_per_month: acc.count as f64 / active_months,
                growth_rate: latest_growth,
                years_in_business,
            };

            CompanyRow {
                company_id,
                name,
                total_revenue: acc.revenue,
                invoice_count: acc.count,
                paid_amount: acc.paid_amount,
                outstanding_amount: acc.outstanding,
                payment_rate,
                on_time_rate,
                avg_payment_days,
                distinct_customers: acc.customers.len() as u64,
                revenue_per_customer: ratio(acc.revenue, acc.customers.len() as f64),
                years_in_business,
                quarterly_revenue: quarterly,
                scores: company_scores(&input, config),
                competitive_position: String::new(),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(core::cmp::Ordering::Equal)
    });

    let revenues: Vec<f64> = rows.iter().map(|r| r.total_revenue).collect();
    let rates: Vec<f64> = rows.iter().map(|r| r.payment_rate).collect();
    let benchmarks = IndustryBenchmarks {
        revenue_p25: percentile(&revenues, 25.0),
        revenue_p50: percentile(&revenues, 50.0),
        revenue_p75: percentile(&revenues, 75.0),
        revenue_p90: percentile(&revenues, 90.0),
        payment_rate_p50: percentile(&rates, 50.0),
        payment_rate_p90: percentile(&rates, 90.0),
    };
    for row in &mut rows {
        row.competitive_position =
            competitive_position(row.total_revenue, &benchmarks).to_string();
    }

    let summary = CompanySplitSummary {
        total_companies: rows.len() as u64,
        total_revenue: revenues.iter().sum(),
        avg_payment_rate: mean(&rates),
    };

    Ok(CompanySplit {
        companies: rows,
        industry_benchmarks: benchmarks,
        summary,
    })
}

/// The four most recent calendar quarters ending with `today`'s, ascending.
fn trailing_quarter_keys(today: NaiveDate) -> Vec<String> {
    let index = today.year() * 4 + today.month0() as i32 / 3;
    (0..4)
        .rev()
        .map(|offset| {
            let q = index - offset;
            format!("{:04}-Q{}", q.div_euclid(4), q.rem_euclid(4) + 1)
        })
        .collect()
}

fn quarterly_trend(quarters: &[String], by_quarter: &BTreeMap<String, f64>) -> Vec<QuarterlyRevenue> {
    let mut prev: Option<f64> = None;
    quarters
        .iter()
        .map(|quarter| {
            let revenue = by_quarter.get(quarter).copied().unwrap_or(0.0);
            let growth_rate = prev.map(|p| growth_pct(revenue, p)).unwrap_or(0.0);
            prev = Some(revenue);
            QuarterlyRevenue {
                quarter: quarter.clone(),
                revenue,
                growth_rate,
            }
        })
        .collect()
}

fn competitive_position(revenue: f64, benchmarks: &IndustryBenchmarks) -> &'static str {
    if revenue >= benchmarks.revenue_p90 {
        "Top 10%"
    } else if revenue >= benchmarks.revenue_p75 {
        "Top 25%"
    } else if revenue >= benchmarks.revenue_p50 {
        "Above Median"
    } else if revenue >= benchmarks.revenue_p25 {
        "Below Median"
    } else {
        "Bottom Quartile"
    }
}
