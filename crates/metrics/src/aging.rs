//! Receivables aging: due-date buckets, customer risk ranking and
//! collection trends.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ledgeriq_core::{
    AnalyticsResult, CustomerId, FilterSpec, Invoice, InvoiceStatus, Predicate,
    filter::month_key,
};
use ledgeriq_store::LedgerStore;

use crate::util::{mean, pct, trailing_month_keys};

/// Bucket labels by days past due. Unlike the status distribution's
/// invoice-age buckets these measure from the DUE date, with a separate
/// `current` bucket for not-yet-due receivables.
pub const DUE_BUCKETS: [&str; 5] = ["current", "0-30", "31-60", "61-90", "90+"];

/// Months of history in the collection trend block.
const TREND_MONTHS: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingBucketRow {
    pub bucket: String,
    pub amount: f64,
    pub invoices: u64,
    /// Share of total outstanding amount.
    pub percentage: f64,
}

/// One customer's outstanding position with a blended collection risk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAgingRow {
    pub customer_id: CustomerId,
    pub name: String,
    pub total_outstanding: f64,
    pub invoice_count: u64,
    /// Share of their outstanding sitting 61+ days past due.
    pub severe_share: f64,
    pub payment_history_pct: f64,
    pub avg_delay_days: f64,
    /// 0-100 blend of payment history, aging severity and delay.
    pub risk_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionTrendRow {
    pub month: String,
    pub invoiced: f64,
    pub collected: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingSummary {
    pub total_outstanding: f64,
    pub outstanding_invoices: u64,
    pub avg_days_past_due: f64,
    /// Share of outstanding amount 61+ days past due.
    pub severe_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingInsight {
    /// positive / warning / opportunity.
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingReport {
    pub aging_buckets: Vec<AgingBucketRow>,
    pub customer_aging: Vec<CustomerAgingRow>,
    pub collection_trends: Vec<CollectionTrendRow>,
    pub summary: AgingSummary,
    pub insights: Vec<AgingInsight>,
}

impl AgingReport {
    /// Well-shaped zero result with every bucket present. Doubles as the
    /// degraded shape when the query fails.
    pub fn empty() -> Self {
        Self {
            aging_buckets: DUE_BUCKETS
                .iter()
                .map(|b| AgingBucketRow {
                    bucket: b.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }
}

/// Aging report over the filtered ledger.
///
/// Returns `Err` on store failure; the engine degrades it to
/// `AgingReport::empty()`.
pub async fn invoice_aging_report(
    store: &dyn LedgerStore,
    filter: &FilterSpec,
    today: NaiveDate,
) -> AnalyticsResult<AgingReport> {
    let invoices = store
        .invoices(&Predicate::build(filter))
        .await
        .map_err(|e| e.context("aging report"))?;
    let names: HashMap<CustomerId, String> = store
        .customers()
        .await
        .map_err(|e| e.context("aging report (master data)"))?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let outstanding: Vec<&Invoice> = invoices.iter().filter(|i| i.is_outstanding()).collect();
    let total_outstanding: f64 = outstanding.iter().map(|i| i.total_amount).sum();

    let mut report = AgingReport::empty();
    for inv in &outstanding {
        let bucket = &mut report.aging_buckets[due_bucket_index(days_past_due(inv, today))];
        bucket.amount += inv.total_amount;
        bucket.invoices += 1;
    }
    for bucket in &mut report.aging_buckets {
        bucket.percentage = pct(bucket.amount, total_outstanding);
    }

    report.customer_aging = customer_aging(&invoices, &names, today);
    report.collection_trends = collection_trends(&invoices, today);

    let past_due: Vec<f64> = outstanding
        .iter()
        .map(|i| days_past_due(i, today).max(0) as f64)
        .collect();
    let severe_amount: f64 = report.aging_buckets[3].amount + report.aging_buckets[4].amount;
    report.summary = AgingSummary {
        total_outstanding,
        outstanding_invoices: outstanding.len() as u64,
        avg_days_past_due: mean(&past_due),
        severe_percentage: pct(severe_amount, total_outstanding),
    };

    report.insights = insights(&report);
    Ok(report)
}

/// Negative while not yet due.
fn days_past_due(invoice: &Invoice, today: NaiveDate) -> i64 {
    (today - invoice.due_date).num_days()
}

fn due_bucket_index(days_past_due: i64) -> usize {
    match days_past_due {
        i64::MIN..=0 => 0,
        1..=30 => 1,
        31..=60 => 2,
        61..=90 => 3,
        _ => 4,
    }
}

fn customer_aging(
    invoices: &[Invoice],
    names: &HashMap<CustomerId, String>,
    today: NaiveDate,
) -> Vec<CustomerAgingRow> {
    #[derive(Default)]
    struct Acc {
        outstanding: f64,
        outstanding_count: u64,
        severe_amount: f64,
        total_count: u64,
        paid_count: u64,
        delays: Vec<f64>,
    }

    let mut per_customer: HashMap<CustomerId, Acc> = HashMap::new();
    for inv in invoices {
        let acc = per_customer.entry(inv.customer_id).or_default();
        acc.total_count += 1;
        match inv.status {
            InvoiceStatus::Paid => {
                acc.paid_count += 1;
                acc.delays.push(inv.delay_days(today) as f64);
            }
            InvoiceStatus::Pending | InvoiceStatus::Overdue => {
                acc.outstanding += inv.total_amount;
                acc.outstanding_count += 1;
                if days_past_due(inv, today) > 60 {
                    acc.severe_amount += inv.total_amount;
                }
                acc.delays.push(inv.delay_days(today) as f64);
            }
            InvoiceStatus::Draft | InvoiceStatus::Cancelled => {}
        }
    }

    let mut rows: Vec<CustomerAgingRow> = per_customer
        .into_iter()
        .filter(|(_, acc)| acc.outstanding > 0.0)
        .map(|(customer_id, acc)| {
            let payment_history_pct = pct(acc.paid_count as f64, acc.total_count as f64);
            let severe_share = pct(acc.severe_amount, acc.outstanding);
            let avg_delay_days = mean(&acc.delays);
            let risk_score = ((100.0 - payment_history_pct) * 0.4
                + severe_share * 0.4
                + (avg_delay_days * 2.0).min(100.0) * 0.2)
                .clamp(0.0, 100.0);

            CustomerAgingRow {
                customer_id,
                name: names
                    .get(&customer_id)
                    .cloned()
                    .unwrap_or_else(|| customer_id.to_string()),
                total_outstanding: acc.outstanding,
                invoice_count: acc.outstanding_count,
                severe_share,
                payment_history_pct,
                avg_delay_days,
                risk_score,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(core::cmp::Ordering::Equal)
            .then_with(|| {
                b.total_outstanding
                    .partial_cmp(&a.total_outstanding)
                    .unwrap_or(core::cmp::Ordering::Equal)
            })
    });
    rows
}

/// Invoiced vs. collected per month over the trailing window. Collections
/// land in the month of the payment date, not the invoice date.
fn collection_trends(invoices: &[Invoice], today: NaiveDate) -> Vec<CollectionTrendRow> {
    let months = trailing_month_keys(today, TREND_MONTHS);

    let mut invoiced: HashMap<&str, f64> = HashMap::new();
    let mut collected: HashMap<&str, f64> = HashMap::new();
    for inv in invoices {
        if matches!(inv.status, InvoiceStatus::Draft | InvoiceStatus::Cancelled) {
            continue;
        }
        let inv_month = month_key(inv.invoice_date);
        if let Some(key) = months.iter().find(|m| **m == inv_month) {
            *invoiced.entry(key).or_insert(0.0) += inv.total_amount;
        }
        if let Some(paid) = inv.paid_date {
            let paid_month = month_key(paid);
            if let Some(key) = months.iter().find(|m| **m == paid_month) {
                *collected.entry(key).or_insert(0.0) += inv.total_amount;
            }
        }
    }

    months
        .iter()
        .map(|month| {
            let invoiced = invoiced.get(month.as_str()).copied().unwrap_or(0.0);
            let collected = collected.get(month.as_str()).copied().unwrap_or(0.0);
            CollectionTrendRow {
                month: month.clone(),
                invoiced,
                collected,
                efficiency: pct(collected, invoiced),
            }
        })
        .collect()
}

fn insights(report: &AgingReport) -> Vec<AgingInsight> {
    let mut out = Vec::new();
    let summary = &report.summary;

    if summary.total_outstanding <= 0.0 {
        out.push(AgingInsight {
            kind: "positive".to_string(),
            message: "No outstanding receivables".to_string(),
        });
        return out;
    }

    if summary.severe_percentage > 25.0 {
        out.push(AgingInsight {
            kind: "warning".to_string(),
            message: format!(
                "{:.0}% of outstanding receivables are more than 60 days past due",
                summary.severe_percentage
            ),
        });
    } else if summary.severe_percentage < 5.0 {
        out.push(AgingInsight {
            kind: "positive".to_string(),
            message: "Receivables aging is concentrated in recent buckets".to_string(),
        });
    }

    let current_share = report.aging_buckets[0].percentage;
    if current_share > 50.0 {
        out.push(AgingInsight {
            kind: "positive".to_string(),
            message: format!("{current_share:.0}% of outstanding amount is not yet due"),
        });
    }

    if let Some(top) = report.customer_aging.first() {
        if top.risk_score > 60.0 {
            out.push(AgingInsight {
                kind: "opportunity".to_string(),
                message: format!(
                    "Prioritize collections with {}: {:.0} outstanding at risk score {:.0}",
                    top.name, top.total_outstanding, top.risk_score
                ),
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{customer, d, invoice, invoice_for};
    use ledgeriq_core::CompanyId;
    use ledgeriq_store::InMemoryLedgerStore;

    #[tokio::test]
    async fn buckets_measure_from_due_date() {
        let today = d(2024, 4, 1);
        let store = InMemoryLedgerStore::new().with_invoices([
            // Due Apr 20: not yet due.
            invoice(d(2024, 3, 21), InvoiceStatus::Pending, 100.0),
            // Due Mar 12: 20 days past due.
            invoice(d(2024, 2, 11), InvoiceStatus::Overdue, 200.0),
            // Due Nov 30 2023: 123 days past due.
            invoice(d(2023, 10, 31), InvoiceStatus::Overdue, 700.0),
            // Paid invoices never age.
            invoice(d(2023, 10, 1), InvoiceStatus::Paid, 1_000.0),
        ]);

        let got = invoice_aging_report(&store, &FilterSpec::default(), today)
            .await
            .unwrap();

        assert_eq!(got.aging_buckets.len(), 5);
        assert_eq!(got.aging_buckets[0].amount, 100.0); // current
        assert_eq!(got.aging_buckets[1].amount, 200.0); // 0-30
        assert_eq!(got.aging_buckets[4].amount, 700.0); // 90+
        assert_eq!(got.summary.total_outstanding, 1_000.0);
        assert_eq!(got.summary.outstanding_invoices, 3);
        assert_eq!(got.aging_buckets[4].percentage, 70.0);
        assert_eq!(got.summary.severe_percentage, 70.0);
    }

    #[tokio::test]
    async fn customer_risk_ranks_worst_first() {
        let today = d(2024, 4, 1);
        let company = CompanyId::new();
        let good = CustomerId::new();
        let bad = CustomerId::new();

        let store = InMemoryLedgerStore::new()
            .with_customers([customer(good, "Good Co"), customer(bad, "Bad Co")])
            .with_invoices([
                // Good: mostly paid, one barely-late pending invoice.
                invoice_for(good, company, d(2024, 1, 5), InvoiceStatus::Paid, 500.0),
                invoice_for(good, company, d(2024, 2, 5), InvoiceStatus::Paid, 500.0),
                invoice_for(good, company, d(2024, 3, 20), InvoiceStatus::Pending, 100.0),
                // Bad: everything overdue for months.
                invoice_for(bad, company, d(2023, 11, 1), InvoiceStatus::Overdue, 800.0),
                invoice_for(bad, company, d(2023, 12, 1), InvoiceStatus::Overdue, 800.0),
            ]);

        let got = invoice_aging_report(&store, &FilterSpec::default(), today)
            .await
            .unwrap();

        assert_eq!(got.customer_aging.len(), 2);
        assert_eq!(got.customer_aging[0].name, "Bad Co");
        assert!(got.customer_aging[0].risk_score > got.customer_aging[1].risk_score);
        assert_eq!(got.customer_aging[0].payment_history_pct, 0.0);
        assert_eq!(got.customer_aging[0].severe_share, 100.0);
        assert_eq!(got.customer_aging[1].payment_history_pct, 2.0 / 3.0 * 100.0);
    }

    #[tokio::test]
    async fn collection_trends_cover_six_months() {
        let today = d(2024, 3, 15);
        let store = InMemoryLedgerStore::new().with_invoices([
            // Invoiced Feb, paid Feb (fixture pays +15d).
            invoice(d(2024, 2, 1), InvoiceStatus::Paid, 1_000.0),
            invoice(d(2024, 3, 1), InvoiceStatus::Pending, 500.0),
        ]);

        let got = invoice_aging_report(&store, &FilterSpec::default(), today)
            .await
            .unwrap();

        assert_eq!(got.collection_trends.len(), 6);
        assert_eq!(got.collection_trends[5].month, "2024-03");
        let feb = &got.collection_trends[4];
        assert_eq!(feb.month, "2024-02");
        assert_eq!(feb.invoiced, 1_000.0);
        assert_eq!(feb.collected, 1_000.0);
        assert_eq!(feb.efficiency, 100.0);
        assert_eq!(got.collection_trends[5].collected, 0.0);
    }

    #[tokio::test]
    async fn empty_ledger_reads_positive() {
        let store = InMemoryLedgerStore::new();
        let got = invoice_aging_report(&store, &FilterSpec::default(), d(2024, 1, 1))
            .await
            .unwrap();
        assert_eq!(got.aging_buckets.len(), 5);
        assert!(got.customer_aging.is_empty());
        assert_eq!(got.insights[0].kind, "positive");
    }
}
