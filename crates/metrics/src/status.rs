//! Invoice status distribution with aging cross-tab.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ledgeriq_core::{AnalyticsResult, FilterSpec, Invoice, InvoiceStatus, Predicate};
use ledgeriq_store::LedgerStore;

use crate::util::{mean, pct, ratio};

/// Invoice-age buckets measured from the invoice date (the aging *report*
/// buckets from the due date instead, see `aging.rs`).
pub const AGE_BUCKETS: [&str; 4] = ["0-30", "31-60", "61-90", "90+"];

/// Per-status distribution row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRow {
    pub status: String,
    pub count: u64,
    pub total_amount: f64,
    pub avg_amount: f64,
    /// Age formula depends on the status: paid → paidDate − invoiceDate,
    /// pending → today − invoiceDate, overdue → today − dueDate.
    pub avg_age_days: f64,
    pub percentage: f64,
    /// Direction vs. the prior equal-length window: up / down / stable.
    pub trend: String,
    /// Qualitative collection-risk tag.
    pub risk: String,
}

/// One invoice-age bucket, cross-tabulated by status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBucketRow {
    pub bucket: String,
    pub invoices: u64,
    pub amount: f64,
    pub by_status: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    /// Days Sales Outstanding: average days from invoicing to collection.
    pub dso: f64,
    pub collection_rate: f64,
    pub overdue_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDistribution {
    pub status_data: Vec<StatusRow>,
    pub aging_data: Vec<AgeBucketRow>,
    pub summary: StatusSummary,
}

impl StatusDistribution {
    /// Well-shaped zero result: every status row and every age bucket is
    /// present. Doubles as the degraded shape when the query fails.
    pub fn empty() -> Self {
        Self {
            status_data: InvoiceStatus::ALL
                .iter()
                .map(|s| StatusRow {
                    status: s.as_str().to_string(),
                    trend: "stable".to_string(),
                    risk: risk_tag(*s, 0.0).to_string(),
                    ..Default::default()
                })
                .collect(),
            aging_data: AGE_BUCKETS
                .iter()
                .map(|b| AgeBucketRow {
                    bucket: b.to_string(),
                    ..Default::default()
                })
                .collect(),
            summary: StatusSummary::default(),
        }
    }
}

impl Default for StatusDistribution {
    fn default() -> Self {
        Self::empty()
    }
}

/// Status distribution, aging cross-tab and DSO/collection summary.
///
/// Returns `Err` on store failure; the engine degrades it to
/// `StatusDistribution::empty()` so dependent UI never crashes.
pub async fn invoice_status_distribution(
    store: &dyn LedgerStore,
    filter: &FilterSpec,
    today: NaiveDate,
) -> AnalyticsResult<StatusDistribution> {
    let invoices = store
        .invoices(&Predicate::build(filter))
        .await
        .map_err(|e| e.context("status distribution"))?;

    // Prior equal-length window for the trend column; open-ended filters
    // have no comparable window and read as stable.
    let prior_counts: BTreeMap<InvoiceStatus, u64> = match filter.prior_window() {
        Some(prior) => {
            let rows = store
                .invoices(&Predicate::build(&prior))
                .await
                .map_err(|e| e.context("status distribution (prior window)"))?;
            count_by_status(&rows)
        }
        None => BTreeMap::new(),
    };

    let total = invoices.len() as u64;
    let mut result = StatusDistribution::empty();

    result.status_data = InvoiceStatus::ALL
        .iter()
        .map(|&status| {
            let of_status: Vec<&Invoice> =
                invoices.iter().filter(|i| i.status == status).collect();

            let count = of_status.len() as u64;
            let amount: f64 = of_status.iter().map(|i| i.total_amount).sum();
            let ages: Vec<f64> = of_status
                .iter()
                .filter_map(|i| age_days(i, status, today))
                .collect();
            let avg_age = mean(&ages);

            StatusRow {
                status: status.as_str().to_string(),
                count,
                total_amount: amount,
                avg_amount: ratio(amount, count as f64),
                avg_age_days: avg_age,
                percentage: pct(count as f64, total as f64),
                trend: trend(count, prior_counts.get(&status).copied(), filter).to_string(),
                risk: risk_tag(status, avg_age).to_string(),
            }
        })
        .collect();

    for inv in &invoices {
        let age = (today - inv.invoice_date).num_days();
        let bucket = &mut result.aging_data[age_bucket_index(age)];
        bucket.invoices += 1;
        bucket.amount += inv.total_amount;
        *bucket
            .by_status
            .entry(inv.status.as_str().to_string())
            .or_insert(0) += 1;
    }

    let payment_days: Vec<f64> = invoices
        .iter()
        .filter(|i| i.status == InvoiceStatus::Paid)
        .filter_map(|i| i.payment_days().map(|d| d as f64))
        .collect();
    let paid = invoices.iter().filter(|i| i.status == InvoiceStatus::Paid).count() as f64;
    let overdue = invoices.iter().filter(|i| i.status == InvoiceStatus::Overdue).count() as f64;

    result.summary = StatusSummary {
        dso: mean(&payment_days),
        collection_rate: pct(paid, total as f64),
        overdue_percentage: pct(overdue, total as f64),
    };

    Ok(result)
}

fn count_by_status(invoices: &[Invoice]) -> BTreeMap<InvoiceStatus, u64> {
    let mut counts = BTreeMap::new();
    for inv in invoices {
        *counts.entry(inv.status).or_insert(0) += 1;
    }
    counts
}

fn age_days(invoice: &Invoice, status: InvoiceStatus, today: NaiveDate) -> Option<f64> {
    let days = match status {
        InvoiceStatus::Paid => (invoice.paid_date? - invoice.invoice_date).num_days(),
        InvoiceStatus::Pending => (today - invoice.invoice_date).num_days(),
        InvoiceStatus::Overdue => (today - invoice.due_date).num_days(),
        InvoiceStatus::Draft | InvoiceStatus::Cancelled => return None,
    };
    Some(days.max(0) as f64)
}

fn trend(current: u64, prior: Option<u64>, filter: &FilterSpec) -> &'static str {
    if filter.prior_window().is_none() {
        return "stable";
    }
    let prior = prior.unwrap_or(0);
    if current > prior {
        "up"
    } else if current < prior {
        "down"
    } else {
        "stable"
    }
}

fn risk_tag(status: InvoiceStatus, avg_age_days: f64) -> &'static str {
    match status {
        InvoiceStatus::Overdue => "High",
        InvoiceStatus::Pending if avg_age_days > 30.0 => "Medium",
        InvoiceStatus::Draft => "None",
        _ => "Low",
    }
}

fn age_bucket_index(age_days: i64) -> usize {
    match age_days {
        i64::MIN..=30 => 0,
        31..=60 => 1,
        61..=90 => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{d, invoice};
    use ledgeriq_store::InMemoryLedgerStore;

    #[tokio::test]
    async fn shapes_are_complete_even_when_empty() {
        let store = InMemoryLedgerStore::new();
        let got = invoice_status_distribution(&store, &FilterSpec::default(), d(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(got.status_data.len(), 5);
        assert_eq!(got.aging_data.len(), 4);
        assert!(got.status_data.iter().all(|r| r.count == 0));
        assert_eq!(got.aging_data[3].amount, 0.0);
        assert_eq!(got.aging_data[3].invoices, 0);
        assert_eq!(got.summary.dso, 0.0);
    }

    #[tokio::test]
    async fn age_formula_depends_on_status() {
        let today = d(2024, 3, 1);
        // Paid 15 days after invoicing (fixture behavior).
        let paid = invoice(d(2024, 1, 1), InvoiceStatus::Paid, 100.0);
        // Pending since Feb 20 → 10 days old.
        let pending = invoice(d(2024, 2, 20), InvoiceStatus::Pending, 100.0);
        // Overdue: due Jan 31 → 30 days past due.
        let overdue = invoice(d(2024, 1, 1), InvoiceStatus::Overdue, 100.0);

        let store = InMemoryLedgerStore::new().with_invoices([paid, pending, overdue]);
        let got = invoice_status_distribution(&store, &FilterSpec::default(), today)
            .await
            .unwrap();

        let by_status = |s: &str| {
            got.status_data
                .iter()
                .find(|r| r.status == s)
                .unwrap()
                .clone()
        };
        assert_eq!(by_status("paid").avg_age_days, 15.0);
        assert_eq!(by_status("pending").avg_age_days, 10.0);
        assert_eq!(by_status("overdue").avg_age_days, 30.0);
        assert_eq!(by_status("overdue").risk, "High");
        assert_eq!(by_status("draft").risk, "None");
    }

    #[tokio::test]
    async fn aging_cross_tab_buckets_by_invoice_age() {
        let today = d(2024, 4, 1);
        let store = InMemoryLedgerStore::new().with_invoices([
            invoice(d(2024, 3, 20), InvoiceStatus::Pending, 100.0), // 12 days
            invoice(d(2024, 2, 10), InvoiceStatus::Overdue, 200.0), // 51 days
            invoice(d(2023, 11, 1), InvoiceStatus::Overdue, 300.0), // 152 days
        ]);

        let got = invoice_status_distribution(&store, &FilterSpec::default(), today)
            .await
            .unwrap();

        assert_eq!(got.aging_data[0].invoices, 1);
        assert_eq!(got.aging_data[1].invoices, 1);
        assert_eq!(got.aging_data[2].invoices, 0);
        assert_eq!(got.aging_data[3].invoices, 1);
        assert_eq!(got.aging_data[3].amount, 300.0);
        assert_eq!(got.aging_data[3].by_status.get("overdue"), Some(&1));
    }

    #[tokio::test]
    async fn trend_compares_prior_window() {
        let store = InMemoryLedgerStore::new().with_invoices([
            // Prior window (January): one paid invoice.
            invoice(d(2024, 1, 10), InvoiceStatus::Paid, 100.0),
            // Current window (February): two paid invoices.
            invoice(d(2024, 2, 5), InvoiceStatus::Paid, 100.0),
            invoice(d(2024, 2, 15), InvoiceStatus::Paid, 100.0),
        ]);

        let filter = FilterSpec {
            start_date: Some(d(2024, 2, 1)),
            end_date: Some(d(2024, 2, 29)),
            ..Default::default()
        };
        let got = invoice_status_distribution(&store, &filter, d(2024, 3, 1))
            .await
            .unwrap();

        let paid = got.status_data.iter().find(|r| r.status == "paid").unwrap();
        assert_eq!(paid.count, 2);
        assert_eq!(paid.trend, "up");
    }

    #[tokio::test]
    async fn percentages_sum_to_hundred() {
        let store = InMemoryLedgerStore::new().with_invoices([
            invoice(d(2024, 1, 1), InvoiceStatus::Paid, 100.0),
            invoice(d(2024, 1, 2), InvoiceStatus::Pending, 100.0),
            invoice(d(2024, 1, 3), InvoiceStatus::Overdue, 100.0),
            invoice(d(2024, 1, 4), InvoiceStatus::Draft, 100.0),
        ]);
        let got = invoice_status_distribution(&store, &FilterSpec::default(), d(2024, 2, 1))
            .await
            .unwrap();
        let sum: f64 = got.status_data.iter().map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }
}
