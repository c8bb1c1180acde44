//! Revenue-over-time series.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ledgeriq_core::{AnalyticsResult, FilterSpec, InvoiceStatus, Period, Predicate};
use ledgeriq_store::LedgerStore;

use crate::util::ratio;

/// One time bucket of the revenue series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    pub period: String,
    pub revenue: f64,
    pub invoice_count: u64,
    pub avg_invoice_value: f64,
    pub paid_revenue: f64,
    /// Outstanding revenue (pending + overdue).
    pub pending_revenue: f64,
}

/// Bucket invoices by period granularity, ascending by period key.
///
/// Contract: upstream query failures propagate.
pub async fn revenue_over_time(
    store: &dyn LedgerStore,
    filter: &FilterSpec,
    period: Period,
) -> AnalyticsResult<Vec<RevenuePoint>> {
    let invoices = store
        .invoices(&Predicate::build(filter))
        .await
        .map_err(|e| e.context("revenue over time"))?;

    // BTreeMap keeps buckets sorted; period keys sort chronologically by
    // construction.
    let mut buckets: BTreeMap<String, RevenuePoint> = BTreeMap::new();

    for inv in &invoices {
        let key = period.bucket(inv.invoice_date);
        let point = buckets.entry(key.clone()).or_insert_with(|| RevenuePoint {
            period: key,
            ..Default::default()
        });

        point.revenue += inv.total_amount;
        point.invoice_count += 1;
        match inv.status {
            InvoiceStatus::Paid => point.paid_revenue += inv.total_amount,
            InvoiceStatus::Pending | InvoiceStatus::Overdue => {
                point.pending_revenue += inv.total_amount
            }
            InvoiceStatus::Draft | InvoiceStatus::Cancelled => {}
        }
    }

    Ok(buckets
        .into_values()
        .map(|mut point| {
            point.avg_invoice_value = ratio(point.revenue, point.invoice_count as f64);
            point
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{d, invoice};
    use ledgeriq_store::InMemoryLedgerStore;

    #[tokio::test]
    async fn buckets_sort_ascending_by_period() {
        let store = InMemoryLedgerStore::new().with_invoices([
            invoice(d(2024, 3, 5), InvoiceStatus::Paid, 300.0),
            invoice(d(2023, 12, 5), InvoiceStatus::Paid, 100.0),
            invoice(d(2024, 1, 5), InvoiceStatus::Pending, 200.0),
            invoice(d(2024, 1, 25), InvoiceStatus::Paid, 400.0),
        ]);

        let rows = revenue_over_time(&store, &FilterSpec::default(), Period::Monthly)
            .await
            .unwrap();

        let periods: Vec<&str> = rows.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(periods, vec!["2023-12", "2024-01", "2024-03"]);

        let jan = &rows[1];
        assert_eq!(jan.revenue, 600.0);
        assert_eq!(jan.invoice_count, 2);
        assert_eq!(jan.avg_invoice_value, 300.0);
        assert_eq!(jan.paid_revenue, 400.0);
        assert_eq!(jan.pending_revenue, 200.0);
    }

    #[tokio::test]
    async fn quarterly_granularity() {
        let store = InMemoryLedgerStore::new().with_invoices([
            invoice(d(2024, 1, 5), InvoiceStatus::Paid, 100.0),
            invoice(d(2024, 2, 5), InvoiceStatus::Paid, 100.0),
            invoice(d(2024, 4, 5), InvoiceStatus::Paid, 100.0),
        ]);

        let rows = revenue_over_time(&store, &FilterSpec::default(), Period::Quarterly)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, "2024-Q1");
        assert_eq!(rows[0].revenue, 200.0);
        assert_eq!(rows[1].period, "2024-Q2");
    }

    #[tokio::test]
    async fn empty_ledger_is_an_empty_series() {
        let store = InMemoryLedgerStore::new();
        let rows = revenue_over_time(&store, &FilterSpec::default(), Period::Daily)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn draft_and_cancelled_count_toward_revenue_only() {
        let store = InMemoryLedgerStore::new().with_invoices([
            invoice(d(2024, 1, 5), InvoiceStatus::Draft, 100.0),
            invoice(d(2024, 1, 6), InvoiceStatus::Cancelled, 100.0),
        ]);

        let rows = revenue_over_time(&store, &FilterSpec::default(), Period::Monthly)
            .await
            .unwrap();
        assert_eq!(rows[0].revenue, 200.0);
        assert_eq!(rows[0].paid_revenue, 0.0);
        assert_eq!(rows[0].pending_revenue, 0.0);
    }
}
