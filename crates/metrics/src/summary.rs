//! Summary KPIs over the filtered ledger.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ledgeriq_core::{AnalyticsResult, FilterSpec, InvoiceStatus, Predicate};
use ledgeriq_store::LedgerStore;

use crate::util::{pct, ratio};

/// Headline KPI block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub total_revenue: f64,
    pub invoice_count: u64,
    pub paid_invoices: u64,
    pub pending_invoices: u64,
    pub overdue_invoices: u64,
    pub avg_invoice_value: f64,
    pub distinct_customers: u64,
    pub distinct_companies: u64,
    /// Percentages, always in [0, 100].
    pub payment_rate: f64,
    pub overdue_rate: f64,
    pub collection_efficiency: f64,
}

/// Compute the summary KPI block.
///
/// Contract: upstream query failures propagate (wrapped with context).
/// When the backing schema predates the `status` column, overdue falls back
/// to a due-date comparison and `paid_invoices` reports 0.
pub async fn summary_metrics(
    store: &dyn LedgerStore,
    filter: &FilterSpec,
    today: NaiveDate,
) -> AnalyticsResult<SummaryMetrics> {
    let invoices = store
        .invoices(&Predicate::build(filter))
        .await
        .map_err(|e| e.context("summary metrics"))?;

    let invoice_count = invoices.len() as u64;
    let total_revenue: f64 = invoices.iter().map(|i| i.total_amount).sum();

    let (paid, pending, overdue) = if store.has_status_column() {
        (
            invoices.iter().filter(|i| i.status == InvoiceStatus::Paid).count() as u64,
            invoices.iter().filter(|i| i.status == InvoiceStatus::Pending).count() as u64,
            invoices.iter().filter(|i| i.status == InvoiceStatus::Overdue).count() as u64,
        )
    } else {
        // Legacy schema: no status column. Overdue is inferred from the due
        // date; paid cannot be distinguished and reports 0.
        let overdue = invoices
            .iter()
            .filter(|i| i.paid_date.is_none() && i.due_date < today)
            .count() as u64;
        (0, invoice_count - overdue, overdue)
    };

    let overdue_rate = pct(overdue as f64, invoice_count as f64);

    Ok(SummaryMetrics {
        total_revenue,
        invoice_count,
        paid_invoices: paid,
        pending_invoices: pending,
        overdue_invoices: overdue,
        avg_invoice_value: ratio(total_revenue, invoice_count as f64),
        distinct_customers: invoices
            .iter()
            .map(|i| i.customer_id)
            .collect::<HashSet<_>>()
            .len() as u64,
        distinct_companies: invoices
            .iter()
            .map(|i| i.company_id)
            .collect::<HashSet<_>>()
            .len() as u64,
        payment_rate: pct(paid as f64, invoice_count as f64),
        overdue_rate,
        collection_efficiency: 100.0 - overdue_rate,
    })
}
