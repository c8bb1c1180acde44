//! Ledger read capability consumed by every aggregator.

use std::sync::Arc;

use async_trait::async_trait;

use ledgeriq_core::{
    AnalyticsResult, Company, Customer, Invoice, InvoiceId, Item, LineItem, Predicate,
};

/// Read-only query capability over the external ledger.
///
/// Aggregators pass a `Predicate` built from the request `FilterSpec`; the
/// store returns matching rows and the aggregator does the NULL-safe
/// aggregate math. Master-data reads are unfiltered (labels/benchmarks).
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Invoices matching the predicate.
    async fn invoices(&self, predicate: &Predicate) -> AnalyticsResult<Vec<Invoice>>;

    /// Line items belonging to the given invoices.
    async fn line_items(&self, invoice_ids: &[InvoiceId]) -> AnalyticsResult<Vec<LineItem>>;

    async fn customers(&self) -> AnalyticsResult<Vec<Customer>>;

    async fn companies(&self) -> AnalyticsResult<Vec<Company>>;

    async fn items(&self) -> AnalyticsResult<Vec<Item>>;

    /// Schema-evolution probe: does the backing schema carry a `status`
    /// column? Older store versions predate it; aggregators branch to a
    /// reduced-feature fallback when this is false.
    fn has_status_column(&self) -> bool {
        true
    }
}

#[async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn invoices(&self, predicate: &Predicate) -> AnalyticsResult<Vec<Invoice>> {
        (**self).invoices(predicate).await
    }

    async fn line_items(&self, invoice_ids: &[InvoiceId]) -> AnalyticsResult<Vec<LineItem>> {
        (**self).line_items(invoice_ids).await
    }

    async fn customers(&self) -> AnalyticsResult<Vec<Customer>> {
        (**self).customers().await
    }

    async fn companies(&self) -> AnalyticsResult<Vec<Company>> {
        (**self).companies().await
    }

    async fn items(&self) -> AnalyticsResult<Vec<Item>> {
        (**self).items().await
    }

    fn has_status_column(&self) -> bool {
        (**self).has_status_column()
    }
}
