//! In-memory ledger store for tests and the dev/demo backend.

use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use ledgeriq_core::{
    AnalyticsError, AnalyticsResult, Company, Customer, Invoice, InvoiceId, Item, LineItem,
    Predicate,
};

use crate::ledger_store::LedgerStore;

/// In-memory `LedgerStore` with builder-style seeding.
///
/// `without_status_column()` simulates a legacy schema so the capability
/// probe fallback can be exercised without a real old database.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    invoices: RwLock<Vec<Invoice>>,
    line_items: RwLock<Vec<LineItem>>,
    customers: RwLock<Vec<Customer>>,
    companies: RwLock<Vec<Company>>,
    items: RwLock<Vec<Item>>,
    has_status: bool,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            has_status: true,
            ..Default::default()
        }
    }

    pub fn with_invoices(self, invoices: impl IntoIterator<Item = Invoice>) -> Self {
        if let Ok(mut rows) = self.invoices.write() {
            rows.extend(invoices);
        }
        self
    }

    pub fn with_line_items(self, lines: impl IntoIterator<Item = LineItem>) -> Self {
        if let Ok(mut rows) = self.line_items.write() {
            rows.extend(lines);
        }
        self
    }

    pub fn with_customers(self, customers: impl IntoIterator<Item = Customer>) -> Self {
        if let Ok(mut rows) = self.customers.write() {
            rows.extend(customers);
        }
        self
    }

    pub fn with_companies(self, companies: impl IntoIterator<Item = Company>) -> Self {
        if let Ok(mut rows) = self.companies.write() {
            rows.extend(companies);
        }
        self
    }

    pub fn with_items(self, items: impl IntoIterator<Item = Item>) -> Self {
        if let Ok(mut rows) = self.items.write() {
            rows.extend(items);
        }
        self
    }

    /// Pretend the backing schema predates the `status` column.
    pub fn without_status_column(mut self) -> Self {
        self.has_status = false;
        self
    }

    fn read<T: Clone>(lock: &RwLock<Vec<T>>) -> AnalyticsResult<Vec<T>> {
        lock.read()
            .map(|rows| rows.clone())
            .map_err(|_| AnalyticsError::unavailable("ledger store lock poisoned"))
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn invoices(&self, predicate: &Predicate) -> AnalyticsResult<Vec<Invoice>> {
        Ok(Self::read(&self.invoices)?
            .into_iter()
            .filter(|inv| predicate.matches(inv))
            .collect())
    }

    async fn line_items(&self, invoice_ids: &[InvoiceId]) -> AnalyticsResult<Vec<LineItem>> {
        let wanted: HashSet<InvoiceId> = invoice_ids.iter().copied().collect();
        Ok(Self::read(&self.line_items)?
            .into_iter()
            .filter(|line| wanted.contains(&line.invoice_id))
            .collect())
    }

    async fn customers(&self) -> AnalyticsResult<Vec<Customer>> {
        Self::read(&self.customers)
    }

    async fn companies(&self) -> AnalyticsResult<Vec<Company>> {
        Self::read(&self.companies)
    }

    async fn items(&self) -> AnalyticsResult<Vec<Item>> {
        Self::read(&self.items)
    }

    fn has_status_column(&self) -> bool {
        self.has_status
    }
}
