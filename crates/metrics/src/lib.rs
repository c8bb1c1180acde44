//! `ledgeriq-metrics` — the aggregator family.
//!
//! Each aggregator is a pure async function of `(store, filter, ...)` that
//! issues predicate-scoped reads and shapes the result. Every one returns
//! `AnalyticsResult<T>`; the engine facade decides per operation whether a
//! failure propagates or degrades to the documented empty shape.
//!
//! All aggregators take `today` explicitly so age/delay math is
//! deterministic under test.

pub mod aging;
pub mod companies;
pub mod customers;
pub mod delays;
pub mod items;
pub mod revenue;
pub mod status;
pub mod summary;
pub mod tax;
mod util;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use aging::{AgingBucketRow, AgingReport, invoice_aging_report};
pub use companies::{CompanyRow, CompanySplit, company_split};
pub use customers::{CustomerQuery, CustomerRow, CustomerSortKey, customer_revenue_analysis};
pub use delays::{DelayAnalysis, payment_delay_analysis};
pub use items::{ItemRow, ItemSortKey, ItemsQuery, TopItems, top_items_analysis};
pub use revenue::{RevenuePoint, revenue_over_time};
pub use status::{StatusDistribution, invoice_status_distribution};
pub use summary::{SummaryMetrics, summary_metrics};
pub use tax::{TaxReport, tax_liability_report};
pub use util::SortOrder;
