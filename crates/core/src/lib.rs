//! `ledgeriq-core` — analytics foundation building blocks.
//!
//! This crate contains the **pure domain** pieces shared by every aggregator:
//! typed identifiers, the consumed ledger shapes, the `FilterSpec` request
//! scope, and the predicate tree built from it. No storage or caching
//! concerns live here.

pub mod entity;
pub mod error;
pub mod filter;
pub mod id;
pub mod predicate;

pub use entity::{Company, Customer, Invoice, InvoiceStatus, Item, LineItem};
pub use error::{AnalyticsError, AnalyticsResult};
pub use filter::{FilterSpec, Period};
pub use id::{CompanyId, CustomerId, InvoiceId, ItemId};
pub use predicate::{Clause, Predicate};
