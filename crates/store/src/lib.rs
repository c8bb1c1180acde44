//! `ledgeriq-store` — read-only access to the external ledger.
//!
//! The engine never owns invoice storage; it issues predicate-scoped reads
//! through the `LedgerStore` trait. The in-memory implementation backs tests
//! and the dev/demo path.

pub mod in_memory;
pub mod ledger_store;

pub use in_memory::InMemoryLedgerStore;
pub use ledger_store::LedgerStore;
