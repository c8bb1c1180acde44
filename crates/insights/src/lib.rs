//! `ledgeriq-insights` — rule-based alert generation.
//!
//! Six independent rule objects evaluate a shared, pre-fetched metric
//! context and each emit zero or more alerts. The pipeline runner isolates
//! rule failures: a failing rule logs and contributes nothing, it never
//! aborts the others.

pub mod alert;
pub mod rules;

pub use alert::{Alert, AlertFeed, AlertSummary, Priority, Severity};
pub use rules::{AlertContext, AlertRule, default_rules, run_rules};
