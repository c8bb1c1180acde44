//! `ledgeriq-scoring` — deterministic scoring and classification.
//!
//! Every score is a weighted sum over already-computed aggregates, each term
//! independently capped before summation so the total stays bounded. Weights
//! and thresholds live in a named, versioned `ScoringConfig` rather than in
//! control flow.

pub mod company;
pub mod compliance;
pub mod config;
pub mod customer;
pub mod item;

pub use company::{CompanyMetricsInput, CompanyScores, company_scores};
pub use compliance::{
    ComplianceInput, compliance_score, compliance_status, nearest_standard_deviation,
};
pub use config::{Benchmarks, SCORING_CONFIG_VERSION, ScoringConfig};
pub use customer::{
    CustomerRiskInput, CustomerScoreInput, RiskTier, customer_risk_tier, customer_score,
    customer_tier,
};
pub use item::{ItemScoreInput, item_performance_score};
