//! Named, versioned scoring configuration.
//!
//! The reference constants carried here have no stated provenance in the
//! upstream business rules (see DESIGN.md); they are configurable defaults,
//! not hidden business truth.

use serde::{Deserialize, Serialize};

/// Bump when a weight/threshold change alters score semantics.
pub const SCORING_CONFIG_VERSION: u32 = 1;

/// Customer score term caps and scales (total bounded to 100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerScoreWeights {
    /// Revenue contribution: `revenue / revenue_scale * revenue_cap`.
    pub revenue_cap: f64,
    pub revenue_scale: f64,
    /// Payment-rate contribution: `payment_rate * payment_rate_weight`.
    pub payment_rate_weight: f64,
    pub payment_rate_cap: f64,
    /// Frequency contribution: `invoice_count * frequency_per_invoice`.
    pub frequency_cap: f64,
    pub frequency_per_invoice: f64,
    /// Speed contribution decreases linearly to 0 at `speed_zero_days`.
    pub speed_cap: f64,
    pub speed_zero_days: f64,
    /// Lifetime contribution: `lifetime_months / lifetime_scale_months`.
    pub lifetime_cap: f64,
    pub lifetime_scale_months: f64,
}

impl Default for CustomerScoreWeights {
    fn default() -> Self {
        Self {
            revenue_cap: 30.0,
            revenue_scale: 100_000.0,
            payment_rate_weight: 0.25,
            payment_rate_cap: 25.0,
            frequency_cap: 20.0,
            frequency_per_invoice: 2.0,
            speed_cap: 15.0,
            speed_zero_days: 45.0,
            lifetime_cap: 10.0,
            lifetime_scale_months: 6.0,
        }
    }
}

/// Customer tier ladder (score + revenue gates, evaluated top-down).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerTierLadder {
    pub premium_score: f64,
    pub premium_revenue: f64,
    pub gold_score: f64,
    pub gold_revenue: f64,
    pub silver_score: f64,
    pub silver_revenue: f64,
    pub bronze_score: f64,
}

impl Default for CustomerTierLadder {
    fn default() -> Self {
        Self {
            premium_score: 85.0,
            premium_revenue: 200_000.0,
            gold_score: 70.0,
            gold_revenue: 100_000.0,
            silver_score: 55.0,
            silver_revenue: 50_000.0,
            bronze_score: 40.0,
        }
    }
}

/// Customer risk thresholds, OR-evaluated in priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRiskThresholds {
    pub high_payment_rate_below: f64,
    pub high_overdue_count_above: u64,
    pub high_payment_days_above: f64,
    pub high_overdue_amount_above: f64,
    pub medium_payment_rate_below: f64,
    pub medium_overdue_count_above: u64,
    pub medium_payment_days_above: f64,
    pub medium_overdue_amount_above: f64,
}

impl Default for CustomerRiskThresholds {
    fn default() -> Self {
        Self {
            high_payment_rate_below: 60.0,
            high_overdue_count_above: 2,
            high_payment_days_above: 45.0,
            high_overdue_amount_above: 50_000.0,
            medium_payment_rate_below: 80.0,
            medium_overdue_count_above: 0,
            medium_payment_days_above: 30.0,
            medium_overdue_amount_above: 10_000.0,
        }
    }
}

/// Company blend weights and classification ladders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyWeights {
    pub efficiency_on_time_weight: f64,
    pub efficiency_collection_weight: f64,
    pub efficiency_frequency_weight: f64,
    /// Pre-scale: invoices/month mapped onto 0–100 at this rate.
    pub frequency_scale_per_month: f64,
    pub risk_overdue_weight: f64,
    pub risk_payment_days_weight: f64,
    pub risk_payment_rate_weight: f64,
    /// Payment days over this baseline count toward risk.
    pub risk_payment_days_baseline: f64,
    pub risk_payment_days_scale: f64,
}

impl Default for CompanyWeights {
    fn default() -> Self {
        Self {
            efficiency_on_time_weight: 0.4,
            efficiency_collection_weight: 0.4,
            efficiency_frequency_weight: 0.2,
            frequency_scale_per_month: 10.0,
            risk_overdue_weight: 0.4,
            risk_payment_days_weight: 0.3,
            risk_payment_rate_weight: 0.3,
            risk_payment_days_baseline: 30.0,
            risk_payment_days_scale: 2.0,
        }
    }
}

/// Item score term caps and scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemScoreWeights {
    pub revenue_cap: f64,
    pub revenue_scale: f64,
    pub margin_cap: f64,
    /// Margin percentage that earns the full margin cap.
    pub margin_full_at_pct: f64,
    pub frequency_cap: f64,
    pub frequency_per_invoice: f64,
    pub diversity_cap: f64,
    pub diversity_per_customer: f64,
    pub recency_full: f64,
    pub recency_half: f64,
    pub recency_full_days: i64,
    pub recency_half_days: i64,
}

impl Default for ItemScoreWeights {
    fn default() -> Self {
        Self {
            revenue_cap: 30.0,
            revenue_scale: 50_000.0,
            margin_cap: 25.0,
            margin_full_at_pct: 40.0,
            frequency_cap: 20.0,
            frequency_per_invoice: 2.0,
            diversity_cap: 15.0,
            diversity_per_customer: 3.0,
            recency_full: 10.0,
            recency_half: 5.0,
            recency_full_days: 30,
            recency_half_days: 60,
        }
    }
}

/// Tax compliance scoring rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRules {
    pub sane_rate_min: f64,
    pub sane_rate_max: f64,
    pub out_of_range_penalty: f64,
    pub zero_tax_penalty: f64,
    /// Penalty per point of deviation from the nearest standard rate.
    pub deviation_penalty_per_point: f64,
    pub deviation_penalty_cap: f64,
    pub excellent_at: f64,
    pub good_at: f64,
    pub fair_at: f64,
}

impl Default for ComplianceRules {
    fn default() -> Self {
        Self {
            sane_rate_min: 5.0,
            sane_rate_max: 30.0,
            out_of_range_penalty: 10.0,
            zero_tax_penalty: 20.0,
            deviation_penalty_per_point: 2.0,
            deviation_penalty_cap: 15.0,
            excellent_at: 95.0,
            good_at: 85.0,
            fair_at: 70.0,
        }
    }
}

/// Reference benchmark constants used across aggregators and alert rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmarks {
    /// Internal payment-delay target in days.
    pub standard_payment_days: f64,
    /// Industry average payment delay in days.
    pub industry_delay_days: f64,
    /// Standard GST-style rate brackets.
    pub standard_tax_rates: Vec<f64>,
    /// Fixed cost ratio used to approximate item margin.
    pub item_cost_ratio: f64,
    /// Day of month by which tax filings are due.
    pub filing_cutoff_day: u32,
    /// Days before the cutoff within which the deadline alert fires.
    pub filing_warning_days: i64,
}

impl Default for Benchmarks {
    fn default() -> Self {
        Self {
            standard_payment_days: 30.0,
            industry_delay_days: 32.0,
            standard_tax_rates: vec![5.0, 12.0, 18.0, 28.0],
            item_cost_ratio: 0.65,
            filing_cutoff_day: 20,
            filing_warning_days: 5,
        }
    }
}

/// Top-level scoring configuration injected into the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub customer: CustomerScoreWeights,
    pub tiers: CustomerTierLadder,
    pub risk: CustomerRiskThresholds,
    pub company: CompanyWeights,
    pub item: ItemScoreWeights,
    pub compliance: ComplianceRules,
    pub benchmarks: Benchmarks,
}

impl ScoringConfig {
    pub fn version(&self) -> u32 {
        SCORING_CONFIG_VERSION
    }
}
