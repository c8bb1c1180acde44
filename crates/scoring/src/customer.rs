//! Customer score, tier and risk classification.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;

/// Aggregates a customer score is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CustomerScoreInput {
    pub total_revenue: f64,
    /// Percentage in [0, 100].
    pub payment_rate: f64,
    pub invoice_count: u64,
    pub avg_payment_days: f64,
    pub lifetime_months: f64,
}

/// Aggregates the risk tier is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CustomerRiskInput {
    pub payment_rate: f64,
    pub overdue_count: u64,
    pub avg_payment_days: f64,
    pub overdue_amount: f64,
}

/// Qualitative risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

/// 0–100 customer score: five independently capped contributions.
pub fn customer_score(input: &CustomerScoreInput, config: &ScoringConfig) -> f64 {
    let w = &config.customer;

    let revenue = (input.total_revenue / w.revenue_scale * w.revenue_cap)
        .clamp(0.0, w.revenue_cap);
    let payment = (input.payment_rate * w.payment_rate_weight).clamp(0.0, w.payment_rate_cap);
    let frequency = (input.invoice_count as f64 * w.frequency_per_invoice)
        .clamp(0.0, w.frequency_cap);
    let speed = ((w.speed_zero_days - input.avg_payment_days) / w.speed_zero_days * w.speed_cap)
        .clamp(0.0, w.speed_cap);
    let lifetime = (input.lifetime_months / w.lifetime_scale_months).clamp(0.0, w.lifetime_cap);

    revenue + payment + frequency + speed + lifetime
}

/// Tier label from the score/revenue ladder, evaluated top-down.
pub fn customer_tier(score: f64, total_revenue: f64, config: &ScoringConfig) -> &'static str {
    let t = &config.tiers;
    if score >= t.premium_score && total_revenue > t.premium_revenue {
        "Premium"
    } else if score >= t.gold_score && total_revenue > t.gold_revenue {
        "Gold"
    } else if score >= t.silver_score && total_revenue > t.silver_revenue {
        "Silver"
    } else if score >= t.bronze_score {
        "Bronze"
    } else {
        "New"
    }
}

/// Risk tier: OR over thresholds, High checks first (short-circuit order).
pub fn customer_risk_tier(input: &CustomerRiskInput, config: &ScoringConfig) -> RiskTier {
    let r = &config.risk;

    if input.payment_rate < r.high_payment_rate_below
        || input.overdue_count > r.high_overdue_count_above
        || input.avg_payment_days > r.high_payment_days_above
        || input.overdue_amount > r.high_overdue_amount_above
    {
        RiskTier::High
    } else if input.payment_rate < r.medium_payment_rate_below
        || input.overdue_count > r.medium_overdue_count_above
        || input.avg_payment_days > r.medium_payment_days_above
        || input.overdue_amount > r.medium_overdue_amount_above
    {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}
