//! Item performance scoring.

use crate::config::ScoringConfig;

/// Aggregates an item score is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemScoreInput {
    pub revenue: f64,
    /// Margin percentage in [0, 100].
    pub margin_pct: f64,
    pub invoice_count: u64,
    pub customer_count: u64,
    /// Days since the item last appeared on an invoice; `None` = never sold.
    pub days_since_last_sale: Option<i64>,
}

/// 0–100 item performance score: five independently capped contributions.
pub fn item_performance_score(input: &ItemScoreInput, config: &ScoringConfig) -> f64 {
    let w = &config.item;

    let revenue = (input.revenue / w.revenue_scale * w.revenue_cap).clamp(0.0, w.revenue_cap);
    let margin = (input.margin_pct / w.margin_full_at_pct * w.margin_cap)
        .clamp(0.0, w.margin_cap);
    let frequency =
        (input.invoice_count as f64 * w.frequency_per_invoice).clamp(0.0, w.frequency_cap);
    let diversity =
        (input.customer_count as f64 * w.diversity_per_customer).clamp(0.0, w.diversity_cap);
    let recency = match input.days_since_last_sale {
        Some(days) if days <= w.recency_full_days => w.recency_full,
        Some(days) if days <= w.recency_half_days => w.recency_half,
        _ => 0.0,
    };

    revenue + margin + frequency + diversity + recency
}
