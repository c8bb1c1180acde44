//! Company-level derived scores and classifications.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;

/// Aggregates the company scores are computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompanyMetricsInput {
    pub total_revenue: f64,
    /// Percentages in [0, 100].
    pub payment_rate: f64,
    pub on_time_rate: f64,
    pub collection_rate: f64,
    pub overdue_rate: f64,
    pub avg_payment_days: f64,
    pub invoices_per_month: f64,
    /// Latest quarter-over-quarter growth rate, percentage.
    pub growth_rate: f64,
    pub years_in_business: f64,
}

/// Derived company scores and ladders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyScores {
    pub operational_efficiency: f64,
    pub risk_score: f64,
    pub customer_satisfaction: f64,
    pub performance_category: String,
    pub market_position: String,
    pub business_maturity: String,
}

/// Weighted blend of on-time rate, collection rate and invoice frequency.
pub fn operational_efficiency(input: &CompanyMetricsInput, config: &ScoringConfig) -> f64 {
    let w = &config.company;
    let frequency = (input.invoices_per_month * w.frequency_scale_per_month).clamp(0.0, 100.0);

    (input.on_time_rate.clamp(0.0, 100.0) * w.efficiency_on_time_weight
        + input.collection_rate.clamp(0.0, 100.0) * w.efficiency_collection_weight
        + frequency * w.efficiency_frequency_weight)
        .clamp(0.0, 100.0)
}

/// Weighted blend of overdue rate, payment-day excess and payment-rate
/// deficit, clamped to [0, 100].
pub fn risk_score(input: &CompanyMetricsInput, config: &ScoringConfig) -> f64 {
    let w = &config.company;
    let days_excess = ((input.avg_payment_days - w.risk_payment_days_baseline).max(0.0)
        * w.risk_payment_days_scale)
        .clamp(0.0, 100.0);
    let rate_deficit = (100.0 - input.payment_rate).clamp(0.0, 100.0);

    (input.overdue_rate.clamp(0.0, 100.0) * w.risk_overdue_weight
        + days_excess * w.risk_payment_days_weight
        + rate_deficit * w.risk_payment_rate_weight)
        .clamp(0.0, 100.0)
}

/// Satisfaction proxy: customers who pay promptly and fully are assumed
/// satisfied with the relationship.
pub fn customer_satisfaction(input: &CompanyMetricsInput) -> f64 {
    (input.payment_rate.clamp(0.0, 100.0) * 0.6 + input.on_time_rate.clamp(0.0, 100.0) * 0.4)
        .clamp(0.0, 100.0)
}

/// Ordered threshold ladder over revenue, payment rate and growth.
pub fn market_position(input: &CompanyMetricsInput) -> &'static str {
    if input.total_revenue > 1_000_000.0
        && input.payment_rate > 85.0
        && input.growth_rate > 10.0
    {
        "Leader"
    } else if input.total_revenue > 500_000.0 && input.payment_rate > 75.0 {
        "Challenger"
    } else if input.total_revenue > 100_000.0 {
        "Follower"
    } else {
        "Niche"
    }
}

/// Ordered threshold ladder over years in business, revenue and efficiency.
pub fn business_maturity(input: &CompanyMetricsInput, efficiency: f64) -> &'static str {
    if input.years_in_business >= 10.0 && input.total_revenue > 500_000.0 && efficiency > 70.0 {
        "Mature"
    } else if input.years_in_business >= 5.0 && input.total_revenue > 200_000.0 {
        "Established"
    } else if input.years_in_business >= 2.0 {
        "Growing"
    } else {
        "Startup"
    }
}

/// Performance category from the efficiency/risk pair.
pub fn performance_category(efficiency: f64, risk: f64) -> &'static str {
    if efficiency >= 80.0 && risk < 30.0 {
        "Excellent"
    } else if efficiency >= 60.0 && risk < 50.0 {
        "Good"
    } else if efficiency >= 40.0 {
        "Average"
    } else {
        "Needs Improvement"
    }
}

/// Compute the full derived-score block for one company.
pub fn company_scores(input: &CompanyMetricsInput, config: &ScoringConfig) -> CompanyScores {
    let efficiency = operational_efficiency(input, config);
    let risk = risk_score(input, config);

    CompanyScores {
        operational_efficiency: efficiency,
        risk_score: risk,
        customer_satisfaction: customer_satisfaction(input),
        performance_category: performance_category(efficiency, risk).to_string(),
        market_position: market_position(input).to_string(),
        business_maturity: business_maturity(input, efficiency).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn healthy_company_scores_well() {
        let input = CompanyMetricsInput {
            total_revenue: 2_000_000.0,
            payment_rate: 92.0,
            on_time_rate: 88.0,
            collection_rate: 95.0,
            overdue_rate: 4.0,
            avg_payment_days: 22.0,
            invoices_per_month: 15.0,
            growth_rate: 12.0,
            years_in_business: 11.0,
        };
        let scores = company_scores(&input, &config());
        assert!(scores.operational_efficiency > 80.0);
        assert!(scores.risk_score < 10.0);
        assert_eq!(scores.performance_category, "Excellent");
        assert_eq!(scores.market_position, "Leader");
        assert_eq!(scores.business_maturity, "Mature");
    }

    #[test]
    fn idle_company_does_not_divide_by_zero() {
        let scores = company_scores(&CompanyMetricsInput::default(), &config());
        assert!(scores.operational_efficiency >= 0.0);
        // No payments at all reads as maximum payment-rate deficit.
        assert!((scores.risk_score - 30.0).abs() < 1e-9);
        assert_eq!(scores.market_position, "Niche");
        assert_eq!(scores.business_maturity, "Startup");
    }

    #[test]
    fn slow_payers_raise_risk() {
        let mut input = CompanyMetricsInput {
            payment_rate: 70.0,
            overdue_rate: 30.0,
            avg_payment_days: 25.0,
            ..Default::default()
        };
        let base = risk_score(&input, &config());
        input.avg_payment_days = 60.0;
        assert!(risk_score(&input, &config()) > base);
    }

    proptest! {
        /// Both blended scores stay in [0, 100] for any inputs.
        #[test]
        fn blends_are_clamped(
            on_time in -50.0f64..200.0,
            collection in -50.0f64..200.0,
            overdue in -50.0f64..200.0,
            days in 0.0f64..500.0,
            rate in -50.0f64..200.0,
            freq in 0.0f64..1_000.0,
        ) {
            let input = CompanyMetricsInput {
                on_time_rate: on_time,
                collection_rate: collection,
                overdue_rate: overdue,
                avg_payment_days: days,
                payment_rate: rate,
                invoices_per_month: freq,
                ..Default::default()
            };
            let cfg = config();
            prop_assert!((0.0..=100.0).contains(&operational_efficiency(&input, &cfg)));
            prop_assert!((0.0..=100.0).contains(&risk_score(&input, &cfg)));
        }
    }
}
