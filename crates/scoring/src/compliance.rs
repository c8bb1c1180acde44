//! Tax compliance scoring.

use crate::config::ScoringConfig;

/// Aggregates a compliance score is computed from (one month bucket).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplianceInput {
    /// Average effective tax rate for the period, percentage.
    pub avg_rate: f64,
    pub invoice_count: u64,
    pub total_tax: f64,
}

/// Compliance score: starts at 100, penalized for implausible rates,
/// zero-tax anomalies and deviation from the nearest standard bracket.
pub fn compliance_score(input: &ComplianceInput, config: &ScoringConfig) -> f64 {
    let rules = &config.compliance;
    let mut score = 100.0;

    if input.avg_rate < rules.sane_rate_min || input.avg_rate > rules.sane_rate_max {
        score -= rules.out_of_range_penalty;
    }

    if input.invoice_count > 0 && input.total_tax <= 0.0 {
        score -= rules.zero_tax_penalty;
    }

    let deviation = nearest_standard_deviation(input.avg_rate, &config.benchmarks.standard_tax_rates);
    score -= (deviation * rules.deviation_penalty_per_point).min(rules.deviation_penalty_cap);

    score.clamp(0.0, 100.0)
}

/// Status ladder over the score.
pub fn compliance_status(score: f64, config: &ScoringConfig) -> &'static str {
    let rules = &config.compliance;
    if score >= rules.excellent_at {
        "Excellent"
    } else if score >= rules.good_at {
        "Good"
    } else if score >= rules.fair_at {
        "Fair"
    } else {
        "Needs Attention"
    }
}

/// Absolute distance from the nearest standard bracket; 0 when the bracket
/// set is empty (nothing to deviate from).
pub fn nearest_standard_deviation(rate: f64, standard_rates: &[f64]) -> f64 {
    standard_rates
        .iter()
        .map(|r| (rate - r).abs())
        .fold(None, |best: Option<f64>, d| {
            Some(best.map_or(d, |b| b.min(d)))
        })
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn standard_rate_is_excellent() {
        let input = ComplianceInput {
            avg_rate: 18.0,
            invoice_count: 10,
            total_tax: 5_000.0,
        };
        let score = compliance_score(&input, &config());
        assert_eq!(score, 100.0);
        assert_eq!(compliance_status(score, &config()), "Excellent");
    }

    #[test]
    fn zero_tax_with_invoices_is_penalized() {
        let input = ComplianceInput {
            avg_rate: 0.0,
            invoice_count: 10,
            total_tax: 0.0,
        };
        // -10 out of range, -20 zero tax, -10 deviation (5 points from the
        // nearest bracket, capped contribution 2/point).
        let score = compliance_score(&input, &config());
        assert_eq!(score, 60.0);
        assert_eq!(compliance_status(score, &config()), "Needs Attention");
    }

    #[test]
    fn no_invoices_no_zero_tax_penalty() {
        let with = ComplianceInput {
            avg_rate: 18.0,
            invoice_count: 5,
            total_tax: 0.0,
        };
        let without = ComplianceInput {
            avg_rate: 18.0,
            invoice_count: 0,
            total_tax: 0.0,
        };
        assert!(compliance_score(&with, &config()) < compliance_score(&without, &config()));
    }

    #[test]
    fn deviation_penalty_is_capped() {
        let input = ComplianceInput {
            avg_rate: 28.0 + 50.0,
            invoice_count: 3,
            total_tax: 900.0,
        };
        // -10 out of range, deviation 50 points capped at -15.
        assert_eq!(compliance_score(&input, &config()), 75.0);
    }

    #[test]
    fn empty_bracket_set_yields_no_deviation_penalty() {
        let mut cfg = config();
        cfg.benchmarks.standard_tax_rates.clear();
        let input = ComplianceInput {
            avg_rate: 18.0,
            invoice_count: 1,
            total_tax: 18.0,
        };
        assert_eq!(compliance_score(&input, &cfg), 100.0);
    }
}
