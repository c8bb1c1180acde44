//! `ledgeriq-forecast` — trailing-average linear extrapolation.
//!
//! Takes the last three observed periods, averages their growth rate and
//! average tax rate, and compounds forward from the most recent value.
//! Confidence derives from the variance of growth rates over the last six
//! periods. Forecast rows are tagged `forecast: true` and must be excluded
//! from any historical trend math by callers.

use serde::{Deserialize, Serialize};

/// Number of trailing periods averaged for the projection.
const TRAILING_WINDOW: usize = 3;
/// Number of trailing growth rates the confidence variance is taken over.
const CONFIDENCE_WINDOW: usize = 6;

/// One observed period, oldest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    pub value: f64,
    /// Period-over-period growth, percentage (0 for the first period).
    pub growth_rate: f64,
    /// Average effective rate carried alongside the value (e.g. tax rate).
    pub avg_rate: f64,
}

/// One projected period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// 1-based offset from the last observed period.
    pub periods_ahead: usize,
    pub projected_value: f64,
    pub avg_rate: f64,
    pub confidence: Confidence,
    /// Always `true`; lets mixed series be split back apart.
    pub forecast: bool,
}

/// Confidence tier from growth-rate variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

/// Variance tiers: <25 High, <100 Medium, else Low.
pub fn confidence_from_growth(growth_rates: &[f64]) -> Confidence {
    let window: Vec<f64> = growth_rates
        .iter()
        .rev()
        .take(CONFIDENCE_WINDOW)
        .copied()
        .collect();

    if window.len() < 2 {
        return Confidence::Low;
    }

    let variance = population_variance(&window);
    if variance < 25.0 {
        Confidence::High
    } else if variance < 100.0 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Project `periods` forward points from the observed history.
///
/// Empty history yields an empty projection rather than an error; callers
/// render "no forecast" instead of failing the whole report.
pub fn project(history: &[HistoryPoint], periods: usize) -> Vec<ForecastPoint> {
    let Some(last) = history.last() else {
        return Vec::new();
    };

    let trailing: Vec<&HistoryPoint> = history.iter().rev().take(TRAILING_WINDOW).collect();
    let avg_growth =
        trailing.iter().map(|p| p.growth_rate).sum::<f64>() / trailing.len() as f64;
    let avg_rate = trailing.iter().map(|p| p.avg_rate).sum::<f64>() / trailing.len() as f64;

    let growth_rates: Vec<f64> = history.iter().map(|p| p.growth_rate).collect();
    let confidence = confidence_from_growth(&growth_rates);

    let factor = 1.0 + avg_growth / 100.0;
    let mut projected = last.value;

    (1..=periods)
        .map(|ahead| {
            projected = (projected * factor).max(0.0);
            ForecastPoint {
                periods_ahead: ahead,
                projected_value: projected,
                avg_rate,
                confidence,
                forecast: true,
            }
        })
        .collect()
}

fn population_variance(xs: &[f64]) -> f64 {
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / xs.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(value: f64, growth: f64) -> HistoryPoint {
        HistoryPoint {
            value,
            growth_rate: growth,
            avg_rate: 18.0,
        }
    }

    #[test]
    fn compounds_trailing_average_growth() {
        // Last three growth rates average to 10%.
        let history = vec![
            point(1000.0, 0.0),
            point(1100.0, 10.0),
            point(1210.0, 10.0),
            point(1331.0, 10.0),
        ];
        let rows = project(&history, 3);
        assert_eq!(rows.len(), 3);
        assert!((rows[0].projected_value - 1464.1).abs() < 0.01);
        assert!((rows[1].projected_value - 1610.51).abs() < 0.01);
        assert!(rows.iter().all(|r| r.forecast));
    }

    #[test]
    fn steady_growth_is_high_confidence() {
        let history: Vec<_> = (0..6).map(|_| point(1000.0, 10.0)).collect();
        assert_eq!(project(&history, 1)[0].confidence, Confidence::High);
    }

    #[test]
    fn erratic_growth_is_low_confidence() {
        let growths = [50.0, -40.0, 80.0, -60.0, 30.0, -20.0];
        let history: Vec<_> = growths.iter().map(|g| point(1000.0, *g)).collect();
        assert_eq!(project(&history, 1)[0].confidence, Confidence::Low);
    }

    #[test]
    fn short_history_is_low_confidence() {
        assert_eq!(confidence_from_growth(&[5.0]), Confidence::Low);
        assert_eq!(confidence_from_growth(&[]), Confidence::Low);
    }

    #[test]
    fn empty_history_projects_nothing() {
        assert!(project(&[], 3).is_empty());
    }

    #[test]
    fn decline_never_projects_below_zero() {
        let history = vec![point(100.0, -80.0), point(20.0, -80.0), point(4.0, -80.0)];
        let rows = project(&history, 5);
        assert!(rows.iter().all(|r| r.projected_value >= 0.0));
    }

    proptest! {
        #[test]
        fn projection_length_matches_request(
            values in proptest::collection::vec(0.0f64..100_000.0, 1..12),
            periods in 0usize..6,
        ) {
            let history: Vec<_> = values.iter().map(|v| point(*v, 5.0)).collect();
            prop_assert_eq!(project(&history, periods).len(), periods);
        }
    }
}
