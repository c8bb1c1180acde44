//! Shared aggregate math helpers.
//!
//! Every ratio in this engine goes through `pct`/`ratio` so the
//! divide-by-zero invariant holds in one place.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use ledgeriq_core::AnalyticsError;

/// `part / whole * 100`, 0 when the denominator is empty. Clamped to
/// [0, 100] so percentage fields never leave their contract range.
pub fn pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (part / whole * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Plain ratio with a zero fallback (unclamped; used for averages).
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Period-over-period growth percentage; 0 when the prior period is empty
/// (covers both the first period and a zero baseline).
pub fn growth_pct(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

/// Average days between invoicing and collection (approximate months use
/// the mean Gregorian month length).
pub fn months_between(from: NaiveDate, to: NaiveDate) -> f64 {
    ((to - from).num_days().max(0) as f64) / 30.44
}

/// First day of the month `offset` months before `date`'s month.
pub fn shift_month(date: NaiveDate, offset: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 - offset;
    let (year, month0) = (total.div_euclid(12), total.rem_euclid(12));
    NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1)
        .unwrap_or(date)
}

/// The last `n` month keys ending with `today`'s month, ascending.
pub fn trailing_month_keys(today: NaiveDate, n: usize) -> Vec<String> {
    (0..n as i32)
        .rev()
        .map(|offset| shift_month(today, offset).format("%Y-%m").to_string())
        .collect()
}

/// Nearest-rank percentile over an unsorted sample; 0 for an empty sample.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Sort direction shared by the listing aggregators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl core::str::FromStr for SortOrder {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AnalyticsError::invalid_filter(format!(
                "sort order must be asc or desc (got {other})"
            ))),
        }
    }
}
