//! Request-scoped filtering.
//!
//! A `FilterSpec` is immutable per request and shared by every aggregator so
//! cross-metric results stay comparable. Its canonical serialization is part
//! of the cache-key contract: identical specs must produce identical keys.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::entity::InvoiceStatus;
use crate::error::AnalyticsError;
use crate::id::{CompanyId, CustomerId};

/// Immutable query scope applied to every aggregate query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub company_id: Option<CompanyId>,
    pub customer_id: Option<CustomerId>,
    pub status: Option<InvoiceStatus>,
}

impl FilterSpec {
    /// Canonical, stably-ordered serialization.
    ///
    /// Every field is always emitted (absent as `-`) in a fixed order, so
    /// distinct filters never collide and identical filters always match.
    pub fn canonical_key(&self) -> String {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(|x| x.to_string()).unwrap_or_else(|| "-".into())
        }

        format!(
            "start={}|end={}|company={}|customer={}|status={}",
            opt(&self.start_date),
            opt(&self.end_date),
            opt(&self.company_id),
            opt(&self.customer_id),
            self.status.map(|s| s.as_str()).unwrap_or("-"),
        )
    }

    /// The same window shifted back by its own length (for prior-period
    /// trend comparisons). `None` when the spec has an open-ended range.
    pub fn prior_window(&self) -> Option<FilterSpec> {
        let (start, end) = (self.start_date?, self.end_date?);
        let len = (end - start).num_days() + 1;
        let mut prior = self.clone();
        prior.end_date = Some(start - chrono::Duration::days(1));
        prior.start_date = Some(start - chrono::Duration::days(len));
        Some(prior)
    }
}

/// Time-bucket granularity for the revenue-over-time series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Period {
    /// Sortable bucket key for a date: lexicographic order equals
    /// chronological order within one granularity.
    pub fn bucket(&self, date: NaiveDate) -> String {
        match self {
            Period::Daily => date.format("%Y-%m-%d").to_string(),
            Period::Weekly => {
                let week = date.iso_week();
                format!("{:04}-W{:02}", week.year(), week.week())
            }
            Period::Monthly => date.format("%Y-%m").to_string(),
            Period::Quarterly => quarter_key(date),
            Period::Yearly => date.format("%Y").to_string(),
        }
    }
}

impl core::str::FromStr for Period {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "quarterly" => Ok(Period::Quarterly),
            "yearly" => Ok(Period::Yearly),
            other => Err(AnalyticsError::invalid_filter(format!(
                "period must be one of daily, weekly, monthly, quarterly, yearly (got {other})"
            ))),
        }
    }
}

/// Month bucket key, e.g. `2024-03`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Calendar-quarter bucket key, e.g. `2024-Q1`.
pub fn quarter_key(date: NaiveDate) -> String {
    format!("{:04}-Q{}", date.year(), (date.month0() / 3) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn canonical_key_is_stable_and_distinct() {
        let empty = FilterSpec::default();
        assert_eq!(empty.canonical_key(), "start=-|end=-|company=-|customer=-|status=-");

        let filtered = FilterSpec {
            start_date: Some(d(2024, 1, 1)),
            status: Some(InvoiceStatus::Paid),
            ..Default::default()
        };
        assert_ne!(empty.canonical_key(), filtered.canonical_key());
        assert_eq!(filtered.canonical_key(), filtered.clone().canonical_key());
    }

    #[test]
    fn filter_spec_round_trips_through_json() {
        let spec = FilterSpec {
            start_date: Some(d(2024, 1, 1)),
            end_date: Some(d(2024, 3, 31)),
            company_id: Some(CompanyId::new()),
            customer_id: None,
            status: Some(InvoiceStatus::Overdue),
        };
        let json = serde_json::to_string(&spec).unwrap();
        let back: FilterSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
        assert_eq!(spec.canonical_key(), back.canonical_key());
    }

    #[test]
    fn prior_window_has_equal_length() {
        let spec = FilterSpec {
            start_date: Some(d(2024, 2, 1)),
            end_date: Some(d(2024, 2, 29)),
            ..Default::default()
        };
        let prior = spec.prior_window().unwrap();
        assert_eq!(prior.start_date, Some(d(2024, 1, 3)));
        assert_eq!(prior.end_date, Some(d(2024, 1, 31)));
        assert!(FilterSpec::default().prior_window().is_none());
    }

    #[test]
    fn quarter_keys_sort_chronologically() {
        assert_eq!(quarter_key(d(2024, 1, 15)), "2024-Q1");
        assert_eq!(quarter_key(d(2024, 12, 31)), "2024-Q4");
        assert!(quarter_key(d(2023, 12, 1)) < quarter_key(d(2024, 1, 1)));
    }

    #[test]
    fn period_parsing_rejects_unknown() {
        assert_eq!("Quarterly".parse::<Period>().unwrap(), Period::Quarterly);
        assert!("fortnightly".parse::<Period>().is_err());
    }

    proptest! {
        /// Identical specs always serialize to byte-identical keys.
        #[test]
        fn canonical_key_is_deterministic(
            start in proptest::option::of(0i64..20_000),
            end in proptest::option::of(0i64..20_000),
            status_ix in proptest::option::of(0usize..5),
        ) {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
            let spec = FilterSpec {
                start_date: start.map(|n| epoch + chrono::Duration::days(n)),
                end_date: end.map(|n| epoch + chrono::Duration::days(n)),
                company_id: None,
                customer_id: None,
                status: status_ix.map(|i| InvoiceStatus::ALL[i]),
            };
            prop_assert_eq!(spec.canonical_key(), spec.clone().canonical_key());
        }
    }
}
