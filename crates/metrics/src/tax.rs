//! Tax liability report: monthly series, forecast, quarterly rollups,
//! compliance analysis and optimization opportunities.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use ledgeriq_core::{
    AnalyticsResult, FilterSpec, Invoice, InvoiceStatus, Predicate,
    filter::{month_key, quarter_key},
};
use ledgeriq_forecast::{ForecastPoint, HistoryPoint, project};
use ledgeriq_scoring::{
    ComplianceInput, ScoringConfig, compliance_score, compliance_status,
    nearest_standard_deviation,
};
use ledgeriq_store::LedgerStore;

use crate::util::{growth_pct, mean, ratio, shift_month};

/// Number of forward months projected in the forecast block.
const FORECAST_MONTHS: usize = 3;

/// One observed month of tax liability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxMonthRow {
    pub month: String,
    pub taxable_amount: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub total_tax: f64,
    pub invoice_count: u64,
    /// Average effective tax rate across the month's invoices, percentage.
    pub avg_rate: f64,
    pub growth_rate: f64,
    pub compliance_score: f64,
    pub compliance_status: String,
}

/// One projected month, labeled past the last observed month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxForecastRow {
    pub month: String,
    pub projected_tax: f64,
    pub avg_rate: f64,
    pub confidence: String,
    pub forecast: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxQuarterRow {
    pub quarter: String,
    pub taxable_amount: f64,
    pub total_tax: f64,
    pub invoice_count: u64,
}

/// One gated suggestion; only rendered when its trigger condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOpportunity {
    pub category: String,
    pub description: String,
    pub priority: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceAnalysis {
    pub overall_score: f64,
    pub overall_status: String,
    /// Months whose score fell below the "Good" threshold.
    pub flagged_months: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSummaryMetrics {
    pub total_tax: f64,
    pub total_taxable: f64,
    pub avg_monthly_tax: f64,
    pub avg_rate: f64,
    pub projected_next_month: f64,
}

/// Echo of the standard brackets the compliance math compares against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBenchmarks {
    pub standard_rates: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxReport {
    pub monthly_data: Vec<TaxMonthRow>,
    pub forecast_data: Vec<TaxForecastRow>,
    pub quarterly_summary: Vec<TaxQuarterRow>,
    pub optimization_opportunities: Vec<OptimizationOpportunity>,
    pub compliance_analysis: ComplianceAnalysis,
    pub summary_metrics: TaxSummaryMetrics,
    pub industry_benchmarks: TaxBenchmarks,
}

/// Full tax liability report over the filtered window.
///
/// Drafts and cancelled invoices carry no tax liability and are excluded.
/// Contract: upstream query failures propagate.
pub async fn tax_liability_report(
    store: &dyn LedgerStore,
    filter: &FilterSpec,
    config: &ScoringConfig,
) -> AnalyticsResult<TaxReport> {
    let invoices: Vec<Invoice> = store
        .invoices(&Predicate::build(filter))
        .await
        .map_err(|e| e.context("tax liability report"))?
        .into_iter()
        .filter(|i| !matches!(i.status, InvoiceStatus::Draft | InvoiceStatus::Cancelled))
        .collect();

    #[derive(Default)]
    struct MonthAcc {
        taxable: f64,
        cgst: f64,
        sgst: f64,
        count: u64,
        rates: Vec<f64>,
        last_date: Option<NaiveDate>,
    }

    let mut by_month: BTreeMap<String, MonthAcc> = BTreeMap::new();
    for inv in &invoices {
        let acc = by_month.entry(month_key(inv.invoice_date)).or_default();
        acc.taxable += inv.subtotal;
        acc.cgst += inv.cgst;
        acc.sgst += inv.sgst;
        acc.count += 1;
        acc.rates.push(inv.tax_rate());
        acc.last_date = Some(acc.last_date.map_or(inv.invoice_date, |d| d.max(inv.invoice_date)));
    }

    let mut monthly_data: Vec<TaxMonthRow> = Vec::with_capacity(by_month.len());
    let mut prev_tax: Option<f64> = None;
    let mut last_observed: Option<NaiveDate> = None;
    for (month, acc) in &by_month {
        let total_tax = acc.cgst + acc.sgst;
        let avg_rate = mean(&acc.rates);
        let score = compliance_score(
            &ComplianceInput {
                avg_rate,
                invoice_count: acc.count,
                total_tax,
            },
            config,
        );
        monthly_data.push(TaxMonthRow {
            month: month.clone(),
            taxable_amount: acc.taxable,
            cgst: acc.cgst,
            sgst: acc.sgst,
            total_tax,
            invoice_count: acc.count,
            avg_rate,
            growth_rate: prev_tax.map(|p| growth_pct(total_tax, p)).unwrap_or(0.0),
            compliance_score: score,
            compliance_status: compliance_status(score, config).to_string(),
        });
        prev_tax = Some(total_tax);
        last_observed = last_observed.max(acc.last_date);
    }

    let history: Vec<HistoryPoint> = monthly_data
        .iter()
        .map(|row| HistoryPoint {
            value: row.total_tax,
            growth_rate: row.growth_rate,
            avg_rate: row.avg_rate,
        })
        .collect();
    let forecast_data = label_forecast(project(&history, FORECAST_MONTHS), last_observed);

    let mut by_quarter: BTreeMap<String, TaxQuarterRow> = BTreeMap::new();
    for inv in &invoices {
        let key = quarter_key(inv.invoice_date);
        let row = by_quarter.entry(key.clone()).or_insert_with(|| TaxQuarterRow {
            quarter: key,
            ..Default::default()
        });
        row.taxable_amount += inv.subtotal;
        row.total_tax += inv.tax_total();
        row.invoice_count += 1;
    }

    let total_tax: f64 = monthly_data.iter().map(|r| r.total_tax).sum();
    let total_taxable: f64 = monthly_data.iter().map(|r| r.taxable_amount).sum();
    let overall_rate = ratio(total_tax, total_taxable) * 100.0;

    let scores: Vec<f64> = monthly_data.iter().map(|r| r.compliance_score).collect();
    let overall_score = mean(&scores);
    let compliance_analysis = ComplianceAnalysis {
        overall_score,
        overall_status: if monthly_data.is_empty() {
            String::new()
        } else {
            compliance_status(overall_score, config).to_string()
        },
        flagged_months: monthly_data
            .iter()
            .filter(|r| r.compliance_score < config.compliance.good_at)
            .map(|r| r.month.clone())
            .collect(),
    };

    let summary_metrics = TaxSummaryMetrics {
        total_tax,
        total_taxable,
        avg_monthly_tax: ratio(total_tax, monthly_data.len() as f64),
        avg_rate: overall_rate,
        projected_next_month: forecast_data
            .first()
            .map(|f| f.projected_tax)
            .unwrap_or(0.0),
    };

    Ok(TaxReport {
        optimization_opportunities: opportunities(&monthly_data, overall_rate, config),
        monthly_data,
        forecast_data,
        quarterly_summary: by_quarter.into_values().collect(),
        compliance_analysis,
        summary_metrics,
        industry_benchmarks: TaxBenchmarks {
            standard_rates: config.benchmarks.standard_tax_rates.clone(),
        },
    })
}

/// Attach month labels continuing after the last observed month.
fn label_forecast(points: Vec<ForecastPoint>, last_observed: Option<NaiveDate>) -> Vec<TaxForecastRow> {
    let Some(last) = last_observed else {
        return Vec::new();
    };
    points
        .into_iter()
        .map(|p| TaxForecastRow {
            month: month_key(shift_month(last, -(p.periods_ahead as i32))),
            projected_tax: p.projected_value,
            avg_rate: p.avg_rate,
            confidence: p.confidence.as_str().to_string(),
            forecast: p.forecast,
        })
        .collect()
}

fn opportunities(
    monthly: &[TaxMonthRow],
    overall_rate: f64,
    config: &ScoringConfig,
) -> Vec<OptimizationOpportunity> {
    let mut out = Vec::new();

    if overall_rate > 15.0 {
        out.push(OptimizationOpportunity {
            category: "Input credit optimization".to_string(),
            description: format!(
                "Effective tax rate is {overall_rate:.1}%; review input credits to reduce net liability"
            ),
            priority: "Medium".to_string(),
        });
    }

    let deviation =
        nearest_standard_deviation(overall_rate, &config.benchmarks.standard_tax_rates);
    if deviation > 2.0 {
        out.push(OptimizationOpportunity {
            category: "Rate bracket alignment".to_string(),
            description: format!(
                "Effective rate deviates {deviation:.1} points from the nearest standard bracket; verify item rate classifications"
            ),
            priority: "High".to_string(),
        });
    }

    let zero_tax_months: Vec<&str> = monthly
        .iter()
        .filter(|r| r.invoice_count > 0 && r.total_tax <= 0.0)
        .map(|r| r.month.as_str())
        .collect();
    if !zero_tax_months.is_empty() {
        out.push(OptimizationOpportunity {
            category: "Zero-tax anomaly review".to_string(),
            description: format!(
                "{} month(s) invoiced without any tax collected: {}",
                zero_tax_months.len(),
                zero_tax_months.join(", ")
            ),
            priority: "High".to_string(),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{d, invoice};
    use ledgeriq_store::InMemoryLedgerStore;

    #[tokio::test]
    async fn monthly_series_with_growth_and_compliance() {
        let store = InMemoryLedgerStore::new().with_invoices([
            invoice(d(2024, 1, 5), InvoiceStatus::Paid, 1_180.0),
            invoice(d(2024, 2, 5), InvoiceStatus::Paid, 2_360.0),
            invoice(d(2024, 2, 15), InvoiceStatus::Pending, 1_180.0),
        ]);

        let got = tax_liability_report(&store, &FilterSpec::default(), &ScoringConfig::default())
            .await
            .unwrap();

        assert_eq!(got.monthly_data.len(), 2);
        let jan = &got.monthly_data[0];
        let feb = &got.monthly_data[1];
        assert_eq!(jan.month, "2024-01");
        assert!((jan.total_tax - 180.0).abs() < 1e-6);
        assert!((jan.avg_rate - 18.0).abs() < 1e-6);
        assert_eq!(jan.growth_rate, 0.0);
        assert_eq!(jan.compliance_status, "Excellent");
        assert_eq!(feb.invoice_count, 2);
        assert!((feb.total_tax - 540.0).abs() < 1e-6);
        assert!((feb.growth_rate - 200.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn forecast_continues_month_labels() {
        let store = InMemoryLedgerStore::new().with_invoices([
            invoice(d(2024, 1, 5), InvoiceStatus::Paid, 1_180.0),
            invoice(d(2024, 2, 5), InvoiceStatus::Paid, 1_180.0),
            invoice(d(2024, 3, 5), InvoiceStatus::Paid, 1_180.0),
        ]);

        let got = tax_liability_report(&store, &FilterSpec::default(), &ScoringConfig::default())
            .await
            .unwrap();

        assert_eq!(got.forecast_data.len(), 3);
        let months: Vec<&str> = got.forecast_data.iter().map(|f| f.month.as_str()).collect();
        assert_eq!(months, vec!["2024-04", "2024-05", "2024-06"]);
        assert!(got.forecast_data.iter().all(|f| f.forecast));
        // Flat history projects the last value forward.
        assert!((got.forecast_data[0].projected_tax - 180.0).abs() < 0.5);
        assert_eq!(got.summary_metrics.projected_next_month, got.forecast_data[0].projected_tax);
    }

    #[tokio::test]
    async fn drafts_and_cancelled_carry_no_liability() {
        let store = InMemoryLedgerStore::new().with_invoices([
            invoice(d(2024, 1, 5), InvoiceStatus::Draft, 1_180.0),
            invoice(d(2024, 1, 6), InvoiceStatus::Cancelled, 1_180.0),
        ]);
        let got = tax_liability_report(&store, &FilterSpec::default(), &ScoringConfig::default())
            .await
            .unwrap();
        assert!(got.monthly_data.is_empty());
        assert!(got.forecast_data.is_empty());
        assert_eq!(got.summary_metrics.total_tax, 0.0);
        assert!(got.compliance_analysis.overall_status.is_empty());
    }

    #[tokio::test]
    async fn quarterly_rollup_sums_months() {
        let store = InMemoryLedgerStore::new().with_invoices([
            invoice(d(2024, 1, 5), InvoiceStatus::Paid, 1_180.0),
            invoice(d(2024, 3, 5), InvoiceStatus::Paid, 1_180.0),
            invoice(d(2024, 4, 5), InvoiceStatus::Paid, 1_180.0),
        ]);
        let got = tax_liability_report(&store, &FilterSpec::default(), &ScoringConfig::default())
            .await
            .unwrap();

        assert_eq!(got.quarterly_summary.len(), 2);
        assert_eq!(got.quarterly_summary[0].quarter, "2024-Q1");
        assert_eq!(got.quarterly_summary[0].invoice_count, 2);
        assert!((got.quarterly_summary[0].total_tax - 360.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn zero_tax_months_raise_an_opportunity() {
        let mut no_tax = invoice(d(2024, 1, 5), InvoiceStatus::Paid, 1_000.0);
        no_tax.cgst = 0.0;
        no_tax.sgst = 0.0;
        no_tax.subtotal = 1_000.0;

        let store = InMemoryLedgerStore::new().with_invoices([no_tax]);
        let got = tax_liability_report(&store, &FilterSpec::default(), &ScoringConfig::default())
            .await
            .unwrap();

        assert!(
            got.optimization_opportunities
                .iter()
                .any(|o| o.category == "Zero-tax anomaly review")
        );
        assert_eq!(got.compliance_analysis.flagged_months, vec!["2024-01"]);
    }
}
