//! `ledgeriq-engine` — the analytics facade.
//!
//! One method per exposed operation. Each runs cache-aside over the shared
//! `TtlCache`, delegates to the aggregator family and applies the
//! per-operation failure policy: summary, revenue, customer analysis,
//! company split and the tax report propagate upstream failures; status
//! distribution, top items, aging and delay analysis degrade to their
//! documented empty shapes so dependent UI never crashes. Alert sub-fetches
//! are isolated individually.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use ledgeriq_cache::TtlCache;
use ledgeriq_core::{AnalyticsResult, FilterSpec, Period};
use ledgeriq_insights::{AlertContext, AlertFeed, default_rules, run_rules};
use ledgeriq_metrics::{
    AgingReport, CompanySplit, CustomerQuery, CustomerRow, DelayAnalysis, ItemsQuery,
    RevenuePoint, StatusDistribution, SummaryMetrics, TaxReport, TopItems,
};
use ledgeriq_scoring::ScoringConfig;
use ledgeriq_store::LedgerStore;

/// Process-local analytics engine over one ledger store.
pub struct AnalyticsEngine {
    store: Arc<dyn LedgerStore>,
    cache: TtlCache,
    config: ScoringConfig,
    today_override: Option<NaiveDate>,
}

impl AnalyticsEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            cache: TtlCache::new(),
            config: ScoringConfig::default(),
            today_override: None,
        }
    }

    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cache(mut self, cache: TtlCache) -> Self {
        self.cache = cache;
        self
    }

    /// Pin the reference date for age/delay math (deterministic tests,
    /// replaying historical windows).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today_override = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today_override.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    /// Headline KPI block. Propagates upstream failures.
    pub async fn summary_metrics(&self, filter: &FilterSpec) -> AnalyticsResult<SummaryMetrics> {
        let key = format!("summary|{}", filter.canonical_key());
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key, "cache hit");
            return Ok(hit);
        }
        let value = ledgeriq_metrics::summary_metrics(self.store(), filter, self.today()).await?;
        self.cache.set(&key, &value);
        Ok(value)
    }

    /// Revenue series bucketed by `period`. Propagates upstream failures.
    pub async fn revenue_over_time(
        &self,
        filter: &FilterSpec,
        period: Period,
    ) -> AnalyticsResult<Vec<RevenuePoint>> {
        let key = format!(
            "revenue|{}|{}",
            filter.canonical_key(),
            serde_json::to_string(&period).unwrap_or_default()
        );
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key, "cache hit");
            return Ok(hit);
        }
        let value = ledgeriq_metrics::revenue_over_time(self.store(), filter, period).await?;
        self.cache.set(&key, &value);
        Ok(value)
    }

    /// Status distribution with aging cross-tab. Degrades to the
    /// well-shaped empty distribution on failure.
    pub async fn invoice_status_distribution(&self, filter: &FilterSpec) -> StatusDistribution {
        let key = format!("status|{}", filter.canonical_key());
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key, "cache hit");
            return hit;
        }
        match ledgeriq_metrics::invoice_status_distribution(self.store(), filter, self.today())
            .await
        {
            Ok(value) => {
                self.cache.set(&key, &value);
                value
            }
            Err(err) => {
                tracing::warn!(%err, "status distribution degraded to empty shape");
                StatusDistribution::empty()
            }
        }
    }

    /// Enriched customer listing. Propagates upstream failures (listing
    /// options are caller input; masking them would hide bad requests).
    pub async fn customer_revenue_analysis(
        &self,
        filter: &FilterSpec,
        query: &CustomerQuery,
    ) -> AnalyticsResult<Vec<CustomerRow>> {
        let key = format!(
            "customers|{}|{}",
            filter.canonical_key(),
            serde_json::to_string(query).unwrap_or_default()
        );
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key, "cache hit");
            return Ok(hit);
        }
        let value = ledgeriq_metrics::customer_revenue_analysis(
            self.store(),
            filter,
            query,
            &self.config,
            self.today(),
        )
        .await?;
        self.cache.set(&key, &value);
        Ok(value)
    }

    /// Per-company analysis with peer benchmarks. Propagates upstream
    /// failures.
    pub async fn company_split(&self, filter: &FilterSpec) -> AnalyticsResult<CompanySplit> {
        let key = format!("companies|{}", filter.canonical_key());
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key, "cache hit");
            return Ok(hit);
        }
        let value =
            ledgeriq_metrics::company_split(self.store(), filter, &self.config, self.today())
                .await?;
        self.cache.set(&key, &value);
        Ok(value)
    }

    /// Item ranking over the line-item join. Degrades to an empty listing
    /// on failure.
    pub async fn top_items_analysis(&self, filter: &FilterSpec, query: &ItemsQuery) -> TopItems {
        let key = format!(
            "items|{}|{}",
            filter.canonical_key(),
            serde_json::to_string(query).unwrap_or_default()
        );
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key, "cache hit");
            return hit;
        }
        match ledgeriq_metrics::top_items_analysis(
            self.store(),
            filter,
            query,
            &self.config,
            self.today(),
        )
        .await
        {
            Ok(value) => {
                self.cache.set(&key, &value);
                value
            }
            Err(err) => {
                tracing::warn!(%err, "top items degraded to empty listing");
                TopItems::empty(query)
            }
        }
    }

    /// Full tax report with forecast. Propagates upstream failures.
    pub async fn tax_liability_report(&self, filter: &FilterSpec) -> AnalyticsResult<TaxReport> {
        let key = format!("tax|{}", filter.canonical_key());
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key, "cache hit");
            return Ok(hit);
        }
        let value =
            ledgeriq_metrics::tax_liability_report(self.store(), filter, &self.config).await?;
        self.cache.set(&key, &value);
        Ok(value)
    }

    /// Receivables aging report. Degrades to the all-buckets-zero shape on
    /// failure.
    pub async fn invoice_aging_report(&self, filter: &FilterSpec) -> AgingReport {
        let key = format!("aging|{}", filter.canonical_key());
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key, "cache hit");
            return hit;
        }
        match ledgeriq_metrics::invoice_aging_report(self.store(), filter, self.today()).await {
            Ok(value) => {
                self.cache.set(&key, &value);
                value
            }
            Err(err) => {
                tracing::warn!(%err, "aging report degraded to empty shape");
                AgingReport::empty()
            }
        }
    }

    /// Payment punctuality analysis. Degrades to the twelve-zero-months
    /// shape on failure.
    pub async fn payment_delay_analysis(&self, filter: &FilterSpec) -> DelayAnalysis {
        let key = format!("delays|{}", filter.canonical_key());
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(key, "cache hit");
            return hit;
        }
        match ledgeriq_metrics::payment_delay_analysis(
            self.store(),
            filter,
            &self.config,
            self.today(),
        )
        .await
        {
            Ok(value) => {
                self.cache.set(&key, &value);
                value
            }
            Err(err) => {
                tracing::warn!(%err, "delay analysis degraded to empty shape");
                DelayAnalysis::empty(&self.config, self.today())
            }
        }
    }

    /// Prioritized alert feed. Each sub-fetch is isolated: a failing
    /// aggregate contributes its empty shape and the rules still run.
    /// Alerts are constructed fresh per request and never cached.
    pub async fn smart_alerts(&self, filter: &FilterSpec) -> AlertFeed {
        let today = self.today();

        let summary = match ledgeriq_metrics::summary_metrics(self.store(), filter, today).await {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(%err, "alert context: summary unavailable");
                SummaryMetrics::default()
            }
        };
        let prior_summary = match filter.prior_window() {
            Some(prior) => ledgeriq_metrics::summary_metrics(self.store(), &prior, today)
                .await
                .ok(),
            None => None,
        };
        let aging = self.invoice_aging_report(filter).await;
        let delays = self.payment_delay_analysis(filter).await;
        let items = self.top_items_analysis(filter, &ItemsQuery::default()).await;
        let customers = match self
            .customer_revenue_analysis(filter, &CustomerQuery::default())
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(%err, "alert context: customer analysis unavailable");
                Vec::new()
            }
        };

        let ctx = AlertContext {
            summary,
            prior_summary,
            aging,
            customers,
            items,
            delays,
            benchmarks: self.config.benchmarks.clone(),
            today,
        };
        AlertFeed::from_alerts(run_rules(&default_rules(), &ctx))
    }

    /// Administrative cache-busting: drop every cached metric.
    pub fn clear_cache(&self) {
        self.cache.clear(None);
    }
}
