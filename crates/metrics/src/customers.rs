//! Per-customer revenue analysis with scoring enrichment.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ledgeriq_core::{
    AnalyticsError, AnalyticsResult, CustomerId, FilterSpec, InvoiceStatus, Predicate,
};
use ledgeriq_scoring::{
    CustomerRiskInput, CustomerScoreInput, RiskTier, ScoringConfig, customer_risk_tier,
    customer_score, customer_tier,
};
use ledgeriq_store::LedgerStore;

use crate::util::{SortOrder, mean, months_between, pct};

/// Sort key for the customer listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomerSortKey {
    #[default]
    Revenue,
    Score,
    PaymentRate,
    InvoiceCount,
    OverdueAmount,
    Name,
}

impl core::str::FromStr for CustomerSortKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "revenue" => Ok(Self::Revenue),
            "score" => Ok(Self::Score),
            "paymentrate" | "payment_rate" => Ok(Self::PaymentRate),
            "invoicecount" | "invoice_count" => Ok(Self::InvoiceCount),
            "overdueamount" | "overdue_amount" => Ok(Self::OverdueAmount),
            "name" => Ok(Self::Name),
            other => Err(AnalyticsError::invalid_filter(format!(
                "unknown customer sort key: {other}"
            ))),
        }
    }
}

/// Listing options layered on top of the shared `FilterSpec`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerQuery {
    pub limit: Option<usize>,
    pub offset: usize,
    pub sort_by: CustomerSortKey,
    pub sort_order: SortOrder,
    pub search_term: Option<String>,
    pub segment: Option<String>,
    pub risk_level: Option<RiskTier>,
}

/// One enriched customer row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRow {
    pub customer_id: CustomerId,
    pub name: String,
    pub segment: Option<String>,
    pub total_revenue: f64,
    pub invoice_count: u64,
    pub paid_amount: f64,
    pub pending_amount: f64,
    pub overdue_amount: f64,
    pub overdue_count: u64,
    pub payment_rate: f64,
    pub avg_payment_days: f64,
    pub lifetime_months: f64,
    pub score: f64,
    pub tier: String,
    pub risk: RiskTier,
}

/// Per-customer fold with scoring, post-filtering, sorting and paging.
///
/// Contract: upstream query failures propagate. Caller-supplied options are
/// validated here, so silently falling back would mask bad input.
pub async fn customer_revenue_analysis(
    store: &dyn LedgerStore,
    filter: &FilterSpec,
    query: &CustomerQuery,
    config: &ScoringConfig,
    today: NaiveDate,
) -> AnalyticsResult<Vec<CustomerRow>> {
    let invoices = store
        .invoices(&Predicate::build(filter))
        .await
        .map_err(|e| e.context("customer revenue analysis"))?;

    // Lifetime is measured from the customer's first invoice in the whole
    // ledger, not the filter window, so narrow filters don't zero it out.
    let first_invoice: HashMap<CustomerId, NaiveDate> = store
        .invoices(&Predicate::default())
        .await
        .map_err(|e| e.context("customer revenue analysis (lifetime)"))?
        .into_iter()
        .fold(HashMap::new(), |mut acc, inv| {
            acc.entry(inv.customer_id)
                .and_modify(|d| *d = (*d).min(inv.invoice_date))
                .or_insert(inv.invoice_date);
            acc
        });

    let names: HashMap<CustomerId, (String, Option<String>)> = store
        .customers()
        .await
        .map_err(|e| e.context("customer revenue analysis (master data)"))?
        .into_iter()
        .map(|c| (c.id, (c.name, c.segment)))
        .collect();

    #[derive(Default)]
    struct Acc {
        revenue: f64,
        count: u64,
        paid_count: u64,
        paid_amount: f64,
        pending_amount: f64,
        overdue_amount: f64,
        overdue_count: u64,
        payment_days: Vec<f64>,
    }

    let mut per_customer: HashMap<CustomerId, Acc> = HashMap::new();
    for inv in &invoices {
        let acc = per_customer.entry(inv.customer_id).or_default();
        acc.revenue += inv.total_amount;
        acc.count += 1;
        match inv.status {
            InvoiceStatus::Paid => {
                acc.paid_count += 1;
                acc.paid_amount += inv.total_amount;
                if let Some(days) = inv.payment_days() {
                    acc.payment_days.push(days.max(0) as f64);
                }
            }
            InvoiceStatus::Pending => acc.pending_amount += inv.total_amount,
            InvoiceStatus::Overdue => {
                acc.overdue_amount += inv.total_amount;
                acc.overdue_count += 1;
            }
            InvoiceStatus::Draft | InvoiceStatus::Cancelled => {}
        }
    }

    let mut rows: Vec<CustomerRow> = per_customer
        .into_iter()
        .map(|(customer_id, acc)| {
            let payment_rate = pct(acc.paid_count as f64, acc.count as f64);
            let avg_payment_days = mean(&acc.payment_days);
            let lifetime_months = first_invoice
                .get(&customer_id)
                .map(|first| months_between(*first, today))
                .unwrap_or(0.0);

            let score = customer_score(
                &CustomerScoreInput {
                    total_revenue: acc.revenue,
                    payment_rate,
                    invoice_count: acc.count,
                    avg_payment_days,
                    lifetime_months,
                },
                config,
            );
            let risk = customer_risk_tier(
                &CustomerRiskInput {
                    payment_rate,
                    overdue_count: acc.overdue_count,
                    avg_payment_days,
                    overdue_amount: acc.overdue_amount,
                },
                config,
            );

            let (name, segment) = names
                .get(&customer_id)
                .cloned()
                .unwrap_or_else(|| (customer_id.to_string(), None));

            CustomerRow {
                customer_id,
                name,
                segment,
                total_revenue: acc.revenue,
                invoice_count: acc.count,
                paid_amount: acc.paid_amount,
                pending_amount: acc.pending_amount,
                overdue_amount: acc.overdue_amount,
                overdue_count: acc.overdue_count,
                payment_rate,
                avg_payment_days,
                lifetime_months,
                score,
                tier: customer_tier(score, acc.revenue, config).to_string(),
                risk,
            }
        })
        .collect();

    if let Some(term) = &query.search_term {
        let term = term.to_lowercase();
        rows.retain(|r| r.name.to_lowercase().contains(&term));
    }
    if let Some(segment) = &query.segment {
        rows.retain(|r| r.segment.as_deref() == Some(segment.as_str()));
    }
    if let Some(risk) = query.risk_level {
        rows.retain(|r| r.risk == risk);
    }

    sort_rows(&mut rows, query.sort_by, query.sort_order);

    Ok(rows
        .into_iter()
        .skip(query.offset)
        .take(query.limit.unwrap_or(usize::MAX))
        .collect())
}

fn sort_rows(rows: &mut [CustomerRow], key: CustomerSortKey, order: SortOrder) {
    // Ties break by total revenue descending so pages stay deterministic.
    rows.sort_by(|a, b| {
        let primary = match key {
            CustomerSortKey::Revenue => cmp_f64(a.total_revenue, b.total_revenue),
            CustomerSortKey::Score => cmp_f64(a.score, b.score),
            CustomerSortKey::PaymentRate => cmp_f64(a.payment_rate, b.payment_rate),
            CustomerSortKey::InvoiceCount => a.invoice_count.cmp(&b.invoice_count),
            CustomerSortKey::OverdueAmount => cmp_f64(a.overdue_amount, b.overdue_amount),
            CustomerSortKey::Name => a.name.cmp(&b.name),
        };
        let primary = match order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| cmp_f64(b.total_revenue, a.total_revenue))
    });
}

fn cmp_f64(a: f64, b: f64) -> core::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(core::cmp::Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{customer, d, invoice_for};
    use ledgeriq_core::CompanyId;
    use ledgeriq_store::InMemoryLedgerStore;

    fn seeded_store() -> (InMemoryLedgerStore, CustomerId, CustomerId) {
        let alice = CustomerId::new();
        let bob = CustomerId::new();
        let company = CompanyId::new();

        let store = InMemoryLedgerStore::new()
            .with_customers([customer(alice, "Alice Traders"), customer(bob, "Bob & Co")])
            .with_invoices([
                invoice_for(alice, company, d(2024, 1, 5), InvoiceStatus::Paid, 5000.0),
                invoice_for(alice, company, d(2024, 2, 5), InvoiceStatus::Paid, 7000.0),
                invoice_for(bob, company, d(2024, 1, 10), InvoiceStatus::Overdue, 3000.0),
                invoice_for(bob, company, d(2024, 2, 10), InvoiceStatus::Pending, 1000.0),
            ]);
        (store, alice, bob)
    }

    #[tokio::test]
    async fn folds_and_sorts_by_revenue_desc_by_default() {
        let (store, alice, _) = seeded_store();
        let rows = customer_revenue_analysis(
            &store,
            &FilterSpec::default(),
            &CustomerQuery::default(),
            &ScoringConfig::default(),
            d(2024, 3, 1),
        )
        .await
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].customer_id, alice);
        assert_eq!(rows[0].total_revenue, 12_000.0);
        assert_eq!(rows[0].payment_rate, 100.0);
        assert_eq!(rows[0].avg_payment_days, 15.0);
    }

    #[tokio::test]
    async fn search_and_risk_filters_compose() {
        let (store, _, bob) = seeded_store();
        let config = ScoringConfig::default();

        let query = CustomerQuery {
            search_term: Some("bob".to_string()),
            ..Default::default()
        };
        let rows = customer_revenue_analysis(
            &store,
            &FilterSpec::default(),
            &query,
            &config,
            d(2024, 3, 1),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_id, bob);

        // Bob has 0% payment rate → High risk.
        let query = CustomerQuery {
            risk_level: Some(RiskTier::High),
            ..Default::default()
        };
        let rows = customer_revenue_analysis(
            &store,
            &FilterSpec::default(),
            &query,
            &config,
            d(2024, 3, 1),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_id, bob);
    }

    #[tokio::test]
    async fn paging_applies_after_sorting() {
        let (store, _, bob) = seeded_store();
        let query = CustomerQuery {
            limit: Some(1),
            offset: 1,
            ..Default::default()
        };
        let rows = customer_revenue_analysis(
            &store,
            &FilterSpec::default(),
            &query,
            &ScoringConfig::default(),
            d(2024, 3, 1),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_id, bob);
    }

    #[tokio::test]
    async fn lifetime_survives_narrow_filters() {
        let (store, alice, _) = seeded_store();
        let filter = FilterSpec {
            start_date: Some(d(2024, 2, 1)),
            end_date: Some(d(2024, 2, 28)),
            ..Default::default()
        };
        let rows = customer_revenue_analysis(
            &store,
            &filter,
            &CustomerQuery::default(),
            &ScoringConfig::default(),
            d(2024, 3, 1),
        )
        .await
        .unwrap();

        let alice_row = rows.iter().find(|r| r.customer_id == alice).unwrap();
        // First invoice Jan 5 even though the filter starts in February.
        assert!(alice_row.lifetime_months > 1.5);
    }

    #[test]
    fn sort_key_parsing_rejects_unknown() {
        assert_eq!("score".parse::<CustomerSortKey>().unwrap(), CustomerSortKey::Score);
        assert!("velocity".parse::<CustomerSortKey>().is_err());
    }
}
