//! Top-items analysis over the line-item join.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ledgeriq_core::{
    AnalyticsError, AnalyticsResult, CustomerId, FilterSpec, InvoiceId, ItemId, Predicate,
    filter::month_key,
};
use ledgeriq_scoring::{ItemScoreInput, ScoringConfig, item_performance_score};
use ledgeriq_store::LedgerStore;

use crate::util::{SortOrder, mean, pct};

/// Sort key for the item listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemSortKey {
    #[default]
    Revenue,
    Profit,
    Quantity,
    Margin,
    Recency,
    Name,
}

impl core::str::FromStr for ItemSortKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "revenue" => Ok(Self::Revenue),
            "profit" => Ok(Self::Profit),
            "quantity" => Ok(Self::Quantity),
            "margin" => Ok(Self::Margin),
            "recency" => Ok(Self::Recency),
            "name" => Ok(Self::Name),
            other => Err(AnalyticsError::invalid_filter(format!(
                "unknown item sort key: {other}"
            ))),
        }
    }
}

/// Listing options layered on top of the shared `FilterSpec`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemsQuery {
    pub limit: Option<usize>,
    pub sort_by: ItemSortKey,
    pub sort_order: SortOrder,
}

/// One catalog item with its sales aggregates and derived signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    pub item_id: ItemId,
    pub name: String,
    pub category: Option<String>,
    pub total_revenue: f64,
    pub total_quantity: f64,
    pub invoice_count: u64,
    pub customer_count: u64,
    /// Profit against an estimated unit cost (cost ratio of the list price).
    pub estimated_profit: f64,
    pub margin_pct: f64,
    pub last_sale_date: Option<NaiveDate>,
    pub days_since_last_sale: Option<i64>,
    pub performance_score: f64,
    /// growing / declining / stable within the analysis window.
    pub demand_trend: String,
    pub growth_potential: String,
    /// seasonal when one month dominates, steady otherwise.
    pub seasonality: String,
    pub reorder_recommended: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopItemsSummary {
    pub total_items: u64,
    pub total_revenue: f64,
    pub avg_performance_score: f64,
}

/// Echo of the listing options so consumers can label the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopItemsMetadata {
    pub sort_by: ItemSortKey,
    pub sort_order: SortOrder,
    pub limit: Option<usize>,
    pub total_matching: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopItems {
    pub items: Vec<ItemRow>,
    pub summary: TopItemsSummary,
    pub metadata: TopItemsMetadata,
}

impl TopItems {
    /// Degraded shape used when the line-item join fails.
    pub fn empty(query: &ItemsQuery) -> Self {
        Self {
            metadata: TopItemsMetadata {
                sort_by: query.sort_by,
                sort_order: query.sort_order,
                limit: query.limit,
                total_matching: 0,
            },
            ..Default::default()
        }
    }
}

/// Join line items against their invoices and rank catalog items.
///
/// Returns `Err` on store failure; the engine degrades it to
/// `TopItems::empty()`.
pub async fn top_items_analysis(
    store: &dyn LedgerStore,
    filter: &FilterSpec,
    query: &ItemsQuery,
    config: &ScoringConfig,
    today: NaiveDate,
) -> AnalyticsResult<TopItems> {
    let invoices = store
        .invoices(&Predicate::build(filter))
        .await
        .map_err(|e| e.context("top items"))?;
    let invoice_ids: Vec<InvoiceId> = invoices.iter().map(|i| i.id).collect();
    let lines = store
        .line_items(&invoice_ids)
        .await
        .map_err(|e| e.context("top items (line items)"))?;
    let master: HashMap<ItemId, (String, Option<String>, f64)> = store
        .items()
        .await
        .map_err(|e| e.context("top items (master data)"))?
        .into_iter()
        .map(|i| (i.id, (i.name, i.category, i.selling_price)))
        .collect();

    let invoice_meta: HashMap<InvoiceId, (NaiveDate, CustomerId)> = invoices
        .iter()
        .map(|i| (i.id, (i.invoice_date, i.customer_id)))
        .collect();
    let window_mid = window_midpoint(&invoices.iter().map(|i| i.invoice_date).collect::<Vec<_>>());

    #[derive(Default)]
    struct Acc {
        revenue: f64,
        quantity: f64,
        cost: f64,
        invoices: HashSet<InvoiceId>,
        customers: HashSet<CustomerId>,
        last_sale: Option<NaiveDate>,
        early_revenue: f64,
        late_revenue: f64,
        by_month: BTreeMap<String, f64>,
    }

    let mut per_item: HashMap<ItemId, Acc> = HashMap::new();
    for line in &lines {
        let Some(&(date, customer)) = invoice_meta.get(&line.invoice_id) else {
            continue;
        };
        let unit_cost = master
            .get(&line.item_id)
            .map(|(_, _, price)| price * config.benchmarks.item_cost_ratio)
            .unwrap_or(line.rate * config.benchmarks.item_cost_ratio);

        let acc = per_item.entry(line.item_id).or_default();
        acc.revenue += line.amount;
        acc.quantity += line.quantity;
        acc.cost += line.quantity * unit_cost;
        acc.invoices.insert(line.invoice_id);
        acc.customers.insert(customer);
        acc.last_sale = Some(acc.last_sale.map_or(date, |d| d.max(date)));
        *acc.by_month.entry(month_key(date)).or_insert(0.0) += line.amount;
        if window_mid.is_some_and(|mid| date > mid) {
            acc.late_revenue += line.amount;
        } else {
            acc.early_revenue += line.amount;
        }
    }

    let mut rows: Vec<ItemRow> = per_item
        .into_iter()
        .map(|(item_id, acc)| {
            let profit = acc.revenue - acc.cost;
            let margin_pct = pct(profit, acc.revenue);
            let days_since_last_sale = acc.last_sale.map(|d| (today - d).num_days());
            let trend = demand_trend(acc.early_revenue, acc.late_revenue);

            let score = item_performance_score(
                &ItemScoreInput {
                    revenue: acc.revenue,
                    margin_pct,
                    invoice_count: acc.invoices.len() as u64,
                    customer_count: acc.customers.len() as u64,
                    days_since_last_sale,
                },
                config,
            );

            let (name, category, _) = master
                .get(&item_id)
                .cloned()
                .unwrap_or_else(|| (item_id.to_string(), None, 0.0));

            ItemRow {
                item_id,
                name,
                category,
                total_revenue: acc.revenue,
                total_quantity: acc.quantity,
                invoice_count: acc.invoices.len() as u64,
                customer_count: acc.customers.len() as u64,
                estimated_profit: profit,
                margin_pct,
                last_sale_date: acc.last_sale,
                days_since_last_sale,
                performance_score: score,
                growth_potential: growth_potential(score, trend).to_string(),
                seasonality: seasonality(&acc.by_month).to_string(),
                reorder_recommended: trend == "growing"
                    && days_since_last_sale.is_some_and(|d| d <= 30),
                demand_trend: trend.to_string(),
            }
        })
        .collect();

    sort_rows(&mut rows, query.sort_by, query.sort_order);
    let total_matching = rows.len() as u64;
    let items: Vec<ItemRow> = rows
        .into_iter()
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();

    let scores: Vec<f64> = items.iter().map(|r| r.performance_score).collect();
    Ok(TopItems {
        summary: TopItemsSummary {
            total_items: items.len() as u64,
            total_revenue: items.iter().map(|r| r.total_revenue).sum(),
            avg_performance_score: mean(&scores),
        },
        metadata: TopItemsMetadata {
            sort_by: query.sort_by,
            sort_order: query.sort_order,
            limit: query.limit,
            total_matching,
        },
        items,
    })
}

fn window_midpoint(dates: &[NaiveDate]) -> Option<NaiveDate> {
    let first = dates.iter().min()?;
    let last = dates.iter().max()?;
    Some(*first + (*last - *first) / 2)
}

/// Second half of the window against the first, with a 20% dead band.
fn demand_trend(early: f64, late: f64) -> &'static str {
    if early <= 0.0 && late <= 0.0 {
        "stable"
    } else if late > early * 1.2 {
        "growing"
    } else if late < early * 0.8 {
        "declining"
    } else {
        "stable"
    }
}

fn growth_potential(score: f64, trend: &str) -> &'static str {
    if score >= 70.0 && trend == "growing" {
        "High"
    } else if score >= 50.0 || trend == "growing" {
        "Medium"
    } else {
        "Low"
    }
}

/// Seasonal when the strongest month carries more than double the average
/// monthly revenue (needs at least three months of history to judge).
fn seasonality(by_month: &BTreeMap<String, f64>) -> &'static str {
    if by_month.len() < 3 {
        return "steady";
    }
    let total: f64 = by_month.values().sum();
    let avg = total / by_month.len() as f64;
    let max = by_month.values().cloned().fold(0.0, f64::max);
    if avg > 0.0 && max > avg * 2.0 {
        "seasonal"
    } else {
        "steady"
    }
}

fn sort_rows(rows: &mut [ItemRow], key: ItemSortKey, order: SortOrder) {
    rows.sort_by(|a, b| {
        let primary = match key {
            ItemSortKey::Revenue => cmp_f64(a.total_revenue, b.total_revenue),
            ItemSortKey::Profit => cmp_f64(a.estimated_profit, b.estimated_profit),
            ItemSortKey::Quantity => cmp_f64(a.total_quantity, b.total_quantity),
            ItemSortKey::Margin => cmp_f64(a.margin_pct, b.margin_pct),
            // None sorts lowest, so the default descending order puts the
            // most recent sale first and never-sold items last.
            ItemSortKey::Recency => a.last_sale_date.cmp(&b.last_sale_date),
            ItemSortKey::Name => a.name.cmp(&b.name),
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
