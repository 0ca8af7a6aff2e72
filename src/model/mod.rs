//! Dashboard model: selection state, filtered view, and the serializable
//! bundle consumed by the renderers.

pub mod aggregate;
pub mod filter;

pub use aggregate::{Aggregates, Bar};
pub use filter::{FilteredView, Selection};

use crate::clean::{CleanedTable, CleaningStats};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Presentation knobs that do not affect cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    pub title: String,
    pub currency: String,
    pub top_n: usize,
}

/// Distinct values offered by the filter widgets.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub cities: BTreeSet<String>,
    pub products: BTreeSet<String>,
}

/// One displayed row, with its derived fields resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub product_name: String,
    pub city: String,
    pub quantity_sold: u64,
    pub unit_price: f64,
    pub sale_date: Option<NaiveDate>,
    pub revenue: f64,
    pub profit: f64,
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub title: String,
    pub currency: String,
    pub margin: f64,
    pub top_n: usize,
    pub options: FilterOptions,
    pub selection: Selection,
    pub extra_columns: Vec<String>,
    pub aggregates: Aggregates,
    pub stats: CleaningStats,
    /// Rows of the filtered view.
    pub rows: Vec<RowView>,
}

/// Filter `table` by `selection` and compute everything the dashboard shows.
pub fn build_dashboard_data(
    table: &CleanedTable,
    stats: &CleaningStats,
    selection: &Selection,
    settings: &DashboardSettings,
) -> DashboardData {
    let view = FilteredView::new(table, selection);
    if view.is_empty() {
        debug!("selection matches no rows");
    } else {
        debug!(rows = view.len(), of = table.len(), "filtered view");
    }

    let rows = view
        .rows()
        .iter()
        .map(|r| RowView {
            product_name: r.product_name.clone(),
            city: r.city.clone(),
            quantity_sold: r.quantity_sold,
            unit_price: r.unit_price,
            sale_date: r.sale_date,
            revenue: r.revenue(),
            profit: view.profit_of(r),
            extra: r.extra.clone(),
        })
        .collect();

    DashboardData {
        title: settings.title.clone(),
        currency: settings.currency.clone(),
        margin: table.margin(),
        top_n: settings.top_n,
        options: FilterOptions {
            cities: table.distinct_cities(),
            products: table.distinct_products(),
        },
        selection: selection.clone(),
        extra_columns: table.extra_columns().to_vec(),
        aggregates: Aggregates::compute(&view, settings.top_n),
        stats: stats.clone(),
        rows,
    }
}
