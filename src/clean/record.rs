use chrono::NaiveDate;
use std::collections::BTreeSet;

/// One cleaned sales row. Revenue and profit are derived on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub product_name: String,
    pub city: String,
    pub quantity_sold: u64,
    pub unit_price: f64,
    pub sale_date: Option<NaiveDate>,
    /// Values of the table's extra columns, aligned with `CleanedTable::extra_columns`.
    pub extra: Vec<String>,
}

impl SalesRecord {
    pub fn revenue(&self) -> f64 {
        self.quantity_sold as f64 * self.unit_price
    }

    pub fn profit(&self, margin: f64) -> f64 {
        self.revenue() * margin
    }
}

/// The pipeline's output. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    records: Vec<SalesRecord>,
    extra_columns: Vec<String>,
    margin: f64,
}

impl CleanedTable {
    pub(crate) fn new(records: Vec<SalesRecord>, extra_columns: Vec<String>, margin: f64) -> Self {
        Self {
            records,
            extra_columns,
            margin,
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Non-core columns carried through for display, in source order.
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Profit margin applied to revenue.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn profit_of(&self, record: &SalesRecord) -> f64 {
        record.profit(self.margin)
    }

    pub fn distinct_cities(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.city.clone()).collect()
    }

    pub fn distinct_products(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.product_name.clone()).collect()
    }
}
