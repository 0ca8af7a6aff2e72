//! Cleaning pipeline: raw table -> typed, validated sales records.
//!
//! Steps, in order:
//! 1. read the source (see `crate::source`)
//! 2. drop blank rows
//! 3. drop artifact columns (empty or `Unnamed...` headers)
//! 4. trim text fields, optionally title-case product names
//! 5. coerce quantity/price, applying the invalid-value policy
//! 6. parse the sale date
//! 7. strict mode: require all fields and strictly positive numerics
//!
//! Revenue and profit are derived from the kept records, never stored.

pub mod coerce;
pub mod record;

pub use record::{CleanedTable, SalesRecord};

use crate::source::{RawRow, RawTable};
use anyhow::{Context, bail};
use coerce::Numeric;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

pub const PRODUCT_NAME: &str = "Product_Name";
pub const CITY: &str = "City";
pub const QUANTITY_SOLD: &str = "Quantity_Sold";
pub const UNIT_PRICE: &str = "Unit_Price";
pub const SALE_DATE: &str = "Sale_Date";

const REQUIRED_COLUMNS: [&str; 5] = [PRODUCT_NAME, CITY, QUANTITY_SOLD, UNIT_PRICE, SALE_DATE];

/// Fixed share of revenue reported as profit.
pub const DEFAULT_MARGIN: f64 = 0.30;

/// Headers produced by spreadsheet exports for index/blank columns.
const ARTIFACT_HEADER_RE: &str = r"^(Unnamed.*)?$";

/// What to do with a quantity or price that is empty or unparseable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum NumericPolicy {
    /// Remove the row from the cleaned table.
    #[default]
    Drop,
    /// Keep the row with the value replaced by zero.
    #[value(name = "zero")]
    ZeroFill,
}

/// Casing applied to product names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum NameCase {
    #[default]
    Title,
    Preserve,
}

impl NameCase {
    pub fn apply(self, name: &str) -> String {
        let name = name.trim();
        match self {
            NameCase::Title => coerce::title_case(name),
            NameCase::Preserve => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanOptions {
    pub delimiter: Option<u8>,
    pub on_invalid: NumericPolicy,
    pub name_case: NameCase,
    pub strict: bool,
    pub margin: f64,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            on_invalid: NumericPolicy::default(),
            name_case: NameCase::default(),
            strict: false,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl CleanOptions {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.margin.is_finite() || !(0.0..=1.0).contains(&self.margin) {
            bail!("margin must be between 0 and 1, got {}", self.margin);
        }
        Ok(())
    }
}

/// Counts of everything the pipeline dropped or neutralized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningStats {
    pub rows_read: usize,
    pub empty_rows_dropped: usize,
    pub dropped_columns: Vec<String>,
    /// Quantity cells that were empty or unparseable.
    pub rejected_quantity: usize,
    /// Price cells that were empty or unparseable.
    pub rejected_price: usize,
    pub zero_filled: usize,
    pub numeric_rows_dropped: usize,
    pub unparsed_dates: usize,
    pub strict_rows_dropped: usize,
    pub rows_kept: usize,
}

#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: CleanedTable,
    pub stats: CleaningStats,
}

/// Read `path` and run the full cleaning pipeline over it.
pub fn load_and_clean(path: &Path, opts: &CleanOptions) -> anyhow::Result<Cleaned> {
    opts.validate()?;
    let raw = crate::source::read_table(path, opts.delimiter)?;
    let cleaned =
        clean(raw, opts).with_context(|| format!("clean input file {}", path.display()))?;

    info!(
        path = %path.display(),
        rows_read = cleaned.stats.rows_read,
        rows_kept = cleaned.table.len(),
        "loaded sales table"
    );
    Ok(cleaned)
}

/// Column positions resolved once per table.
struct Layout {
    product: usize,
    city: usize,
    quantity: usize,
    price: usize,
    date: usize,
    extra: Vec<usize>,
}

/// Clean an already-read table. Fails only when a required column is absent.
pub fn clean(raw: RawTable, opts: &CleanOptions) -> anyhow::Result<Cleaned> {
    let mut stats = CleaningStats {
        rows_read: raw.rows.len(),
        ..CleaningStats::default()
    };

    // Step 3 first: blankness is judged over the columns that survive it.
    let artifact = Regex::new(ARTIFACT_HEADER_RE)?;
    let mut kept_columns = Vec::new();
    for (idx, header) in raw.headers.iter().enumerate() {
        if artifact.is_match(header) {
            stats.dropped_columns.push(header.clone());
        } else {
            kept_columns.push(idx);
        }
    }

    // Step 2: a row holding only an exported index cell counts as blank.
    let rows: Vec<RawRow> = raw
        .rows
        .iter()
        .filter(|r| !r.is_blank_in(&kept_columns))
        .cloned()
        .collect();
    stats.empty_rows_dropped = stats.rows_read - rows.len();

    let layout = resolve_layout(&raw, &kept_columns)?;
    let extra_columns: Vec<String> = layout
        .extra
        .iter()
        .map(|&i| raw.headers[i].clone())
        .collect();

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        if let Some(record) = clean_row(row, &layout, opts, &mut stats) {
            records.push(record);
        }
    }
    stats.rows_kept = records.len();

    report(&stats, opts);
    Ok(Cleaned {
        table: CleanedTable::new(records, extra_columns, opts.margin),
        stats,
    })
}

fn resolve_layout(raw: &RawTable, kept: &[usize]) -> anyhow::Result<Layout> {
    let find = |name: &str| raw.column(name).filter(|i| kept.contains(i));
    let found = REQUIRED_COLUMNS.map(find);

    let [Some(product), Some(city), Some(quantity), Some(price), Some(date)] = found else {
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .zip(found)
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| *name)
            .collect();
        bail!(
            "missing required column(s): {} (found: {})",
            missing.join(", "),
            raw.headers.join(", ")
        );
    };

    let core = [product, city, quantity, price, date];
    Ok(Layout {
        product,
        city,
        quantity,
        price,
        date,
        extra: kept.iter().copied().filter(|i| !core.contains(i)).collect(),
    })
}

/// Steps 4-7 for one row. `None` means the row is dropped.
fn clean_row(
    row: &RawRow,
    layout: &Layout,
    opts: &CleanOptions,
    stats: &mut CleaningStats,
) -> Option<SalesRecord> {
    let product_name = opts.name_case.apply(row.cell(layout.product));
    let city = row.cell(layout.city).trim().to_string();

    let quantity = coerce::parse_quantity(row.cell(layout.quantity));
    let price = coerce::parse_price(row.cell(layout.price));

    if !matches!(quantity, Numeric::Value(_)) {
        stats.rejected_quantity += 1;
        debug!(line = row.line, value = row.cell(layout.quantity), "bad quantity");
    }
    if !matches!(price, Numeric::Value(_)) {
        stats.rejected_price += 1;
        debug!(line = row.line, value = row.cell(layout.price), "bad unit price");
    }

    let (quantity_sold, unit_price) = match (quantity, price, opts.on_invalid) {
        (Numeric::Value(q), Numeric::Value(p), _) => (q, p),
        (_, _, NumericPolicy::Drop) => {
            stats.numeric_rows_dropped += 1;
            return None;
        }
        (q, p, NumericPolicy::ZeroFill) => (
            resolve_zero(q, 0, stats),
            resolve_zero(p, 0.0, stats),
        ),
    };

    let sale_date = coerce::parse_date(row.cell(layout.date));
    if sale_date.is_none() {
        stats.unparsed_dates += 1;
    }

    if opts.strict && (quantity_sold == 0 || unit_price <= 0.0 || sale_date.is_none()) {
        stats.strict_rows_dropped += 1;
        return None;
    }

    Some(SalesRecord {
        product_name,
        city,
        quantity_sold,
        unit_price,
        sale_date,
        extra: layout
            .extra
            .iter()
            .map(|&i| row.cell(i).trim().to_string())
            .collect(),
    })
}

fn resolve_zero<T>(value: Numeric<T>, zero: T, stats: &mut CleaningStats) -> T {
    match value {
        Numeric::Value(v) => v,
        Numeric::Missing | Numeric::Invalid => {
            stats.zero_filled += 1;
            zero
        }
    }
}

fn report(stats: &CleaningStats, opts: &CleanOptions) {
    if stats.empty_rows_dropped > 0 {
        debug!(count = stats.empty_rows_dropped, "dropped blank rows");
    }
    if !stats.dropped_columns.is_empty() {
        debug!(columns = ?stats.dropped_columns, "dropped artifact columns");
    }
    if stats.rejected_quantity + stats.rejected_price > 0 {
        let action = match opts.on_invalid {
            NumericPolicy::Drop => "rows dropped",
            NumericPolicy::ZeroFill => "cells zero-filled",
        };
        warn!(
            quantity = stats.rejected_quantity,
            price = stats.rejected_price,
            "missing or unparseable numeric cells ({})",
            action
        );
    }
    if stats.unparsed_dates > 0 {
        warn!(count = stats.unparsed_dates, "rows without a parseable sale date");
    }
    if stats.strict_rows_dropped > 0 {
        info!(count = stats.strict_rows_dropped, "rows dropped by strict mode");
    }
}
