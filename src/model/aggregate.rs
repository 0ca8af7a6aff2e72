//! Sums and group-bys over a filtered view. An empty view yields zeros and
//! empty series.

use crate::model::filter::FilteredView;
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

/// One labelled value in a chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar<T> {
    pub label: String,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub units_sold: u64,
    pub revenue: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub kpis: Kpis,
    pub top_products_by_units: Vec<Bar<u64>>,
    pub units_by_city: Vec<Bar<u64>>,
    pub monthly_units: Vec<Bar<u64>>,
    pub top_products_by_profit: Vec<Bar<f64>>,
}

impl Aggregates {
    pub fn compute(view: &FilteredView<'_>, top_n: usize) -> Self {
        Self {
            kpis: kpis(view),
            top_products_by_units: top_products_by_units(view, top_n),
            units_by_city: units_by_city(view),
            monthly_units: monthly_units(view),
            top_products_by_profit: top_products_by_profit(view, top_n),
        }
    }
}

pub fn kpis(view: &FilteredView<'_>) -> Kpis {
    let mut out = Kpis {
        units_sold: 0,
        revenue: 0.0,
        profit: 0.0,
    };
    for r in view.rows() {
        out.units_sold = out.units_sold.saturating_add(r.quantity_sold);
        out.revenue += r.revenue();
        out.profit += view.profit_of(r);
    }
    out
}

pub fn top_products_by_units(view: &FilteredView<'_>, n: usize) -> Vec<Bar<u64>> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for r in view.rows() {
        let total = totals.entry(r.product_name.as_str()).or_default();
        *total = total.saturating_add(r.quantity_sold);
    }
    top_n(totals, n)
}

pub fn top_products_by_profit(view: &FilteredView<'_>, n: usize) -> Vec<Bar<f64>> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for r in view.rows() {
        *totals.entry(r.product_name.as_str()).or_default() += view.profit_of(r);
    }
    top_n(totals, n)
}

/// Units per city, ordered by city name.
pub fn units_by_city(view: &FilteredView<'_>) -> Vec<Bar<u64>> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for r in view.rows() {
        let total = totals.entry(r.city.as_str()).or_default();
        *total = total.saturating_add(r.quantity_sold);
    }
    totals
        .into_iter()
        .map(|(label, value)| Bar {
            label: label.to_string(),
            value,
        })
        .collect()
}

/// Units per calendar month ("YYYY-MM"), ascending. Undated rows are skipped.
pub fn monthly_units(view: &FilteredView<'_>) -> Vec<Bar<u64>> {
    let mut totals: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for r in view.rows() {
        if let Some(d) = r.sale_date {
            let total = totals.entry((d.year(), d.month())).or_default();
            *total = total.saturating_add(r.quantity_sold);
        }
    }
    totals
        .into_iter()
        .map(|((y, m), value)| Bar {
            label: format!("{:04}-{:02}", y, m),
            value,
        })
        .collect()
}

/// Largest `n` values, descending; ties keep name order.
fn top_n<T: PartialOrd + Copy>(totals: BTreeMap<&str, T>, n: usize) -> Vec<Bar<T>> {
    let mut bars: Vec<Bar<T>> = totals
        .into_iter()
        .map(|(label, value)| Bar {
            label: label.to_string(),
            value,
        })
        .collect();
    bars.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    bars.truncate(n);
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::{CleanOptions, CleanedTable, SalesRecord, clean};
    use crate::model::filter::Selection;
    use crate::source::read::parse_table;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn table(body: &str) -> CleanedTable {
        let raw = parse_table(
            &format!("Product_Name,City,Quantity_Sold,Unit_Price,Sale_Date\n{body}"),
            None,
        )
        .unwrap();
        clean(raw, &CleanOptions::default()).unwrap().table
    }

    fn bar<T>(label: &str, value: T) -> Bar<T> {
        Bar {
            label: label.to_string(),
            value,
        }
    }

    #[test]
    fn city_units_are_summed() {
        let t = table("A,Pune,3,10,2024-01-01\nB,Pune,7,10,2024-01-02\nA,Delhi,1,10,2024-01-03\n");
        let view = FilteredView::new(&t, &Selection::all(&t));
        assert_eq!(
            units_by_city(&view),
            vec![bar("Delhi", 1), bar("Pune", 10)]
        );
    }

    #[test]
    fn months_are_bucketed() {
        let t = table("A,Pune,2,10,2024-01-05\nA,Pune,4,10,2024-01-20\nA,Pune,1,10,2023-12-31\nA,Pune,9,10,\n");
        let view = FilteredView::new(&t, &Selection::all(&t));
        assert_eq!(
            monthly_units(&view),
            vec![bar("2023-12", 1), bar("2024-01", 6)]
        );
    }

    #[test]
    fn kpis_sum_the_view() {
        let t = table("A,Pune,5,1000,2024-01-15\nB,Delhi,2,50,2024-01-16\n");
        let view = FilteredView::new(&t, &Selection::all(&t));
        let k = kpis(&view);
        assert_eq!(k.units_sold, 7);
        assert_eq!(k.revenue, 5100.0);
        assert_eq!(k.profit, 5000.0 * 0.30 + 100.0 * 0.30);
    }

    #[test]
    fn top_products_are_ranked_and_truncated() {
        let t = table(
            "A,X,1,10,2024-01-01\nB,X,5,1,2024-01-01\nC,X,5,2,2024-01-01\nA,Y,2,10,2024-01-01\nD,Y,1,1,2024-01-01\n",
        );
        let view = FilteredView::new(&t, &Selection::all(&t));

        assert_eq!(
            top_products_by_units(&view, 3),
            vec![bar("B", 5), bar("C", 5), bar("A", 3)]
        );
        let by_profit: Vec<String> = top_products_by_profit(&view, 2)
            .into_iter()
            .map(|b| b.label)
            .collect();
        assert_eq!(by_profit, vec!["A", "C"]);
    }

    #[test]
    fn empty_view_degrades_to_zeros() {
        let t = table("A,Pune,5,1000,2024-01-15\n");
        let selection = Selection {
            cities: BTreeSet::new(),
            products: BTreeSet::new(),
        };
        let view = FilteredView::new(&t, &selection);
        let agg = Aggregates::compute(&view, 10);

        assert_eq!(
            agg.kpis,
            Kpis {
                units_sold: 0,
                revenue: 0.0,
                profit: 0.0
            }
        );
        assert!(agg.top_products_by_units.is_empty());
        assert!(agg.units_by_city.is_empty());
        assert!(agg.monthly_units.is_empty());
        assert!(agg.top_products_by_profit.is_empty());
    }

    #[test]
    fn unit_totals_saturate_instead_of_overflowing() {
        let record = |product: &str| SalesRecord {
            product_name: product.to_string(),
            city: "Pune".to_string(),
            quantity_sold: u64::MAX,
            unit_price: 1.0,
            sale_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
            extra: Vec::new(),
        };
        let t = CleanedTable::new(vec![record("A"), record("A"), record("B")], Vec::new(), 0.3);
        let view = FilteredView::new(&t, &Selection::all(&t));
        let agg = Aggregates::compute(&view, 10);

        assert_eq!(agg.kpis.units_sold, u64::MAX);
        assert_eq!(agg.units_by_city, vec![bar("Pune", u64::MAX)]);
        assert_eq!(agg.monthly_units, vec![bar("2024-01", u64::MAX)]);
        assert_eq!(
            agg.top_products_by_units,
            vec![bar("A", u64::MAX), bar("B", u64::MAX)]
        );
    }
}
