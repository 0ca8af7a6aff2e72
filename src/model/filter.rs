use crate::clean::{CleanedTable, SalesRecord};
use serde::Serialize;
use std::collections::BTreeSet;

/// The user's current filter choices. An empty set selects nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Selection {
    pub cities: BTreeSet<String>,
    pub products: BTreeSet<String>,
}

impl Selection {
    /// Every city and product present in the table.
    pub fn all(table: &CleanedTable) -> Self {
        Self {
            cities: table.distinct_cities(),
            products: table.distinct_products(),
        }
    }

    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.cities.contains(&record.city) && self.products.contains(&record.product_name)
    }
}

/// Rows of a cleaned table that pass a selection, in table order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a CleanedTable,
    rows: Vec<&'a SalesRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn new(table: &'a CleanedTable, selection: &Selection) -> Self {
        let rows = table
            .records()
            .iter()
            .filter(|r| selection.matches(r))
            .collect();
        Self { table, rows }
    }

    pub fn rows(&self) -> &[&'a SalesRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn profit_of(&self, record: &SalesRecord) -> f64 {
        self.table.profit_of(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::{CleanOptions, clean};
    use crate::source::read::parse_table;
    use pretty_assertions::assert_eq;

    fn table() -> CleanedTable {
        let raw = parse_table(
            "Product_Name,City,Quantity_Sold,Unit_Price,Sale_Date\n\
             Phone A,Pune,3,100,2024-01-05\n\
             Phone B,Delhi,1,200,2024-01-06\n\
             Phone A,Delhi,2,100,2024-02-01\n",
            None,
        )
        .unwrap();
        clean(raw, &CleanOptions::default()).unwrap().table
    }

    #[test]
    fn full_selection_keeps_every_row() {
        let table = table();
        let view = FilteredView::new(&table, &Selection::all(&table));
        assert_eq!(view.len(), table.len());
        let kept: Vec<&SalesRecord> = table.records().iter().collect();
        assert_eq!(view.rows(), kept.as_slice());
    }

    #[test]
    fn empty_city_selection_is_empty_view() {
        let table = table();
        let selection = Selection {
            cities: BTreeSet::new(),
            ..Selection::all(&table)
        };
        assert!(FilteredView::new(&table, &selection).is_empty());
    }

    #[test]
    fn both_sets_must_match() {
        let table = table();
        let selection = Selection {
            cities: ["Delhi".to_string()].into(),
            products: ["Phone A".to_string()].into(),
        };
        let view = FilteredView::new(&table, &selection);
        assert_eq!(view.len(), 1);
        assert_eq!(view.rows()[0].quantity_sold, 2);
    }

    #[test]
    fn distinct_options_are_sorted() {
        let table = table();
        let all = Selection::all(&table);
        assert_eq!(all.cities.into_iter().collect::<Vec<_>>(), vec!["Delhi", "Pune"]);
        assert_eq!(
            all.products.into_iter().collect::<Vec<_>>(),
            vec!["Phone A", "Phone B"]
        );
    }
}
