use crate::model::{Bar, DashboardData};
use std::fmt::Write;

/// Render the dashboard as plain text for the terminal.
pub fn render_summary(data: &DashboardData, show_rows: bool) -> anyhow::Result<String> {
    let mut out = String::new();
    let k = &data.aggregates.kpis;
    let s = &data.stats;

    writeln!(out, "{}", data.title)?;
    writeln!(
        out,
        "rows: {} shown, {} kept of {} read | cities: {}/{} | products: {}/{}",
        data.rows.len(),
        s.rows_kept,
        s.rows_read,
        data.selection.cities.len(),
        data.options.cities.len(),
        data.selection.products.len(),
        data.options.products.len(),
    )?;
    writeln!(out)?;

    writeln!(out, "Units Sold  {}", group_thousands(k.units_sold))?;
    writeln!(out, "Revenue     {}", money(&data.currency, k.revenue))?;
    writeln!(
        out,
        "Profit      {}  (margin {:.0}%)",
        money(&data.currency, k.profit),
        data.margin * 100.0
    )?;

    let agg = &data.aggregates;
    write_series(&mut out, "Top Products (Units Sold)", &agg.top_products_by_units, |v| {
        group_thousands(*v)
    })?;
    write_series(&mut out, "City-wise Sales", &agg.units_by_city, |v| {
        group_thousands(*v)
    })?;
    write_series(&mut out, "Monthly Sales Trend", &agg.monthly_units, |v| {
        group_thousands(*v)
    })?;
    write_series(&mut out, "Profit by Product", &agg.top_products_by_profit, |v| {
        money(&data.currency, *v)
    })?;

    let notes = cleaning_notes(data);
    if !notes.is_empty() {
        writeln!(out)?;
        writeln!(out, "Cleaning")?;
        for n in notes {
            writeln!(out, "  {}", n)?;
        }
    }

    if show_rows {
        writeln!(out)?;
        write_rows(&mut out, data)?;
    }

    Ok(out)
}

fn write_series<T>(
    out: &mut String,
    title: &str,
    bars: &[Bar<T>],
    fmt: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    if bars.is_empty() {
        writeln!(out, "  (no rows)")?;
        return Ok(());
    }
    let width = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    for b in bars {
        writeln!(out, "  {:<width$}  {}", b.label, fmt(&b.value), width = width)?;
    }
    Ok(())
}

fn write_rows(out: &mut String, data: &DashboardData) -> anyhow::Result<()> {
    let mut header = vec![
        "Product_Name",
        "City",
        "Quantity_Sold",
        "Unit_Price",
        "Sale_Date",
        "Revenue",
        "Profit",
    ];
    header.extend(data.extra_columns.iter().map(String::as_str));
    writeln!(out, "{}", header.join("\t"))?;

    for r in &data.rows {
        let mut cells = vec![
            r.product_name.clone(),
            r.city.clone(),
            r.quantity_sold.to_string(),
            format!("{:.2}", r.unit_price),
            r.sale_date.map(|d| d.to_string()).unwrap_or_default(),
            format!("{:.2}", r.revenue),
            format!("{:.2}", r.profit),
        ];
        cells.extend(r.extra.iter().cloned());
        writeln!(out, "{}", cells.join("\t"))?;
    }
    Ok(())
}

fn cleaning_notes(data: &DashboardData) -> Vec<String> {
    let s = &data.stats;
    let mut notes = Vec::new();
    if s.empty_rows_dropped > 0 {
        notes.push(format!("{} blank rows dropped", s.empty_rows_dropped));
    }
    if !s.dropped_columns.is_empty() {
        let names: Vec<&str> = s
            .dropped_columns
            .iter()
            .map(|c| if c.is_empty() { "(blank)" } else { c.as_str() })
            .collect();
        notes.push(format!("dropped columns: {}", names.join(", ")));
    }
    if s.numeric_rows_dropped > 0 {
        notes.push(format!(
            "{} rows with a missing or unparseable quantity/price dropped",
            s.numeric_rows_dropped
        ));
    }
    if s.zero_filled > 0 {
        notes.push(format!("{} quantity/price cells zero-filled", s.zero_filled));
    }
    if s.unparsed_dates > 0 {
        notes.push(format!("{} rows without a parseable sale date", s.unparsed_dates));
    }
    if s.strict_rows_dropped > 0 {
        notes.push(format!("{} rows dropped by strict mode", s.strict_rows_dropped));
    }
    notes
}

/// Currency prefix plus whole units, as shown on the KPI row.
fn money(currency: &str, value: f64) -> String {
    format!("{} {}", currency, group_thousands(value.max(0.0).trunc() as u64))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
