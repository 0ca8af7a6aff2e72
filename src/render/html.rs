use crate::model::DashboardData;

/// Render a self-contained HTML dashboard (data embedded as JSON).
///
/// Filters run in the page: the embedded rows are re-summed on every change,
/// with the same grouping and ranking rules as `model::aggregate`.
///
/// Important: we avoid `format!()` because the HTML contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(data: &DashboardData) -> anyhow::Result<String> {
    // "</" would close the script element early.
    let json = serde_json::to_string(data)?.replace("</", "<\\/");
    let title = escape_html(&data.title);

    const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  header h1 { margin: 0; font-size: 20px; }
  .container { display: flex; min-height: calc(100vh - 58px); }
  .sidebar { width: 280px; border-right: 1px solid #ddd; padding: 12px; overflow: auto; }
  .main { flex: 1; padding: 12px; overflow: auto; }

  .kpis { display: flex; gap: 16px; flex-wrap: wrap; margin-bottom: 12px; }
  .kpi { flex: 1; min-width: 160px; padding: 10px 14px; border: 1px solid #ddd; border-radius: 8px; background: #fafafa; }
  .kpi .label { color: #666; font-size: 13px; }
  .kpi .value { font-size: 24px; font-weight: 600; font-variant-numeric: tabular-nums; }

  .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); gap: 16px; }
  .card { border: 1px solid #eee; border-radius: 8px; padding: 8px 12px; }
  .card h3 { margin: 4px 0 8px; font-size: 15px; }
  svg text { font-size: 11px; fill: #333; }

  .filter h4 { margin: 8px 0 4px; font-size: 14px; }
  .filter .buttons { display: flex; gap: 6px; margin-bottom: 4px; }
  .filter select { width: 100%; min-height: 140px; }
  .muted { color: #777; font-size: 12px; }

  table { border-collapse: collapse; width: 100%; margin-top: 8px; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; }
  th { position: sticky; top: 0; background: white; border-bottom: 1px solid #ddd; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
  details { margin-top: 16px; }
</style>
</head>
<body>
<header>
  <h1 id="title"></h1>
  <div class="muted" id="stats"></div>
</header>

<div class="container">
  <div class="sidebar">
    <div class="filter">
      <h4>City</h4>
      <div class="buttons">
        <button data-all="cities">All</button>
        <button data-none="cities">None</button>
      </div>
      <select id="cities" multiple></select>
    </div>
    <div class="filter">
      <h4>Product</h4>
      <div class="buttons">
        <button data-all="products">All</button>
        <button data-none="products">None</button>
      </div>
      <select id="products" multiple></select>
    </div>
  </div>

  <div class="main">
    <div class="kpis" id="kpis"></div>
    <div class="grid">
      <div class="card"><h3>Top Products (Units Sold)</h3><div id="chartTopUnits"></div></div>
      <div class="card"><h3>City-wise Sales</h3><div id="chartCities"></div></div>
      <div class="card"><h3>Monthly Sales Trend</h3><div id="chartMonthly"></div></div>
      <div class="card"><h3>Profit by Product</h3><div id="chartTopProfit"></div></div>
    </div>

    <details>
      <summary>View Cleaned Data (<span id="rowCount"></span> rows)</summary>
      <table>
        <thead id="rowsHead"></thead>
        <tbody id="rowsBody"></tbody>
      </table>
    </details>
  </div>
</div>

<script>
// Embedded dashboard data (JSON object literal)
const DATA = __DATA__;

// The page starts from the full table; filtering narrows it.
const ALL_ROWS = DATA.rows;

const state = {
  cities: new Set(DATA.selection.cities),
  products: new Set(DATA.selection.products)
};

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function fmtInt(x) {
  return Math.trunc(x).toLocaleString("en-US");
}

function fmtMoney(x) {
  return `${DATA.currency} ${fmtInt(x)}`;
}

function fmtPrice(x) {
  return (Math.round(x * 100) / 100).toFixed(2);
}

function sumBy(rows, key, value) {
  const m = new Map();
  for (const r of rows) m.set(key(r), (m.get(key(r)) || 0) + value(r));
  return m;
}

function byLabel(a, b) {
  return a.label < b.label ? -1 : a.label > b.label ? 1 : 0;
}

function sortedBars(m) {
  return Array.from(m, ([label, value]) => ({ label, value })).sort(byLabel);
}

function topN(m, n) {
  return sortedBars(m)
    .sort((a, b) => (b.value - a.value) || byLabel(a, b))
    .slice(0, n);
}

function aggregate(rows) {
  const kpis = { units_sold: 0, revenue: 0, profit: 0 };
  for (const r of rows) {
    kpis.units_sold += r.quantity_sold;
    kpis.revenue += r.revenue;
    kpis.profit += r.profit;
  }
  const dated = rows.filter(r => r.sale_date);
  return {
    kpis,
    top_products_by_units: topN(sumBy(rows, r => r.product_name, r => r.quantity_sold), DATA.top_n),
    units_by_city: sortedBars(sumBy(rows, r => r.city, r => r.quantity_sold)),
    monthly_units: sortedBars(sumBy(dated, r => r.sale_date.slice(0, 7), r => r.quantity_sold)),
    top_products_by_profit: topN(sumBy(rows, r => r.product_name, r => r.profit), DATA.top_n)
  };
}

function emptyChart() {
  return `<div class="muted">No rows match the current filters.</div>`;
}

// Horizontal bars: one row per label.
function barChart(bars, fmt) {
  if (!bars.length) return emptyChart();
  const w = 520, labelW = 150, rowH = 22, h = bars.length * rowH + 4;
  const max = Math.max(...bars.map(b => b.value), 1);
  let out = `<svg width="100%" viewBox="0 0 ${w} ${h}">`;
  bars.forEach((b, i) => {
    const y = i * rowH + 2;
    const bw = Math.max(1, (w - labelW - 80) * b.value / max);
    out += `<text x="${labelW - 6}" y="${y + 14}" text-anchor="end">${escapeHtml(b.label)}</text>`;
    out += `<rect x="${labelW}" y="${y + 2}" width="${bw}" height="${rowH - 6}" fill="#6a51a3"></rect>`;
    out += `<text x="${labelW + bw + 4}" y="${y + 14}">${fmt(b.value)}</text>`;
  });
  return out + `</svg>`;
}

function lineChart(points) {
  if (!points.length) return emptyChart();
  const w = 520, h = 240, pad = 36;
  const max = Math.max(...points.map(p => p.value), 1);
  const step = points.length > 1 ? (w - 2 * pad) / (points.length - 1) : 0;
  const xy = points.map((p, i) => [pad + i * step, h - pad - (h - 2 * pad) * p.value / max]);
  let out = `<svg width="100%" viewBox="0 0 ${w} ${h}">`;
  out += `<line x1="${pad}" y1="${h - pad}" x2="${w - pad}" y2="${h - pad}" stroke="#ccc"></line>`;
  out += `<polyline fill="none" stroke="#1f77b4" stroke-width="3" points="${xy.map(p => p.join(",")).join(" ")}"></polyline>`;
  points.forEach((p, i) => {
    const [x, y] = xy[i];
    out += `<circle cx="${x}" cy="${y}" r="4" fill="#1f77b4"></circle>`;
    out += `<text x="${x}" y="${y - 8}" text-anchor="middle">${fmtInt(p.value)}</text>`;
    out += `<text x="${x}" y="${h - pad + 16}" text-anchor="middle">${escapeHtml(p.label)}</text>`;
  });
  return out + `</svg>`;
}

function renderStats() {
  const s = DATA.stats;
  const parts = [
    `read ${s.rows_read} rows`,
    `kept ${s.rows_kept}`,
    `margin ${Math.round(DATA.margin * 100)}%`
  ];
  if (s.empty_rows_dropped) parts.push(`${s.empty_rows_dropped} blank rows dropped`);
  if (s.numeric_rows_dropped) parts.push(`${s.numeric_rows_dropped} rows with bad numbers dropped`);
  if (s.zero_filled) parts.push(`${s.zero_filled} bad numbers zero-filled`);
  if (s.unparsed_dates) parts.push(`${s.unparsed_dates} rows without a date`);
  if (s.strict_rows_dropped) parts.push(`${s.strict_rows_dropped} rows dropped by strict mode`);
  if (s.dropped_columns.length) parts.push(`dropped columns: ${s.dropped_columns.map(c => c || "(blank)").join(", ")}`);
  document.getElementById("stats").textContent = parts.join(" | ");
}

function renderFilters() {
  for (const key of ["cities", "products"]) {
    const sel = document.getElementById(key);
    sel.innerHTML = "";
    for (const v of DATA.options[key]) {
      const opt = document.createElement("option");
      opt.value = v;
      opt.textContent = v;
      opt.selected = state[key].has(v);
      sel.appendChild(opt);
    }
    sel.onchange = () => {
      state[key] = new Set(Array.from(sel.selectedOptions, o => o.value));
      renderDashboard();
    };
  }
  for (const btn of document.querySelectorAll("[data-all]")) {
    btn.onclick = () => { state[btn.dataset.all] = new Set(DATA.options[btn.dataset.all]); renderFilters(); renderDashboard(); };
  }
  for (const btn of document.querySelectorAll("[data-none]")) {
    btn.onclick = () => { state[btn.dataset.none] = new Set(); renderFilters(); renderDashboard(); };
  }
}

function renderRows(rows) {
  document.getElementById("rowCount").textContent = rows.length;
  const extra = DATA.extra_columns;
  document.getElementById("rowsHead").innerHTML = `<tr>
    <th>Product_Name</th><th>City</th><th class="num">Quantity_Sold</th><th class="num">Unit_Price</th>
    <th>Sale_Date</th><th class="num">Revenue</th><th class="num">Profit</th>
    ${extra.map(c => `<th>${escapeHtml(c)}</th>`).join("")}
  </tr>`;
  const body = document.getElementById("rowsBody");
  body.innerHTML = "";
  for (const r of rows) {
    const tr = document.createElement("tr");
    tr.innerHTML = `
      <td>${escapeHtml(r.product_name)}</td>
      <td>${escapeHtml(r.city)}</td>
      <td class="num">${r.quantity_sold}</td>
      <td class="num">${fmtPrice(r.unit_price)}</td>
      <td>${r.sale_date ? escapeHtml(r.sale_date) : ""}</td>
      <td class="num">${fmtPrice(r.revenue)}</td>
      <td class="num">${fmtPrice(r.profit)}</td>
      ${r.extra.map(v => `<td>${escapeHtml(v)}</td>`).join("")}
    `;
    body.appendChild(tr);
  }
}

function renderDashboard() {
  const rows = ALL_ROWS.filter(r => state.cities.has(r.city) && state.products.has(r.product_name));
  const agg = aggregate(rows);

  document.getElementById("kpis").innerHTML = `
    <div class="kpi"><div class="label">Units Sold</div><div class="value">${fmtInt(agg.kpis.units_sold)}</div></div>
    <div class="kpi"><div class="label">Revenue</div><div class="value">${fmtMoney(agg.kpis.revenue)}</div></div>
    <div class="kpi"><div class="label">Profit</div><div class="value">${fmtMoney(agg.kpis.profit)}</div></div>
  `;
  document.getElementById("chartTopUnits").innerHTML = barChart(agg.top_products_by_units, fmtInt);
  document.getElementById("chartCities").innerHTML = barChart(agg.units_by_city, fmtInt);
  document.getElementById("chartMonthly").innerHTML = lineChart(agg.monthly_units);
  document.getElementById("chartTopProfit").innerHTML = barChart(agg.top_products_by_profit, fmtMoney);
  renderRows(rows);
}

document.getElementById("title").textContent = DATA.title;
renderStats();
renderFilters();
renderDashboard();
</script>
</body>
</html>
"##;

    Ok(TEMPLATE
        .replace("__TITLE__", &title)
        .replace("__DATA__", &json))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
