use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::warn;

mod clean;
mod logging;
mod model;
mod render;
mod source;

use clean::{CleanOptions, CleanedTable, DEFAULT_MARGIN, NameCase, NumericPolicy};
use model::{DashboardSettings, Selection};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Sales record cleaner and dashboard", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a self-contained HTML dashboard with in-page filters.
    Report {
        #[command(flatten)]
        pipeline: CleanArgs,

        #[command(flatten)]
        display: DisplayArgs,

        #[arg(short = 'o', long)]
        out: PathBuf,
    },

    /// Print the dashboard figures to stdout.
    Summary {
        #[command(flatten)]
        pipeline: CleanArgs,

        #[command(flatten)]
        display: DisplayArgs,

        /// Only include this city (repeatable; default: all cities).
        #[arg(long = "city")]
        cities: Vec<String>,

        /// Only include this product (repeatable; default: all products).
        #[arg(long = "product")]
        products: Vec<String>,

        /// Also print the filtered rows.
        #[arg(long)]
        rows: bool,
    },
}

#[derive(Args)]
struct CleanArgs {
    /// Delimited sales file.
    #[arg(long)]
    input: PathBuf,

    /// Field delimiter; detected from the header line when omitted.
    #[arg(long)]
    delimiter: Option<char>,

    /// Handling of empty or unparseable quantity/price cells.
    #[arg(long, value_enum, default_value_t = NumericPolicy::Drop)]
    on_invalid: NumericPolicy,

    /// Casing applied to product names.
    #[arg(long, value_enum, default_value_t = NameCase::Title)]
    name_case: NameCase,

    /// Drop rows without a date or with a non-positive quantity/price.
    #[arg(long)]
    strict: bool,

    /// Share of revenue reported as profit.
    #[arg(long, default_value_t = DEFAULT_MARGIN)]
    margin: f64,
}

impl CleanArgs {
    fn options(&self) -> Result<CleanOptions> {
        let delimiter = match self.delimiter {
            Some(c) if c.is_ascii() => Some(c as u8),
            Some(c) => anyhow::bail!("delimiter must be a single ASCII character, got {:?}", c),
            None => None,
        };
        let opts = CleanOptions {
            delimiter,
            on_invalid: self.on_invalid,
            name_case: self.name_case,
            strict: self.strict,
            margin: self.margin,
        };
        opts.validate()?;
        Ok(opts)
    }
}

#[derive(Args)]
struct DisplayArgs {
    /// Number of products in the top-N charts.
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Prefix for monetary amounts.
    #[arg(long, default_value = "₹")]
    currency: String,

    #[arg(long, default_value = "Sales Performance Dashboard")]
    title: String,
}

impl DisplayArgs {
    fn settings(&self) -> Result<DashboardSettings> {
        if self.top == 0 {
            anyhow::bail!("--top must be at least 1");
        }
        Ok(DashboardSettings {
            title: self.title.clone(),
            currency: self.currency.clone(),
            top_n: self.top,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.cmd {
        Commands::Report {
            pipeline,
            display,
            out,
        } => {
            // 1) Validate options before touching the input.
            let opts = pipeline.options()?;
            let settings = display.settings()?;

            // 2) Load + clean.
            let cleaned = clean::load_and_clean(&pipeline.input, &opts)?;
            if cleaned.table.is_empty() {
                warn!("no rows survived cleaning; the dashboard will be empty");
            }

            // 3) Aggregate over everything; the page filters client-side.
            let selection = Selection::all(&cleaned.table);
            let data =
                model::build_dashboard_data(&cleaned.table, &cleaned.stats, &selection, &settings);

            // 4) Render HTML.
            let html = render::render_html_report(&data)?;
            std::fs::write(&out, html)?;
            println!("Wrote {}", out.display());
        }
        Commands::Summary {
            pipeline,
            display,
            cities,
            products,
            rows,
        } => {
            let opts = pipeline.options()?;
            let settings = display.settings()?;

            let cleaned = clean::load_and_clean(&pipeline.input, &opts)?;
            let selection = narrow_selection(&cleaned.table, &cities, &products, opts.name_case);
            let data =
                model::build_dashboard_data(&cleaned.table, &cleaned.stats, &selection, &settings);

            print!("{}", render::render_summary(&data, rows)?);
        }
    }

    Ok(())
}

/// Start from everything and replace each non-empty filter list.
///
/// Product names get the same casing as the cleaned table so filters typed
/// in any case still match.
fn narrow_selection(
    table: &CleanedTable,
    cities: &[String],
    products: &[String],
    name_case: NameCase,
) -> Selection {
    let mut selection = Selection::all(table);

    if !cities.is_empty() {
        let chosen: BTreeSet<String> = cities.iter().map(|c| c.trim().to_string()).collect();
        for c in selection.cities.difference(&chosen) {
            tracing::debug!(city = %c, "city filtered out");
        }
        for c in chosen.difference(&selection.cities) {
            warn!(city = %c, "no rows for city");
        }
        selection.cities = chosen;
    }
    if !products.is_empty() {
        let chosen: BTreeSet<String> = products.iter().map(|p| name_case.apply(p)).collect();
        for p in chosen.difference(&selection.products) {
            warn!(product = %p, "no rows for product");
        }
        selection.products = chosen;
    }

    selection
}
