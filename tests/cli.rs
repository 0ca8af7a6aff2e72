use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SALES: &str = "\
Unnamed: 0,Product_Name,City,Quantity_Sold,Unit_Price,Sale_Date,Channel
0,phone x, Delhi ,5,1000,2024-01-15,Online
1,Phone Y,Pune,3,200,2024-01-05,Store
2,Phone Y,Pune,7,200,2024-01-20,Store
3,Phone Z,Mumbai,abc,500,2024-02-01,Online
,,,,,,
";

fn write_input(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("sales.csv");
    fs::write(&path, body).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sales-dashboard"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn summary_drops_bad_rows_by_default() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, SALES);

    let out = run(&["summary", "--input", path_str(&input), "--currency", "$"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("Units Sold  15"));
    assert!(stdout.contains("Revenue     $ 7,000"));
    assert!(stdout.contains("Profit      $ 2,100"));
    assert!(stdout.contains("  Pune   10"));
    assert!(stdout.contains("  2024-01  15"));
    assert!(stdout.contains("dropped columns: Unnamed: 0"));
    assert!(!stdout.contains("Phone Z"));
}

#[test]
fn summary_zero_fill_keeps_bad_rows() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, SALES);

    let out = run(&[
        "summary",
        "--input",
        path_str(&input),
        "--on-invalid",
        "zero",
        "--rows",
    ]);
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("Phone Z\tMumbai\t0\t500.00\t2024-02-01\t0.00\t0.00\tOnline"));
    assert!(stdout.contains("1 quantity/price cells zero-filled"));
}

#[test]
fn summary_filters_by_city_and_product() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, SALES);

    let out = run(&[
        "summary",
        "--input",
        path_str(&input),
        "--city",
        "Pune",
        "--product",
        "phone y",
    ]);
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("Units Sold  10"));
    assert!(stdout.contains("cities: 1/2"));
}

#[test]
fn report_writes_html() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, SALES);
    let html_path = dir.path().join("dashboard.html");

    let out = run(&[
        "report",
        "--input",
        path_str(&input),
        "-o",
        path_str(&html_path),
        "--title",
        "Mobile Sales",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let html = fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("<title>Mobile Sales</title>"));
    assert!(html.contains(r#""product_name":"Phone X""#));
    assert!(html.contains(r#""extra_columns":["Channel"]"#));
}

#[test]
fn missing_input_fails_with_path_in_message() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.csv");

    let out = run(&["summary", "--input", path_str(&missing)]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("nope.csv"));
}

#[test]
fn missing_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "Product_Name,City\nA,B\n");

    let out = run(&["summary", "--input", path_str(&input)]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Quantity_Sold"));
}

#[test]
fn out_of_range_margin_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, SALES);

    let out = run(&["summary", "--input", path_str(&input), "--margin", "2"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("margin"));
}
