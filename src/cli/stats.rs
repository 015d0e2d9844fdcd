//! `metalstore stats` - row counts and per-instrument coverage.

use serde_json::json;

use super::{open_store, output};
use crate::config::Config;
use crate::error::Result;
use crate::store::CoverageReader;

pub async fn run(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let report = store.coverage().await?;

    if output::is_json() {
        output::json_payload("coverage", json!(report));
        return Ok(());
    }

    output::section("Totals");
    output::field("Price rows", report.price_rows);
    output::field("Macro rows", report.macro_rows);
    output::field("Feature rows", report.feature_rows);
    output::field(
        "Risk rows",
        format!(
            "{} ({} flagged)",
            report.risk_rows, report.flagged_risk_events
        ),
    );

    if report.instruments.is_empty() {
        output::warning("no instruments registered; run `metalstore init`");
        return Ok(());
    }

    output::section("Coverage");
    println!(
        "  {:<10} {:>7} {:<23} {:>9} {:>7}",
        "Symbol", "Prices", "Range", "Features", "Events"
    );
    println!(
        "  {:─<10} {:─>7} {:─<23} {:─>9} {:─>7}",
        "", "", "", "", ""
    );
    for coverage in &report.instruments {
        let range = match (coverage.first_date, coverage.last_date) {
            (Some(first), Some(last)) => format!("{first} → {last}"),
            _ => "-".to_string(),
        };
        println!(
            "  {:<10} {:>7} {:<23} {:>9} {:>7}",
            coverage.symbol, coverage.price_rows, range, coverage.feature_rows, coverage.risk_rows
        );
    }
    Ok(())
}
