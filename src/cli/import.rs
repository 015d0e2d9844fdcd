//! `metalstore import` - CSV imports for prices and macro data.

use serde_json::json;

use super::command::{ImportCommand, ImportMacroArgs, ImportPricesArgs};
use super::{open_store, output};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::service::ingest;
use crate::store::{InstrumentRegistry, MacroStore, PriceStore};

pub async fn run(command: ImportCommand, config: &Config) -> Result<()> {
    match command {
        ImportCommand::Prices(args) => prices(args, config).await,
        ImportCommand::Macro(args) => macro_data(args, config).await,
    }
}

async fn prices(args: ImportPricesArgs, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let instrument =
        store
            .lookup(&args.symbol)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "instrument",
                key: args.symbol.clone(),
            })?;

    let content = std::fs::read_to_string(&args.file)?;
    let observations = ingest::parse_price_csv(&content, instrument.id, &args.source)?;
    let outcome = store.record_prices(&observations).await?;

    output::json_payload(
        "import",
        json!({
            "symbol": instrument.symbol,
            "inserted": outcome.inserted,
            "skipped": outcome.skipped,
        }),
    );
    output::success(format!(
        "{}: {} rows inserted, {} duplicates skipped",
        instrument.symbol, outcome.inserted, outcome.skipped
    ));
    Ok(())
}

async fn macro_data(args: ImportMacroArgs, config: &Config) -> Result<()> {
    let store = open_store(config)?;

    let content = std::fs::read_to_string(&args.file)?;
    let observations = ingest::parse_macro_csv(&content, &args.source)?;
    let outcome = store.record_macros(&observations).await?;

    output::json_payload(
        "import",
        json!({
            "inserted": outcome.inserted,
            "skipped": outcome.skipped,
        }),
    );
    output::success(format!(
        "macro: {} rows inserted, {} duplicates skipped",
        outcome.inserted, outcome.skipped
    ));
    Ok(())
}
