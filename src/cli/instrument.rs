//! `metalstore instrument` - registry management.

use dialoguer::Confirm;
use serde_json::json;

use super::command::{AddInstrumentArgs, InstrumentCommand, RemoveInstrumentArgs};
use super::{open_store, output};
use crate::config::Config;
use crate::domain::InstrumentSpec;
use crate::error::{Error, Result};
use crate::store::InstrumentRegistry;

pub async fn run(command: InstrumentCommand, config: &Config) -> Result<()> {
    match command {
        InstrumentCommand::List => list(config).await,
        InstrumentCommand::Add(args) => add(args, config).await,
        InstrumentCommand::Remove(args) => remove(args, config).await,
    }
}

async fn list(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let instruments = store.list().await?;

    if output::is_json() {
        output::json_payload("instruments", json!(instruments));
        return Ok(());
    }

    if instruments.is_empty() {
        output::warning("no instruments registered; run `metalstore init`");
        return Ok(());
    }

    output::section("Instruments");
    println!(
        "  {:<10} {:<12} {:<10} {}",
        "Symbol", "Name", "Ticker", "Market"
    );
    println!("  {:─<10} {:─<12} {:─<10} {:─<10}", "", "", "", "");
    for instrument in instruments {
        println!(
            "  {:<10} {:<12} {:<10} {}",
            instrument.symbol, instrument.name, instrument.ticker, instrument.market_type
        );
    }
    Ok(())
}

async fn add(args: AddInstrumentArgs, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let spec = InstrumentSpec::try_new(args.symbol, args.name, args.ticker, args.market_type)?;
    let instrument = store.register(&spec).await?;

    output::json_payload("instrument", json!(instrument));
    output::success(format!(
        "{} registered as id {}",
        instrument.symbol, instrument.id
    ));
    Ok(())
}

async fn remove(args: RemoveInstrumentArgs, config: &Config) -> Result<()> {
    let store = open_store(config)?;

    // Cascades to every dependent price, feature, and risk row.
    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} and ALL of its price, feature, and risk history?",
                args.symbol
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            output::warning("aborted");
            return Ok(());
        }
    }

    if store.remove(&args.symbol).await? {
        output::json_payload("removed", json!({ "symbol": args.symbol }));
        output::success(format!("{} and its history deleted", args.symbol));
        Ok(())
    } else {
        Err(Error::NotFound {
            entity: "instrument",
            key: args.symbol,
        })
    }
}
