//! `metalstore features` - compute technical features from stored prices.

use std::sync::Arc;

use serde_json::json;

use super::command::FeaturesArgs;
use super::{open_store, output, resolve_instruments};
use crate::config::Config;
use crate::error::Result;
use crate::service::backfill;

pub async fn run(args: FeaturesArgs, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let instruments = resolve_instruments(&store, args.symbol.as_deref()).await?;
    if instruments.is_empty() {
        output::warning("no instruments registered; run `metalstore init`");
        return Ok(());
    }

    let results = backfill::backfill_features(Arc::new(store), instruments).await?;

    for result in &results {
        output::json_payload(
            "features",
            json!({
                "symbol": result.symbol,
                "inserted": result.outcome.inserted,
                "skipped": result.outcome.skipped,
            }),
        );
        output::success(format!(
            "{}: {} feature rows inserted, {} duplicates skipped",
            result.symbol, result.outcome.inserted, result.outcome.skipped
        ));
    }
    Ok(())
}
