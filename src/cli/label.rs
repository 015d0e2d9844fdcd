//! `metalstore label` - label risk events from stored prices.

use std::sync::Arc;

use serde_json::json;

use super::command::LabelArgs;
use super::{open_store, output, resolve_instruments};
use crate::config::Config;
use crate::error::{ConfigError, Error, Result};
use crate::service::backfill;

pub async fn run(args: LabelArgs, config: &Config) -> Result<()> {
    let threshold_pct = args.threshold_pct.unwrap_or(config.labeling.threshold_pct);
    if !(threshold_pct > 0.0) {
        return Err(Error::Config(ConfigError::InvalidValue {
            field: "labeling.threshold_pct",
            reason: format!("must be positive, got {threshold_pct}"),
        }));
    }

    let store = open_store(config)?;
    let instruments = resolve_instruments(&store, args.symbol.as_deref()).await?;
    if instruments.is_empty() {
        output::warning("no instruments registered; run `metalstore init`");
        return Ok(());
    }

    let results = backfill::backfill_labels(Arc::new(store), instruments, threshold_pct).await?;

    for result in &results {
        output::json_payload(
            "label",
            json!({
                "symbol": result.symbol,
                "inserted": result.outcome.inserted,
                "skipped": result.outcome.skipped,
                "flagged": result.flagged,
            }),
        );
        output::success(format!(
            "{}: {} events inserted ({} flagged), {} duplicates skipped",
            result.symbol, result.outcome.inserted, result.flagged, result.outcome.skipped
        ));
    }
    Ok(())
}
