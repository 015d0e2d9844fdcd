//! Instrument-partitioned fan-out for feature computation and labeling.
//!
//! Each instrument's series is independent, so instruments run as
//! separate tasks with no shared mutable state; writes within one
//! instrument stay strictly date-ordered because its whole series is
//! handled by a single task.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

use super::{features, labeling};
use crate::domain::Instrument;
use crate::error::{Error, Result};
use crate::store::{BatchOutcome, DateRange, FeatureStore, PriceStore, RiskEventStore};

/// Per-instrument result of a feature backfill.
#[derive(Debug, Clone)]
pub struct FeatureBackfill {
    pub symbol: String,
    pub outcome: BatchOutcome,
}

/// Per-instrument result of a labeling backfill.
#[derive(Debug, Clone)]
pub struct LabelBackfill {
    pub symbol: String,
    pub outcome: BatchOutcome,
    /// How many of the labeled days were flagged as risk events.
    pub flagged: usize,
}

fn worker_cap() -> usize {
    num_cpus::get().max(1)
}

fn join_failure(error: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(format!("worker task failed: {error}")))
}

/// Compute and store feature rows for each instrument in parallel.
///
/// # Errors
/// Fails on the first instrument whose series is malformed or whose write
/// is rejected; other instruments' completed writes remain.
pub async fn backfill_features<S>(
    store: Arc<S>,
    instruments: Vec<Instrument>,
) -> Result<Vec<FeatureBackfill>>
where
    S: PriceStore + FeatureStore + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(worker_cap()));
    let mut tasks = JoinSet::new();

    for instrument in instruments {
        let store = Arc::clone(&store);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
            let series = store
                .price_series(instrument.id, DateRange::unbounded())
                .await?;
            let rows = features::compute(&series)?;
            let outcome = store.record_features(&rows).await?;
            info!(
                symbol = %instrument.symbol,
                inserted = outcome.inserted,
                skipped = outcome.skipped,
                "feature backfill finished"
            );
            Ok::<_, Error>(FeatureBackfill {
                symbol: instrument.symbol,
                outcome,
            })
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.map_err(join_failure)??);
    }
    results.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    Ok(results)
}

/// Label and store risk events for each instrument in parallel.
///
/// # Errors
/// Fails on the first instrument whose series is malformed or whose write
/// is rejected; other instruments' completed writes remain.
pub async fn backfill_labels<S>(
    store: Arc<S>,
    instruments: Vec<Instrument>,
    threshold_pct: f64,
) -> Result<Vec<LabelBackfill>>
where
    S: PriceStore + RiskEventStore + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(worker_cap()));
    let mut tasks = JoinSet::new();

    for instrument in instruments {
        let store = Arc::clone(&store);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
            let series = store
                .price_series(instrument.id, DateRange::unbounded())
                .await?;
            let events = labeling::label(&series, threshold_pct)?;
            let flagged = events.iter().filter(|e| e.is_risk_event).count();
            let outcome = store.record_risk_events(&events).await?;
            info!(
                symbol = %instrument.symbol,
                inserted = outcome.inserted,
                skipped = outcome.skipped,
                flagged,
                "label backfill finished"
            );
            Ok::<_, Error>(LabelBackfill {
                symbol: instrument.symbol,
                outcome,
                flagged,
            })
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.map_err(join_failure)??);
    }
    results.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{MetalId, Ohlc, PriceObservation};
    use crate::service::seed;
    use crate::store::{InstrumentRegistry, MemoryStore};

    async fn store_with_series(closes_per_symbol: &[(usize, &[f64])]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let instruments = seed::seed_instruments(store.as_ref()).await.unwrap();
        for &(index, closes) in closes_per_symbol {
            let metal_id = instruments[index].id;
            let bars: Vec<PriceObservation> = closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PriceObservation {
                    metal_id,
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                        + chrono::Days::new(i as u64),
                    ohlc: Ohlc {
                        open: close,
                        high: close,
                        low: close,
                        close,
                    },
                    volume: Some(1_000),
                    adjusted_close: None,
                    source: "test".to_string(),
                })
                .collect();
            store.record_prices(&bars).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn features_fan_out_per_instrument() {
        let store = store_with_series(&[(0, &[100.0, 101.0, 102.0]), (1, &[50.0, 51.0])]).await;
        let instruments = store.list().await.unwrap();

        let results = backfill_features(Arc::clone(&store), instruments.clone())
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        let gold = results.iter().find(|r| r.symbol == "GOLD").unwrap();
        assert_eq!(gold.outcome.inserted, 3);
        let copper = results.iter().find(|r| r.symbol == "COPPER").unwrap();
        assert_eq!(copper.outcome.inserted, 0);

        // Re-running skips every existing key.
        let again = backfill_features(Arc::clone(&store), instruments)
            .await
            .unwrap();
        let gold = again.iter().find(|r| r.symbol == "GOLD").unwrap();
        assert_eq!(gold.outcome.inserted, 0);
        assert_eq!(gold.outcome.skipped, 3);
    }

    #[tokio::test]
    async fn labels_count_flagged_days() {
        let store = store_with_series(&[(0, &[100.0, 103.0, 98.0])]).await;
        let instruments = store.list().await.unwrap();

        let results = backfill_labels(Arc::clone(&store), instruments, 3.0)
            .await
            .unwrap();
        let gold = results.iter().find(|r| r.symbol == "GOLD").unwrap();
        assert_eq!(gold.outcome.inserted, 2);
        assert_eq!(gold.flagged, 1);
    }
}
