//! End-to-end flow: seed, ingest prices, compute features, label risks,
//! verify coverage and cascade behavior against the SQLite store.

mod harness;

use std::sync::Arc;

use harness::temp_db::TempDb;
use metalstore::service::backfill::{backfill_features, backfill_labels};
use metalstore::service::seed::seed_instruments;
use metalstore::store::{
    CoverageReader, DateRange, FeatureStore, InstrumentRegistry, PriceStore, RiskEventStore,
};

#[tokio::test]
async fn features_and_labels_populate_the_store() {
    let db = TempDb::create("flow");
    let store = db.store();
    let instruments = seed_instruments(&store).await.unwrap();
    let (gold, silver) = (instruments[0].clone(), instruments[1].clone());

    // 60 trading days for gold, the 3-day reference series for silver.
    let gold_closes: Vec<f64> = (0..60).map(|i| 1900.0 + (i % 9) as f64).collect();
    store
        .record_prices(&harness::series(gold.id, &gold_closes))
        .await
        .unwrap();
    store
        .record_prices(&harness::series(silver.id, &[100.0, 103.0, 98.0]))
        .await
        .unwrap();

    let shared = Arc::new(store.clone());
    backfill_features(Arc::clone(&shared), instruments.clone())
        .await
        .unwrap();
    backfill_labels(Arc::clone(&shared), instruments.clone(), 3.0)
        .await
        .unwrap();

    // Gold features: SMA-50 defined only from the 50th row on.
    let gold_features = store
        .feature_series(gold.id, DateRange::unbounded())
        .await
        .unwrap();
    assert_eq!(gold_features.len(), 60);
    assert!(gold_features[..49].iter().all(|r| r.sma_50.is_none()));
    assert!(gold_features[49..].iter().all(|r| r.sma_50.is_some()));
    assert!(gold_features[4].sma_5.is_some());
    for row in &gold_features {
        row.validate().unwrap();
    }

    // Silver risk labels follow the reference series.
    let silver_events = store
        .risk_event_series(silver.id, DateRange::unbounded())
        .await
        .unwrap();
    assert_eq!(silver_events.len(), 2);
    assert!((silver_events[0].price_change_pct - 3.0).abs() < 1e-9);
    assert!(!silver_events[0].is_risk_event);
    assert!((silver_events[1].price_change_pct - (-4.854368932038835)).abs() < 1e-9);
    assert!(silver_events[1].is_risk_event);

    // Coverage totals line up.
    let report = store.coverage().await.unwrap();
    assert_eq!(report.price_rows, 63);
    assert_eq!(report.feature_rows, 63);
    assert_eq!(report.risk_rows, 61);
    let gold_coverage = report
        .instruments
        .iter()
        .find(|c| c.symbol == "GOLD")
        .unwrap();
    assert_eq!(gold_coverage.price_rows, 60);
    assert_eq!(gold_coverage.first_date, Some(harness::start_date()));

    // Re-running both passes is idempotent: every key is skipped.
    let rerun = backfill_features(Arc::clone(&shared), instruments.clone())
        .await
        .unwrap();
    assert!(rerun.iter().all(|r| r.outcome.inserted == 0));
    let rerun = backfill_labels(shared, instruments, 3.0).await.unwrap();
    assert!(rerun.iter().all(|r| r.outcome.inserted == 0));
    let report_after = store.coverage().await.unwrap();
    assert_eq!(report_after.feature_rows, 63);
    assert_eq!(report_after.risk_rows, 61);
}

#[tokio::test]
async fn cascade_delete_removes_one_instrument_and_spares_the_rest() {
    let db = TempDb::create("cascade");
    let store = db.store();
    let instruments = seed_instruments(&store).await.unwrap();
    let (gold, silver) = (instruments[0].clone(), instruments[1].clone());

    for instrument in [&gold, &silver] {
        store
            .record_prices(&harness::series(
                instrument.id,
                &[100.0, 103.0, 98.0, 99.0, 101.0],
            ))
            .await
            .unwrap();
    }
    let shared = Arc::new(store.clone());
    backfill_features(Arc::clone(&shared), instruments.clone())
        .await
        .unwrap();
    backfill_labels(shared, instruments, 3.0).await.unwrap();

    assert!(store.remove("GOLD").await.unwrap());

    assert!(store.lookup("GOLD").await.unwrap().is_none());
    assert!(store
        .price_series(gold.id, DateRange::unbounded())
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .feature_series(gold.id, DateRange::unbounded())
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .risk_event_series(gold.id, DateRange::unbounded())
        .await
        .unwrap()
        .is_empty());

    // Silver is untouched.
    assert_eq!(
        store
            .price_series(silver.id, DateRange::unbounded())
            .await
            .unwrap()
            .len(),
        5
    );
    assert_eq!(
        store
            .feature_series(silver.id, DateRange::unbounded())
            .await
            .unwrap()
            .len(),
        5
    );
    assert_eq!(
        store
            .risk_event_series(silver.id, DateRange::unbounded())
            .await
            .unwrap()
            .len(),
        4
    );
}
