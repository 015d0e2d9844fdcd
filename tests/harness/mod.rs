//! Shared fixtures for integration tests.
#![allow(dead_code)]

pub mod temp_db;

use chrono::NaiveDate;

use metalstore::domain::{MetalId, Ohlc, PriceObservation};

/// Build an ascending daily price series from closes, with a fixed spread
/// around each close and a constant volume.
pub fn series(metal_id: MetalId, closes: &[f64]) -> Vec<PriceObservation> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceObservation {
            metal_id,
            date: start_date() + chrono::Days::new(i as u64),
            ohlc: Ohlc {
                open: close,
                high: close + 2.0,
                low: (close - 2.0).max(0.01),
                close,
            },
            volume: Some(10_000 + i as i64),
            adjusted_close: None,
            source: "test".to_string(),
        })
        .collect()
}

/// First date used by [`series`].
pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}
