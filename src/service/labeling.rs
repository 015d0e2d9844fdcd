//! Risk-event labeling over one instrument's price series.

use tracing::debug;

use crate::domain::{PriceObservation, RiskEvent};
use crate::error::{Error, Result};

/// Label every date that has a previous close.
///
/// The first date of the series has no previous close and is skipped
/// entirely (the store's `previous_close` column is NOT NULL positive).
/// A move whose absolute percent change strictly exceeds `threshold_pct`
/// is flagged.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for out-of-order input or a
/// non-positive close anywhere in the series.
pub fn label(bars: &[PriceObservation], threshold_pct: f64) -> Result<Vec<RiskEvent>> {
    validate_series(bars)?;

    let mut events = Vec::with_capacity(bars.len().saturating_sub(1));
    for window in bars.windows(2) {
        let (previous, current) = (&window[0], &window[1]);
        let event = RiskEvent::label(
            current.metal_id,
            current.date,
            previous.close(),
            current.close(),
            threshold_pct,
        )
        .map_err(|e| Error::InvalidInput(e.to_string()))?;
        events.push(event);
    }

    debug!(
        events = events.len(),
        flagged = events.iter().filter(|e| e.is_risk_event).count(),
        "labeled risk events"
    );
    Ok(events)
}

fn validate_series(bars: &[PriceObservation]) -> Result<()> {
    for window in bars.windows(2) {
        if window[1].date <= window[0].date {
            return Err(Error::InvalidInput(format!(
                "price series must be strictly ascending by date, got {} after {}",
                window[1].date, window[0].date
            )));
        }
        if window[1].metal_id != window[0].metal_id {
            return Err(Error::InvalidInput(
                "price series mixes instruments".to_string(),
            ));
        }
    }
    for bar in bars {
        if !(bar.ohlc.close > 0.0) {
            return Err(Error::InvalidInput(format!(
                "non-positive close {} on {}",
                bar.ohlc.close, bar.date
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{MetalId, Ohlc};

    fn series(closes: &[f64]) -> Vec<PriceObservation> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceObservation {
                metal_id: MetalId::new(1),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64),
                ohlc: Ohlc {
                    open: close,
                    high: close,
                    low: close,
                    close,
                },
                volume: None,
                adjusted_close: None,
                source: "test".to_string(),
            })
            .collect()
    }

    #[test]
    fn first_date_is_skipped_not_written() {
        let events = label(&series(&[100.0, 103.0, 98.0]), 3.0).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn three_percent_threshold_splits_the_reference_series() {
        let events = label(&series(&[100.0, 103.0, 98.0]), 3.0).unwrap();

        assert!((events[0].price_change_pct - 3.0).abs() < 1e-9);
        assert!(!events[0].is_risk_event);

        assert!((events[1].price_change_pct - (-4.854368932038835)).abs() < 1e-9);
        assert!(events[1].is_risk_event);
    }

    #[test]
    fn labeled_events_carry_their_closes() {
        let events = label(&series(&[100.0, 103.0]), 3.0).unwrap();
        assert_eq!(events[0].previous_close, 100.0);
        assert_eq!(events[0].current_close, 103.0);
        events[0].validate().unwrap();
    }

    #[test]
    fn single_observation_yields_no_events() {
        assert!(label(&series(&[100.0]), 3.0).unwrap().is_empty());
    }

    #[test]
    fn non_positive_close_is_invalid_input() {
        let mut bars = series(&[100.0, 99.0]);
        bars[1].ohlc.close = -1.0;
        assert!(matches!(label(&bars, 3.0), Err(Error::InvalidInput(_))));
    }
}
