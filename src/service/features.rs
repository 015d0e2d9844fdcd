//! Feature computation over one instrument's price series.

use tracing::debug;

use crate::domain::indicator::{self, Bollinger, Macd};
use crate::domain::{MetalId, PriceObservation, TechnicalFeatures};
use crate::error::{Error, Result};

/// Largest trailing window any feature needs (SMA-50).
pub const MAX_LOOKBACK: usize = 50;

const SMA_WINDOWS: [usize; 4] = [5, 10, 20, 50];
const EMA_FAST: usize = 12;
const EMA_SLOW: usize = 26;
const MACD_SIGNAL_SPAN: usize = 9;
const BOLLINGER_WINDOW: usize = 20;
const BOLLINGER_K: f64 = 2.0;
const RSI_PERIOD: usize = 14;
const VOLUME_SMA_WINDOW: usize = 20;

/// Compute one feature row per observation.
///
/// The input must be one instrument's series ascending by date; calendar
/// gaps are expected and ignored. Dates with insufficient trailing history
/// produce rows with null fields, never an error. The whole batch is
/// validated before anything is computed, so malformed input writes
/// nothing.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for an ordering violation or a
/// non-positive close anywhere in the series.
pub fn compute(bars: &[PriceObservation]) -> Result<Vec<TechnicalFeatures>> {
    validate_series(bars)?;

    let closes: Vec<f64> = bars.iter().map(PriceObservation::close).collect();
    let volumes: Vec<Option<f64>> = bars.iter().map(|b| b.volume.map(|v| v as f64)).collect();

    let mut sma_columns = Vec::with_capacity(SMA_WINDOWS.len());
    for window in SMA_WINDOWS {
        sma_columns.push(indicator::sma(&closes, window));
    }
    let ema_12 = indicator::ema(&closes, EMA_FAST);
    let ema_26 = indicator::ema(&closes, EMA_SLOW);
    let Bollinger {
        upper,
        middle,
        lower,
        width,
    } = indicator::bollinger(&closes, BOLLINGER_WINDOW, BOLLINGER_K);
    let rsi_14 = indicator::rsi(&closes, RSI_PERIOD);
    let Macd {
        line,
        signal,
        histogram,
    } = indicator::macd(&closes, EMA_FAST, EMA_SLOW, MACD_SIGNAL_SPAN);
    let volume_sma_20 = rolling_volume_mean(&volumes, VOLUME_SMA_WINDOW);

    let mut rows = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let (daily_return, log_return) = if i == 0 {
            (None, None)
        } else {
            let ratio = closes[i] / closes[i - 1];
            (Some(ratio - 1.0), Some(ratio.ln()))
        };

        let volume_change = match (i.checked_sub(1).and_then(|p| volumes[p]), volumes[i]) {
            (Some(previous), Some(current)) if previous != 0.0 => {
                Some(current / previous - 1.0)
            }
            _ => None,
        };

        let range = bar.ohlc.high - bar.ohlc.low;
        rows.push(TechnicalFeatures {
            metal_id: bar.metal_id,
            date: bar.date,
            daily_return,
            log_return,
            sma_5: sma_columns[0][i],
            sma_10: sma_columns[1][i],
            sma_20: sma_columns[2][i],
            sma_50: sma_columns[3][i],
            ema_12: ema_12[i],
            ema_26: ema_26[i],
            bollinger_upper: upper[i],
            bollinger_middle: middle[i],
            bollinger_lower: lower[i],
            bollinger_width: width[i],
            rsi_14: rsi_14[i],
            macd: line[i],
            macd_signal: signal[i],
            macd_histogram: histogram[i],
            high_low_range: range,
            high_low_ratio: range / bar.ohlc.close,
            volume_change,
            volume_sma_20: volume_sma_20[i],
        });
    }

    debug!(rows = rows.len(), "computed feature rows");
    Ok(rows)
}

/// Reject malformed input before any computation happens.
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

/// Rolling mean over volumes, null whenever the trailing window has a gap.
fn rolling_volume_mean(volumes: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; volumes.len()];
    if window == 0 || volumes.len() < window {
        return out;
    }
    for i in (window - 1)..volumes.len() {
        let slice = &volumes[i + 1 - window..=i];
        if slice.iter().all(Option::is_some) {
            let sum: f64 = slice.iter().flatten().sum();
            out[i] = Some(sum / window as f64);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Ohlc;

    fn series(closes: &[f64]) -> Vec<PriceObservation> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| bar(i, close, Some(1_000 + i as i64)))
            .collect()
    }

    fn bar(i: usize, close: f64, volume: Option<i64>) -> PriceObservation {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64);
        PriceObservation {
            metal_id: MetalId::new(1),
            date,
            ohlc: Ohlc {
                open: close,
                high: close + 5.0,
                low: close - 5.0,
                close,
            },
            volume,
            adjusted_close: None,
            source: "test".to_string(),
        }
    }

    #[test]
    fn short_series_yields_null_sma_50_but_sma_5_from_fifth_row() {
        let closes: Vec<f64> = (0..49).map(|i| 100.0 + i as f64).collect();
        let rows = compute(&series(&closes)).unwrap();
        assert_eq!(rows.len(), 49);
        assert!(rows.iter().all(|r| r.sma_50.is_none()));
        assert!(rows[3].sma_5.is_none());
        assert!(rows[4].sma_5.is_some());
        assert!(rows[48].sma_5.is_some());
    }

    #[test]
    fn daily_and_log_returns_follow_consecutive_closes() {
        let rows = compute(&series(&[100.0, 103.0, 98.0])).unwrap();
        assert!(rows[0].daily_return.is_none());
        assert!((rows[1].daily_return.unwrap() - 0.03).abs() < 1e-12);
        assert!((rows[1].log_return.unwrap() - (103.0f64 / 100.0).ln()).abs() < 1e-12);
        assert!((rows[2].daily_return.unwrap() - (98.0 / 103.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn range_and_ratio_from_single_bar() {
        let mut bars = series(&[105.0]);
        bars[0].ohlc = Ohlc {
            open: 102.0,
            high: 110.0,
            low: 100.0,
            close: 105.0,
        };
        let rows = compute(&bars).unwrap();
        assert!((rows[0].high_low_range - 10.0).abs() < 1e-12);
        assert!((rows[0].high_low_ratio - 10.0 / 105.0).abs() < 1e-12);
    }

    #[test]
    fn volume_change_is_null_when_prior_volume_is_zero_or_missing() {
        let mut bars = series(&[100.0, 101.0, 102.0, 103.0]);
        bars[0].volume = Some(0);
        bars[2].volume = None;
        let rows = compute(&bars).unwrap();
        assert_eq!(rows[0].volume_change, None);
        assert_eq!(rows[1].volume_change, None); // prior volume 0
        assert_eq!(rows[2].volume_change, None); // own volume missing
        assert_eq!(rows[3].volume_change, None); // prior volume missing
    }

    #[test]
    fn volume_sma_requires_a_full_window_of_volumes() {
        let mut bars = series(&(0..25).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        for bar in &mut bars {
            bar.volume = Some(100);
        }
        bars[10].volume = None;
        let rows = compute(&bars).unwrap();
        // Window covering the gap stays null; it closes 20 rows later.
        assert!(rows[19].volume_sma_20.is_none());
        assert!(rows[24].volume_sma_20.is_none());

        for bar in &mut bars {
            bar.volume = Some(200);
        }
        let rows = compute(&bars).unwrap();
        assert!((rows[19].volume_sma_20.unwrap() - 200.0).abs() < 1e-12);
    }

    #[test]
    fn descending_dates_are_invalid_input() {
        let mut bars = series(&[100.0, 101.0]);
        bars[1].date = bars[0].date;
        assert!(matches!(compute(&bars), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn non_positive_close_rejects_the_batch() {
        let mut bars = series(&[100.0, 101.0, 102.0]);
        bars[1].ohlc.close = 0.0;
        assert!(matches!(compute(&bars), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn rows_validate_against_bounded_column_invariants() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i % 7) as f64).collect();
        for row in compute(&series(&closes)).unwrap() {
            row.validate().unwrap();
        }
    }
}
