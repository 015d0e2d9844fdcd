//! Derived technical feature rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MetalId;

/// One instrument-day of derived indicators.
///
/// Fields with insufficient trailing history are `None` rather than an
/// error; the range and ratio columns are always defined because they only
/// need the day's own bar. At most one row exists per (instrument, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalFeatures {
    pub metal_id: MetalId,
    pub date: NaiveDate,

    // Returns
    pub daily_return: Option<f64>,
    pub log_return: Option<f64>,

    // Trend
    pub sma_5: Option<f64>,
    pub sma_10: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,

    // Volatility bands
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub bollinger_width: Option<f64>,

    // Momentum
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,

    // Range
    pub high_low_range: f64,
    pub high_low_ratio: f64,

    // Volume
    pub volume_change: Option<f64>,
    pub volume_sma_20: Option<f64>,
}

impl TechnicalFeatures {
    /// Check the bounded-column invariants (RSI in [0,100]; range, ratio,
    /// and volume SMA non-negative).
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(value) = self.rsi_14 {
            if !(0.0..=100.0).contains(&value) {
                return Err(DomainError::RsiOutOfRange { value });
            }
        }
        if !(self.high_low_range >= 0.0) {
            return Err(DomainError::NegativeFeature {
                field: "high_low_range",
                value: self.high_low_range,
            });
        }
        if !(self.high_low_ratio >= 0.0) {
            return Err(DomainError::NegativeFeature {
                field: "high_low_ratio",
                value: self.high_low_ratio,
            });
        }
        if let Some(value) = self.volume_sma_20 {
            if !(value >= 0.0) {
                return Err(DomainError::NegativeFeature {
                    field: "volume_sma_20",
                    value,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_row() -> TechnicalFeatures {
        TechnicalFeatures {
            metal_id: MetalId::new(1),
            date: "2024-03-01".parse().unwrap(),
            daily_return: None,
            log_return: None,
            sma_5: None,
            sma_10: None,
            sma_20: None,
            sma_50: None,
            ema_12: None,
            ema_26: None,
            bollinger_upper: None,
            bollinger_middle: None,
            bollinger_lower: None,
            bollinger_width: None,
            rsi_14: None,
            macd: None,
            macd_signal: None,
            macd_histogram: None,
            high_low_range: 10.0,
            high_low_ratio: 0.095,
            volume_change: None,
            volume_sma_20: None,
        }
    }

    #[test]
    fn all_null_history_fields_are_valid() {
        assert!(blank_row().validate().is_ok());
    }

    #[test]
    fn rsi_above_bound_is_rejected() {
        let mut row = blank_row();
        row.rsi_14 = Some(100.5);
        assert!(matches!(
            row.validate(),
            Err(DomainError::RsiOutOfRange { .. })
        ));
    }

    #[test]
    fn negative_range_is_rejected() {
        let mut row = blank_row();
        row.high_low_range = -0.25;
        assert!(matches!(
            row.validate(),
            Err(DomainError::NegativeFeature {
                field: "high_low_range",
                ..
            })
        ));
    }
}
