//! Price observation domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MetalId;

/// One day's open/high/low/close quote. All four must be strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Ohlc {
    /// Create a validated OHLC quote.
    ///
    /// # Errors
    /// Returns [`DomainError::NonPositivePrice`] naming the offending field.
    pub fn try_new(open: f64, high: f64, low: f64, close: f64) -> Result<Self, DomainError> {
        let ohlc = Self {
            open,
            high,
            low,
            close,
        };
        ohlc.validate()?;
        Ok(ohlc)
    }

    /// Check the positivity invariant.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !(value > 0.0) {
                return Err(DomainError::NonPositivePrice { field, value });
            }
        }
        Ok(())
    }
}

/// One instrument's OHLCV observation for a single trading day.
///
/// At most one observation exists per (instrument, date); rows are
/// append-only and only removed by a cascading instrument delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub metal_id: MetalId,
    pub date: NaiveDate,
    pub ohlc: Ohlc,
    pub volume: Option<i64>,
    pub adjusted_close: Option<f64>,
    pub source: String,
}

impl PriceObservation {
    /// Create a validated observation.
    ///
    /// # Errors
    /// Returns a [`DomainError`] if a price is non-positive or the volume
    /// is negative.
    pub fn try_new(
        metal_id: MetalId,
        date: NaiveDate,
        ohlc: Ohlc,
        volume: Option<i64>,
        adjusted_close: Option<f64>,
        source: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let observation = Self {
            metal_id,
            date,
            ohlc,
            volume,
            adjusted_close,
            source: source.into(),
        };
        observation.validate()?;
        Ok(observation)
    }

    /// Check the persistence invariants (prices positive, volume
    /// non-negative when present).
    pub fn validate(&self) -> Result<(), DomainError> {
        self.ohlc.validate()?;
        if let Some(volume) = self.volume {
            if volume < 0 {
                return Err(DomainError::NegativeVolume { volume });
            }
        }
        Ok(())
    }

    /// Closing price shorthand.
    #[must_use]
    pub fn close(&self) -> f64 {
        self.ohlc.close
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn ohlc_rejects_zero_close() {
        let result = Ohlc::try_new(100.0, 110.0, 95.0, 0.0);
        assert!(matches!(
            result,
            Err(DomainError::NonPositivePrice { field: "close", .. })
        ));
    }

    #[test]
    fn ohlc_rejects_nan() {
        assert!(Ohlc::try_new(f64::NAN, 110.0, 95.0, 100.0).is_err());
    }

    #[test]
    fn observation_rejects_negative_volume() {
        let ohlc = Ohlc::try_new(100.0, 110.0, 95.0, 105.0).unwrap();
        let result = PriceObservation::try_new(
            MetalId::new(1),
            date("2024-01-02"),
            ohlc,
            Some(-5),
            None,
            "yfinance",
        );
        assert!(matches!(
            result,
            Err(DomainError::NegativeVolume { volume: -5 })
        ));
    }

    #[test]
    fn observation_accepts_missing_volume() {
        let ohlc = Ohlc::try_new(100.0, 110.0, 95.0, 105.0).unwrap();
        let obs = PriceObservation::try_new(
            MetalId::new(1),
            date("2024-01-02"),
            ohlc,
            None,
            Some(104.5),
            "yfinance",
        )
        .unwrap();
        assert_eq!(obs.close(), 105.0);
    }
}
