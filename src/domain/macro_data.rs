//! Market-wide macroeconomic observation types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// One calendar day of market-wide indicators.
///
/// Not tied to any instrument; `date` is unique across the whole store.
/// Individual indicators may be absent on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroObservation {
    pub date: NaiveDate,
    pub usd_index: Option<f64>,
    pub vix: Option<f64>,
    pub treasury_yield_10y: Option<f64>,
    pub sp500_close: Option<f64>,
    pub sp500_return: Option<f64>,
    pub source: String,
}

impl MacroObservation {
    /// Create a validated macro observation.
    ///
    /// # Errors
    /// Returns a [`DomainError`] naming the offending indicator.
    #[allow(clippy::too_many_arguments)]
    pub fn try_new(
        date: NaiveDate,
        usd_index: Option<f64>,
        vix: Option<f64>,
        treasury_yield_10y: Option<f64>,
        sp500_close: Option<f64>,
        sp500_return: Option<f64>,
        source: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let observation = Self {
            date,
            usd_index,
            vix,
            treasury_yield_10y,
            sp500_close,
            sp500_return,
            source: source.into(),
        };
        observation.validate()?;
        Ok(observation)
    }

    /// Check per-indicator range invariants.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("usd_index", self.usd_index),
            ("sp500_close", self.sp500_close),
        ] {
            if let Some(value) = value {
                if !(value > 0.0) {
                    return Err(DomainError::NonPositiveIndicator { field, value });
                }
            }
        }
        for (field, value) in [
            ("vix", self.vix),
            ("treasury_yield_10y", self.treasury_yield_10y),
        ] {
            if let Some(value) = value {
                if !(value >= 0.0) {
                    return Err(DomainError::NegativeIndicator { field, value });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn rejects_zero_usd_index() {
        let result = MacroObservation::try_new(
            date("2024-01-02"),
            Some(0.0),
            Some(15.2),
            Some(4.1),
            Some(4700.0),
            Some(0.004),
            "yfinance",
        );
        assert!(matches!(
            result,
            Err(DomainError::NonPositiveIndicator {
                field: "usd_index",
                ..
            })
        ));
    }

    #[test]
    fn vix_may_be_zero_but_not_negative() {
        let ok = MacroObservation::try_new(
            date("2024-01-02"),
            None,
            Some(0.0),
            None,
            None,
            None,
            "yfinance",
        );
        assert!(ok.is_ok());

        let bad = MacroObservation::try_new(
            date("2024-01-02"),
            None,
            Some(-1.0),
            None,
            None,
            None,
            "yfinance",
        );
        assert!(matches!(
            bad,
            Err(DomainError::NegativeIndicator { field: "vix", .. })
        ));
    }

    #[test]
    fn signed_sp500_return_is_unconstrained() {
        let obs = MacroObservation::try_new(
            date("2024-01-02"),
            Some(102.3),
            Some(15.2),
            Some(4.1),
            Some(4700.0),
            Some(-0.021),
            "yfinance",
        )
        .unwrap();
        assert_eq!(obs.sp500_return, Some(-0.021));
    }
}
