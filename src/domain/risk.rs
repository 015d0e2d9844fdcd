//! Labeled risk events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MetalId;

/// Relative tolerance when checking that a stated percent change matches
/// the closes it claims to be derived from.
const CONSISTENCY_EPSILON: f64 = 1e-9;

/// One instrument-day risk label and the price move that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvent {
    pub metal_id: MetalId,
    pub date: NaiveDate,
    pub is_risk_event: bool,
    /// Signed percent change from the previous close.
    pub price_change_pct: f64,
    pub previous_close: f64,
    pub current_close: f64,
}

impl RiskEvent {
    /// Create a validated risk event from fully specified fields.
    ///
    /// # Errors
    /// Returns a [`DomainError`] if a close is non-positive or the stated
    /// percent change disagrees with the closes.
    pub fn try_new(
        metal_id: MetalId,
        date: NaiveDate,
        is_risk_event: bool,
        price_change_pct: f64,
        previous_close: f64,
        current_close: f64,
    ) -> Result<Self, DomainError> {
        let event = Self {
            metal_id,
            date,
            is_risk_event,
            price_change_pct,
            previous_close,
            current_close,
        };
        event.validate()?;
        Ok(event)
    }

    /// Label a day from its consecutive closes.
    ///
    /// The event fires when the absolute move strictly exceeds
    /// `threshold_pct`; a move of exactly the threshold is not an event.
    ///
    /// # Errors
    /// Returns a [`DomainError`] if either close is non-positive.
    pub fn label(
        metal_id: MetalId,
        date: NaiveDate,
        previous_close: f64,
        current_close: f64,
        threshold_pct: f64,
    ) -> Result<Self, DomainError> {
        for (field, value) in [
            ("previous_close", previous_close),
            ("current_close", current_close),
        ] {
            if !(value > 0.0) {
                return Err(DomainError::NonPositivePrice { field, value });
            }
        }
        let price_change_pct = (current_close - previous_close) / previous_close * 100.0;
        Ok(Self {
            metal_id,
            date,
            is_risk_event: price_change_pct.abs() > threshold_pct,
            price_change_pct,
            previous_close,
            current_close,
        })
    }

    /// Check positivity and the algebraic consistency of the stated change.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("previous_close", self.previous_close),
            ("current_close", self.current_close),
        ] {
            if !(value > 0.0) {
                return Err(DomainError::NonPositivePrice { field, value });
            }
        }
        let derived = (self.current_close - self.previous_close) / self.previous_close * 100.0;
        let tolerance = CONSISTENCY_EPSILON * derived.abs().max(1.0);
        if (self.price_change_pct - derived).abs() > tolerance {
            return Err(DomainError::InconsistentChangePct {
                stated: self.price_change_pct,
                derived,
            });
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
    fn label_computes_signed_percent_change() {
        let event =
            RiskEvent::label(MetalId::new(1), date("2024-01-03"), 103.0, 98.0, 3.0).unwrap();
        assert!((event.price_change_pct - (-4.854368932038835)).abs() < 1e-9);
        assert!(event.is_risk_event);
    }

    #[test]
    fn move_of_exactly_threshold_is_not_an_event() {
        let event =
            RiskEvent::label(MetalId::new(1), date("2024-01-02"), 100.0, 103.0, 3.0).unwrap();
        assert_eq!(event.price_change_pct, 3.0);
        assert!(!event.is_risk_event);
    }

    #[test]
    fn label_rejects_non_positive_previous_close() {
        let result = RiskEvent::label(MetalId::new(1), date("2024-01-02"), 0.0, 103.0, 3.0);
        assert!(matches!(
            result,
            Err(DomainError::NonPositivePrice {
                field: "previous_close",
                ..
            })
        ));
    }

    #[test]
    fn try_new_rejects_inconsistent_change() {
        let result = RiskEvent::try_new(
            MetalId::new(1),
            date("2024-01-02"),
            false,
            1.5,
            100.0,
            103.0,
        );
        assert!(matches!(
            result,
            Err(DomainError::InconsistentChangePct { .. })
        ));
    }

    #[test]
    fn try_new_accepts_consistent_change() {
        let event = RiskEvent::try_new(
            MetalId::new(1),
            date("2024-01-02"),
            false,
            3.0,
            100.0,
            103.0,
        )
        .unwrap();
        assert!(!event.is_risk_event);
    }
}
