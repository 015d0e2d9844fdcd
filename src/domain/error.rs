//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors and `validate`
//! methods when a domain invariant is violated. The storage layer surfaces
//! them as constraint violations before a row ever reaches the database.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// Price fields must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NonPositivePrice {
        /// Which OHLC or close field was invalid.
        field: &'static str,
        /// The invalid value that was provided.
        value: f64,
    },

    /// Volume must be non-negative when present.
    #[error("volume must be non-negative, got {volume}")]
    NegativeVolume { volume: i64 },

    /// Instruments must have a non-empty symbol.
    #[error("instrument symbol cannot be empty")]
    EmptySymbol,

    /// Strictly-positive macro indicators (USD index, S&P 500 close).
    #[error("{field} must be positive, got {value}")]
    NonPositiveIndicator { field: &'static str, value: f64 },

    /// Non-negative macro indicators (VIX, treasury yield).
    #[error("{field} must be non-negative, got {value}")]
    NegativeIndicator { field: &'static str, value: f64 },

    /// RSI is a bounded oscillator.
    #[error("rsi_14 must lie in [0, 100], got {value}")]
    RsiOutOfRange { value: f64 },

    /// Derived range/ratio/volume-average columns cannot be negative.
    #[error("{field} must be non-negative, got {value}")]
    NegativeFeature { field: &'static str, value: f64 },

    /// The stated percent change disagrees with the closes it was derived
    /// from.
    #[error("price_change_pct {stated} is inconsistent with closes ({derived} expected)")]
    InconsistentChangePct { stated: f64, derived: f64 },
}
