//! Instrument registry domain types.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MetalId;

/// A registered tradable instrument.
///
/// Immutable reference data: created at setup time and never updated.
/// Deleting one cascades to all of its price, feature, and risk rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: MetalId,
    pub symbol: String,
    pub name: String,
    /// Ticker used by the external market-data source.
    pub ticker: String,
    /// Market classification, e.g. `precious` or `industrial`. Open-ended.
    pub market_type: String,
}

/// Registration input for an instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentSpec {
    pub symbol: String,
    pub name: String,
    pub ticker: String,
    pub market_type: String,
}

impl InstrumentSpec {
    /// Create a validated registration spec.
    ///
    /// # Errors
    /// Returns [`DomainError::EmptySymbol`] if the symbol is blank.
    pub fn try_new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        ticker: impl Into<String>,
        market_type: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(DomainError::EmptySymbol);
        }
        Ok(Self {
            symbol,
            name: name.into(),
            ticker: ticker.into(),
            market_type: market_type.into(),
        })
    }
}

/// The seed instrument list: (symbol, name, ticker, market type).
///
/// Seeding is idempotent; re-running setup leaves exactly these three rows.
pub const DEFAULT_INSTRUMENTS: [(&str, &str, &str, &str); 3] = [
    ("GOLD", "Gold", "GC=F", "precious"),
    ("SILVER", "Silver", "SI=F", "precious"),
    ("COPPER", "Copper", "HG=F", "industrial"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_rejects_empty_symbol() {
        let result = InstrumentSpec::try_new("  ", "Gold", "GC=F", "precious");
        assert!(matches!(result, Err(DomainError::EmptySymbol)));
    }

    #[test]
    fn spec_accepts_seed_instruments() {
        for (symbol, name, ticker, market_type) in DEFAULT_INSTRUMENTS {
            assert!(InstrumentSpec::try_new(symbol, name, ticker, market_type).is_ok());
        }
    }
}
