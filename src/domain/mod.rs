//! Core domain types for the feature store.
//!
//! Everything in this module is storage-agnostic: validated value types for
//! instruments, price and macro observations, derived technical features,
//! and labeled risk events, plus the rolling-window indicator math that
//! produces the derived columns.

pub mod coverage;
pub mod error;
pub mod features;
pub mod id;
pub mod indicator;
pub mod instrument;
pub mod macro_data;
pub mod price;
pub mod risk;

pub use coverage::{CoverageReport, InstrumentCoverage};
pub use error::DomainError;
pub use features::TechnicalFeatures;
pub use id::MetalId;
pub use instrument::{Instrument, InstrumentSpec, DEFAULT_INSTRUMENTS};
pub use macro_data::MacroObservation;
pub use price::{Ohlc, PriceObservation};
pub use risk::RiskEvent;
