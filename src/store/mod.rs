//! Persistence ports for the feature store.
//!
//! One trait per table family, implemented by [`SqliteStore`] for durable
//! storage and [`MemoryStore`] for tests. Duplicate keys resolve
//! first-wins everywhere: a write that lands on an existing
//! (instrument, date) key is skipped and reported, never an error.

pub mod memory;
pub mod sqlite;

use std::future::Future;

use chrono::NaiveDate;

use crate::domain::{
    CoverageReport, Instrument, InstrumentSpec, MacroObservation, MetalId, PriceObservation,
    RiskEvent, TechnicalFeatures,
};
use crate::error::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Outcome of a single keyed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The row was inserted.
    Inserted,
    /// A row already existed for the key; the write was skipped.
    SkippedDuplicate,
}

/// Outcome of a batch of keyed writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub inserted: usize,
    pub skipped: usize,
}

impl BatchOutcome {
    /// Fold a single write outcome into the batch tally.
    pub fn absorb(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Inserted => self.inserted += 1,
            WriteOutcome::SkippedDuplicate => self.skipped += 1,
        }
    }
}

/// Inclusive date-range filter; `None` bounds are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// The full, unbounded range.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    /// Whether a date falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Registry operations for instruments.
pub trait InstrumentRegistry: Send + Sync {
    /// Register an instrument, or return the existing row when the symbol
    /// is already taken (idempotent upsert-by-symbol).
    fn register(&self, spec: &InstrumentSpec) -> impl Future<Output = Result<Instrument>> + Send;

    /// Look up an instrument by symbol.
    fn lookup(&self, symbol: &str) -> impl Future<Output = Result<Option<Instrument>>> + Send;

    /// List all instruments ordered by id.
    fn list(&self) -> impl Future<Output = Result<Vec<Instrument>>> + Send;

    /// Delete an instrument and, by cascade, all of its price, feature,
    /// and risk rows. Returns whether a row was deleted.
    fn remove(&self, symbol: &str) -> impl Future<Output = Result<bool>> + Send;
}

/// Append-only storage for price observations.
pub trait PriceStore: Send + Sync {
    /// Append one observation; first-wins on a duplicate (instrument, date).
    fn record_price(
        &self,
        observation: &PriceObservation,
    ) -> impl Future<Output = Result<WriteOutcome>> + Send;

    /// Append a batch atomically, tallying inserts and duplicate skips.
    fn record_prices(
        &self,
        observations: &[PriceObservation],
    ) -> impl Future<Output = Result<BatchOutcome>> + Send;

    /// One instrument's observations in the range, ascending by date.
    fn price_series(
        &self,
        metal_id: MetalId,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<PriceObservation>>> + Send;

    /// Every instrument's observation for one date.
    fn prices_on_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<PriceObservation>>> + Send;
}

/// Append-only storage for macro observations.
pub trait MacroStore: Send + Sync {
    /// Append one observation; first-wins on a duplicate date.
    fn record_macro(
        &self,
        observation: &MacroObservation,
    ) -> impl Future<Output = Result<WriteOutcome>> + Send;

    /// Append a batch atomically.
    fn record_macros(
        &self,
        observations: &[MacroObservation],
    ) -> impl Future<Output = Result<BatchOutcome>> + Send;

    /// Observations in the range, ascending by date.
    fn macro_series(
        &self,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<MacroObservation>>> + Send;
}

/// Storage for derived feature rows.
pub trait FeatureStore: Send + Sync {
    /// Write a batch of feature rows; first-wins per (instrument, date).
    fn record_features(
        &self,
        rows: &[TechnicalFeatures],
    ) -> impl Future<Output = Result<BatchOutcome>> + Send;

    /// One instrument's feature rows in the range, ascending by date.
    fn feature_series(
        &self,
        metal_id: MetalId,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<TechnicalFeatures>>> + Send;
}

/// Storage for labeled risk events.
pub trait RiskEventStore: Send + Sync {
    /// Write a batch of risk events; first-wins per (instrument, date).
    fn record_risk_events(
        &self,
        events: &[RiskEvent],
    ) -> impl Future<Output = Result<BatchOutcome>> + Send;

    /// One instrument's risk events in the range, ascending by date.
    fn risk_event_series(
        &self,
        metal_id: MetalId,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<RiskEvent>>> + Send;
}

/// Read-side coverage queries for operator reporting.
pub trait CoverageReader: Send + Sync {
    /// Row counts and per-instrument date coverage.
    fn coverage(&self) -> impl Future<Output = Result<CoverageReport>> + Send;
}
