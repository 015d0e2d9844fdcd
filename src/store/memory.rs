//! In-memory store implementation for testing.
//!
//! Mirrors the SQLite store's behavior, including first-wins duplicate
//! handling, constraint-style validation, and cascade deletes, without
//! touching a database.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use parking_lot::RwLock;

use super::{
    BatchOutcome, CoverageReader, DateRange, FeatureStore, InstrumentRegistry, MacroStore,
    PriceStore, RiskEventStore, WriteOutcome,
};
use crate::domain::{
    CoverageReport, Instrument, InstrumentCoverage, InstrumentSpec, MacroObservation, MetalId,
    PriceObservation, RiskEvent, TechnicalFeatures,
};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct Inner {
    next_metal_id: i32,
    instruments: Vec<Instrument>,
    prices: BTreeMap<(MetalId, NaiveDate), PriceObservation>,
    macros: BTreeMap<NaiveDate, MacroObservation>,
    features: BTreeMap<(MetalId, NaiveDate), TechnicalFeatures>,
    risk_events: BTreeMap<(MetalId, NaiveDate), RiskEvent>,
}

/// In-memory store for testing purposes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn known_instrument(inner: &Inner, metal_id: MetalId) -> Result<()> {
        if inner.instruments.iter().any(|i| i.id == metal_id) {
            Ok(())
        } else {
            Err(Error::Constraint(format!(
                "FOREIGN KEY constraint failed: unknown instrument {metal_id}"
            )))
        }
    }

    fn series_of<T: Clone>(
        map: &BTreeMap<(MetalId, NaiveDate), T>,
        metal_id: MetalId,
        range: DateRange,
    ) -> Vec<T> {
        map.range((metal_id, NaiveDate::MIN)..=(metal_id, NaiveDate::MAX))
            .filter(|((_, date), _)| range.contains(*date))
            .map(|(_, value)| value.clone())
            .collect()
    }
}

impl InstrumentRegistry for MemoryStore {
    async fn register(&self, spec: &InstrumentSpec) -> Result<Instrument> {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.instruments.iter().find(|i| i.symbol == spec.symbol) {
            return Ok(existing.clone());
        }
        inner.next_metal_id += 1;
        let instrument = Instrument {
            id: MetalId::new(inner.next_metal_id),
            symbol: spec.symbol.clone(),
            name: spec.name.clone(),
            ticker: spec.ticker.clone(),
            market_type: spec.market_type.clone(),
        };
        inner.instruments.push(instrument.clone());
        Ok(instrument)
    }

    async fn lookup(&self, symbol: &str) -> Result<Option<Instrument>> {
        let inner = self.inner.read();
        Ok(inner
            .instruments
            .iter()
            .find(|i| i.symbol == symbol)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Instrument>> {
        Ok(self.inner.read().instruments.clone())
    }

    async fn remove(&self, symbol: &str) -> Result<bool> {
        let mut inner = self.inner.write();
        let Some(position) = inner.instruments.iter().position(|i| i.symbol == symbol) else {
            return Ok(false);
        };
        let id = inner.instruments.remove(position).id;
        inner.prices.retain(|(metal_id, _), _| *metal_id != id);
        inner.features.retain(|(metal_id, _), _| *metal_id != id);
        inner.risk_events.retain(|(metal_id, _), _| *metal_id != id);
        Ok(true)
    }
}

impl PriceStore for MemoryStore {
    async fn record_price(&self, observation: &PriceObservation) -> Result<WriteOutcome> {
        observation
            .validate()
            .map_err(|e| Error::Constraint(e.to_string()))?;
        let mut inner = self.inner.write();
        Self::known_instrument(&inner, observation.metal_id)?;
        let key = (observation.metal_id, observation.date);
        if inner.prices.contains_key(&key) {
            return Ok(WriteOutcome::SkippedDuplicate);
        }
        inner.prices.insert(key, observation.clone());
        Ok(WriteOutcome::Inserted)
    }

    async fn record_prices(&self, observations: &[PriceObservation]) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for observation in observations {
            outcome.absorb(self.record_price(observation).await?);
        }
        Ok(outcome)
    }

    async fn price_series(
        &self,
        metal_id: MetalId,
        range: DateRange,
    ) -> Result<Vec<PriceObservation>> {
        Ok(Self::series_of(&self.inner.read().prices, metal_id, range))
    }

    async fn prices_on_date(&self, date: NaiveDate) -> Result<Vec<PriceObservation>> {
        let inner = self.inner.read();
        Ok(inner
            .prices
            .values()
            .filter(|obs| obs.date == date)
            .cloned()
            .collect())
    }
}

impl MacroStore for MemoryStore {
    async fn record_macro(&self, observation: &MacroObservation) -> Result<WriteOutcome> {
        observation
            .validate()
            .map_err(|e| Error::Constraint(e.to_string()))?;
        let mut inner = self.inner.write();
        if inner.macros.contains_key(&observation.date) {
            return Ok(WriteOutcome::SkippedDuplicate);
        }
        inner.macros.insert(observation.date, observation.clone());
        Ok(WriteOutcome::Inserted)
    }

    async fn record_macros(&self, observations: &[MacroObservation]) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for observation in observations {
            outcome.absorb(self.record_macro(observation).await?);
        }
        Ok(outcome)
    }

    async fn macro_series(&self, range: DateRange) -> Result<Vec<MacroObservation>> {
        let inner = self.inner.read();
        Ok(inner
            .macros
            .values()
            .filter(|obs| range.contains(obs.date))
            .cloned()
            .collect())
    }
}

impl FeatureStore for MemoryStore {
    async fn record_features(&self, rows: &[TechnicalFeatures]) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for row in rows {
            row.validate().map_err(|e| Error::Constraint(e.to_string()))?;
            let mut inner = self.inner.write();
            Self::known_instrument(&inner, row.metal_id)?;
            let key = (row.metal_id, row.date);
            if inner.features.contains_key(&key) {
                outcome.absorb(WriteOutcome::SkippedDuplicate);
            } else {
                inner.features.insert(key, row.clone());
                outcome.absorb(WriteOutcome::Inserted);
            }
        }
        Ok(outcome)
    }

    async fn feature_series(
        &self,
        metal_id: MetalId,
        range: DateRange,
    ) -> Result<Vec<TechnicalFeatures>> {
        Ok(Self::series_of(
            &self.inner.read().features,
            metal_id,
            range,
        ))
    }
}

impl RiskEventStore for MemoryStore {
    async fn record_risk_events(&self, events: &[RiskEvent]) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for event in events {
            event
                .validate()
                .map_err(|e| Error::Constraint(e.to_string()))?;
            let mut inner = self.inner.write();
            Self::known_instrument(&inner, event.metal_id)?;
            let key = (event.metal_id, event.date);
            if inner.risk_events.contains_key(&key) {
                outcome.absorb(WriteOutcome::SkippedDuplicate);
            } else {
                inner.risk_events.insert(key, event.clone());
                outcome.absorb(WriteOutcome::Inserted);
            }
        }
        Ok(outcome)
    }

    async fn risk_event_series(
        &self,
        metal_id: MetalId,
        range: DateRange,
    ) -> Result<Vec<RiskEvent>> {
        Ok(Self::series_of(
            &self.inner.read().risk_events,
            metal_id,
            range,
        ))
    }
}

impl CoverageReader for MemoryStore {
    async fn coverage(&self) -> Result<CoverageReport> {
        let inner = self.inner.read();
        let instruments = inner
            .instruments
            .iter()
            .map(|instrument| {
                let mut dates = inner
                    .prices
                    .range((instrument.id, NaiveDate::MIN)..=(instrument.id, NaiveDate::MAX))
                    .map(|((_, date), _)| *date);
                let first_date = dates.next();
                let last_date = dates.next_back().or(first_date);
                InstrumentCoverage {
                    symbol: instrument.symbol.clone(),
                    name: instrument.name.clone(),
                    price_rows: inner
                        .prices
                        .range((instrument.id, NaiveDate::MIN)..=(instrument.id, NaiveDate::MAX))
                        .count() as i64,
                    first_date,
                    last_date,
                    feature_rows: inner
                        .features
                        .range((instrument.id, NaiveDate::MIN)..=(instrument.id, NaiveDate::MAX))
                        .count() as i64,
                    risk_rows: inner
                        .risk_events
                        .range((instrument.id, NaiveDate::MIN)..=(instrument.id, NaiveDate::MAX))
                        .count() as i64,
                    flagged_risk_events: inner
                        .risk_events
                        .range((instrument.id, NaiveDate::MIN)..=(instrument.id, NaiveDate::MAX))
                        .filter(|(_, event)| event.is_risk_event)
                        .count() as i64,
                }
            })
            .collect();

        Ok(CoverageReport {
            price_rows: inner.prices.len() as i64,
            macro_rows: inner.macros.len() as i64,
            feature_rows: inner.features.len() as i64,
            risk_rows: inner.risk_events.len() as i64,
            flagged_risk_events: inner
                .risk_events
                .values()
                .filter(|event| event.is_risk_event)
                .count() as i64,
            instruments,
        })
    }
}
