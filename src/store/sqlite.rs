//! SQLite store implementation using Diesel.
//!
//! One struct implements every port. Writes re-check domain invariants
//! before touching the database, so a violation surfaces as a constraint
//! error with no row persisted even if the SQL CHECK would have caught it.

use chrono::NaiveDate;
use diesel::prelude::*;

use super::{
    BatchOutcome, CoverageReader, DateRange, FeatureStore, InstrumentRegistry, MacroStore,
    PriceStore, RiskEventStore, WriteOutcome,
};
use crate::db::model::{
    MacroRow, MetalRow, NewMacroRow, NewMetalRow, NewPriceRow, NewRiskEventRow,
    NewTechnicalFeatureRow, PriceRow, RiskEventRow, TechnicalFeatureRow,
};
use crate::db::schema::{macroeconomic_data, metals, price_data, risk_events, technical_features};
use crate::db::DbPool;
use crate::domain::{
    CoverageReport, Instrument, InstrumentCoverage, InstrumentSpec, MacroObservation, MetalId,
    Ohlc, PriceObservation, RiskEvent, TechnicalFeatures,
};
use crate::error::{Error, Result};

/// SQLite-backed store for every table family.
#[derive(Clone)]
pub struct SqliteStore {
    /// Database connection pool.
    pool: DbPool,
}

type PooledConn = diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>;

impl SqliteStore {
    /// Create a new SQLite store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConn> {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }

    fn instrument_from_row(row: MetalRow) -> Instrument {
        Instrument {
            id: MetalId::new(row.metal_id),
            symbol: row.symbol,
            name: row.name,
            ticker: row.yfinance_ticker,
            market_type: row.market_type,
        }
    }

    fn price_to_row(observation: &PriceObservation) -> NewPriceRow {
        NewPriceRow {
            metal_id: observation.metal_id.as_i32(),
            date: observation.date,
            open: observation.ohlc.open,
            high: observation.ohlc.high,
            low: observation.ohlc.low,
            close: observation.ohlc.close,
            volume: observation.volume,
            adjusted_close: observation.adjusted_close,
            data_source: observation.source.clone(),
        }
    }

    fn price_from_row(row: PriceRow) -> PriceObservation {
        PriceObservation {
            metal_id: MetalId::new(row.metal_id),
            date: row.date,
            ohlc: Ohlc {
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
            },
            volume: row.volume,
            adjusted_close: row.adjusted_close,
            source: row.data_source,
        }
    }

    fn macro_to_row(observation: &MacroObservation) -> NewMacroRow {
        NewMacroRow {
            date: observation.date,
            usd_index: observation.usd_index,
            vix: observation.vix,
            treasury_yield_10y: observation.treasury_yield_10y,
            sp500_close: observation.sp500_close,
            sp500_return: observation.sp500_return,
            data_source: observation.source.clone(),
        }
    }

    fn features_to_row(row: &TechnicalFeatures) -> NewTechnicalFeatureRow {
        NewTechnicalFeatureRow {
            metal_id: row.metal_id.as_i32(),
            date: row.date,
            daily_return: row.daily_return,
            log_return: row.log_return,
            sma_5: row.sma_5,
            sma_10: row.sma_10,
            sma_20: row.sma_20,
            sma_50: row.sma_50,
            ema_12: row.ema_12,
            ema_26: row.ema_26,
            bollinger_upper: row.bollinger_upper,
            bollinger_middle: row.bollinger_middle,
            bollinger_lower: row.bollinger_lower,
            bollinger_width: row.bollinger_width,
            rsi_14: row.rsi_14,
            macd: row.macd,
            macd_signal: row.macd_signal,
            macd_histogram: row.macd_histogram,
            high_low_range: row.high_low_range,
            high_low_ratio: row.high_low_ratio,
            volume_change: row.volume_change,
            volume_sma_20: row.volume_sma_20,
        }
    }

    fn features_from_row(row: TechnicalFeatureRow) -> TechnicalFeatures {
        TechnicalFeatures {
            metal_id: MetalId::new(row.metal_id),
            date: row.date,
            daily_return: row.daily_return,
            log_return: row.log_return,
            sma_5: row.sma_5,
            sma_10: row.sma_10,
            sma_20: row.sma_20,
            sma_50: row.sma_50,
            ema_12: row.ema_12,
            ema_26: row.ema_26,
            bollinger_upper: row.bollinger_upper,
            bollinger_middle: row.bollinger_middle,
            bollinger_lower: row.bollinger_lower,
            bollinger_width: row.bollinger_width,
            rsi_14: row.rsi_14,
            macd: row.macd,
            macd_signal: row.macd_signal,
            macd_histogram: row.macd_histogram,
            high_low_range: row.high_low_range,
            high_low_ratio: row.high_low_ratio,
            volume_change: row.volume_change,
            volume_sma_20: row.volume_sma_20,
        }
    }

    fn risk_to_row(event: &RiskEvent) -> NewRiskEventRow {
        NewRiskEventRow {
            metal_id: event.metal_id.as_i32(),
            date: event.date,
            is_risk_event: event.is_risk_event,
            price_change_pct: event.price_change_pct,
            previous_close: event.previous_close,
            current_close: event.current_close,
        }
    }

    fn risk_from_row(row: RiskEventRow) -> RiskEvent {
        RiskEvent {
            metal_id: MetalId::new(row.metal_id),
            date: row.date,
            is_risk_event: row.is_risk_event,
            price_change_pct: row.price_change_pct,
            previous_close: row.previous_close,
            current_close: row.current_close,
        }
    }
}

/// Diesel errors funnel through `From<diesel::result::Error>` so that
/// constraint kinds surface distinctly; these aliases keep call sites
/// readable.
fn map_write_error(error: diesel::result::Error) -> Error {
    Error::from(error)
}

fn map_read_error(error: diesel::result::Error) -> Error {
    Error::Database(error.to_string())
}

impl InstrumentRegistry for SqliteStore {
    async fn register(&self, spec: &InstrumentSpec) -> Result<Instrument> {
        let mut conn = self.conn()?;
        let row = NewMetalRow {
            symbol: spec.symbol.clone(),
            name: spec.name.clone(),
            yfinance_ticker: spec.ticker.clone(),
            market_type: spec.market_type.clone(),
        };

        diesel::insert_into(metals::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .map_err(map_write_error)?;

        let row: MetalRow = metals::table
            .filter(metals::symbol.eq(&spec.symbol))
            .select(MetalRow::as_select())
            .first(&mut conn)
            .map_err(map_read_error)?;
        Ok(Self::instrument_from_row(row))
    }

    async fn lookup(&self, symbol: &str) -> Result<Option<Instrument>> {
        let mut conn = self.conn()?;
        let row: Option<MetalRow> = metals::table
            .filter(metals::symbol.eq(symbol))
            .select(MetalRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(map_read_error)?;
        Ok(row.map(Self::instrument_from_row))
    }

    async fn list(&self) -> Result<Vec<Instrument>> {
        let mut conn = self.conn()?;
        let rows: Vec<MetalRow> = metals::table
            .order(metals::metal_id.asc())
            .select(MetalRow::as_select())
            .load(&mut conn)
            .map_err(map_read_error)?;
        Ok(rows.into_iter().map(Self::instrument_from_row).collect())
    }

    async fn remove(&self, symbol: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(metals::table.filter(metals::symbol.eq(symbol)))
            .execute(&mut conn)
            .map_err(map_write_error)?;
        Ok(deleted > 0)
    }
}

impl PriceStore for SqliteStore {
    async fn record_price(&self, observation: &PriceObservation) -> Result<WriteOutcome> {
        observation
            .validate()
            .map_err(|e| Error::Constraint(e.to_string()))?;
        let mut conn = self.conn()?;
        let inserted = diesel::insert_into(price_data::table)
            .values(&Self::price_to_row(observation))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .map_err(map_write_error)?;
        Ok(if inserted > 0 {
            WriteOutcome::Inserted
        } else {
            WriteOutcome::SkippedDuplicate
        })
    }

    async fn record_prices(&self, observations: &[PriceObservation]) -> Result<BatchOutcome> {
        for observation in observations {
            observation
                .validate()
                .map_err(|e| Error::Constraint(e.to_string()))?;
        }
        let mut conn = self.conn()?;
        conn.transaction::<_, Error, _>(|conn| {
            let mut outcome = BatchOutcome::default();
            for observation in observations {
                let inserted = diesel::insert_into(price_data::table)
                    .values(&Self::price_to_row(observation))
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .map_err(map_write_error)?;
                outcome.absorb(if inserted > 0 {
                    WriteOutcome::Inserted
                } else {
                    WriteOutcome::SkippedDuplicate
                });
            }
            Ok(outcome)
        })
    }

    async fn price_series(
        &self,
        metal_id: MetalId,
        range: DateRange,
    ) -> Result<Vec<PriceObservation>> {
        let mut conn = self.conn()?;
        let mut query = price_data::table
            .filter(price_data::metal_id.eq(metal_id.as_i32()))
            .select(PriceRow::as_select())
            .into_boxed();
        if let Some(from) = range.from {
            query = query.filter(price_data::date.ge(from));
        }
        if let Some(to) = range.to {
            query = query.filter(price_data::date.le(to));
        }
        let rows: Vec<PriceRow> = query
            .order(price_data::date.asc())
            .load(&mut conn)
            .map_err(map_read_error)?;
        Ok(rows.into_iter().map(Self::price_from_row).collect())
    }

    async fn prices_on_date(&self, date: NaiveDate) -> Result<Vec<PriceObservation>> {
        let mut conn = self.conn()?;
        let rows: Vec<PriceRow> = price_data::table
            .filter(price_data::date.eq(date))
            .order(price_data::metal_id.asc())
            .select(PriceRow::as_select())
            .load(&mut conn)
            .map_err(map_read_error)?;
        Ok(rows.into_iter().map(Self::price_from_row).collect())
    }
}

impl MacroStore for SqliteStore {
    async fn record_macro(&self, observation: &MacroObservation) -> Result<WriteOutcome> {
        observation
            .validate()
            .map_err(|e| Error::Constraint(e.to_string()))?;
        let mut conn = self.conn()?;
        let inserted = diesel::insert_into(macroeconomic_data::table)
            .values(&Self::macro_to_row(observation))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .map_err(map_write_error)?;
        Ok(if inserted > 0 {
            WriteOutcome::Inserted
        } else {
            WriteOutcome::SkippedDuplicate
        })
    }

    async fn record_macros(&self, observations: &[MacroObservation]) -> Result<BatchOutcome> {
        for observation in observations {
            observation
                .validate()
                .map_err(|e| Error::Constraint(e.to_string()))?;
        }
        let mut conn = self.conn()?;
        conn.transaction::<_, Error, _>(|conn| {
            let mut outcome = BatchOutcome::default();
            for observation in observations {
                let inserted = diesel::insert_into(macroeconomic_data::table)
                    .values(&Self::macro_to_row(observation))
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .map_err(map_write_error)?;
                outcome.absorb(if inserted > 0 {
                    WriteOutcome::Inserted
                } else {
                    WriteOutcome::SkippedDuplicate
                });
            }
            Ok(outcome)
        })
    }

    async fn macro_series(&self, range: DateRange) -> Result<Vec<MacroObservation>> {
        let mut conn = self.conn()?;
        let mut query = macroeconomic_data::table
            .select(MacroRow::as_select())
            .into_boxed();
        if let Some(from) = range.from {
            query = query.filter(macroeconomic_data::date.ge(from));
        }
        if let Some(to) = range.to {
            query = query.filter(macroeconomic_data::date.le(to));
        }
        let rows: Vec<MacroRow> = query
            .order(macroeconomic_data::date.asc())
            .load(&mut conn)
            .map_err(map_read_error)?;
        Ok(rows
            .into_iter()
            .map(|row| MacroObservation {
                date: row.date,
                usd_index: row.usd_index,
                vix: row.vix,
                treasury_yield_10y: row.treasury_yield_10y,
                sp500_close: row.sp500_close,
                sp500_return: row.sp500_return,
                source: row.data_source,
            })
            .collect())
    }
}

impl FeatureStore for SqliteStore {
    async fn record_features(&self, rows: &[TechnicalFeatures]) -> Result<BatchOutcome> {
        for row in rows {
            row.validate().map_err(|e| Error::Constraint(e.to_string()))?;
        }
        let mut conn = self.conn()?;
        conn.transaction::<_, Error, _>(|conn| {
            let mut outcome = BatchOutcome::default();
            for row in rows {
                let inserted = diesel::insert_into(technical_features::table)
                    .values(&Self::features_to_row(row))
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .map_err(map_write_error)?;
                outcome.absorb(if inserted > 0 {
                    WriteOutcome::Inserted
                } else {
                    WriteOutcome::SkippedDuplicate
                });
            }
            Ok(outcome)
        })
    }

    async fn feature_series(
        &self,
        metal_id: MetalId,
        range: DateRange,
    ) -> Result<Vec<TechnicalFeatures>> {
        let mut conn = self.conn()?;
        let mut query = technical_features::table
            .filter(technical_features::metal_id.eq(metal_id.as_i32()))
            .select(TechnicalFeatureRow::as_select())
            .into_boxed();
        if let Some(from) = range.from {
            query = query.filter(technical_features::date.ge(from));
        }
        if let Some(to) = range.to {
            query = query.filter(technical_features::date.le(to));
        }
        let rows: Vec<TechnicalFeatureRow> = query
            .order(technical_features::date.asc())
            .load(&mut conn)
            .map_err(map_read_error)?;
        Ok(rows.into_iter().map(Self::features_from_row).collect())
    }
}

impl RiskEventStore for SqliteStore {
    async fn record_risk_events(&self, events: &[RiskEvent]) -> Result<BatchOutcome> {
        for event in events {
            event
                .validate()
                .map_err(|e| Error::Constraint(e.to_string()))?;
        }
        let mut conn = self.conn()?;
        conn.transaction::<_, Error, _>(|conn| {
            let mut outcome = BatchOutcome::default();
            for event in events {
                let inserted = diesel::insert_into(risk_events::table)
                    .values(&Self::risk_to_row(event))
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .map_err(map_write_error)?;
                outcome.absorb(if inserted > 0 {
                    WriteOutcome::Inserted
                } else {
                    WriteOutcome::SkippedDuplicate
                });
            }
            Ok(outcome)
        })
    }

    async fn risk_event_series(
        &self,
        metal_id: MetalId,
        range: DateRange,
    ) -> Result<Vec<RiskEvent>> {
        let mut conn = self.conn()?;
        let mut query = risk_events::table
            .filter(risk_events::metal_id.eq(metal_id.as_i32()))
            .select(RiskEventRow::as_select())
            .into_boxed();
        if let Some(from) = range.from {
            query = query.filter(risk_events::date.ge(from));
        }
        if let Some(to) = range.to {
            query = query.filter(risk_events::date.le(to));
        }
        let rows: Vec<RiskEventRow> = query
            .order(risk_events::date.asc())
            .load(&mut conn)
            .map_err(map_read_error)?;
        Ok(rows.into_iter().map(Self::risk_from_row).collect())
    }
}

impl CoverageReader for SqliteStore {
    async fn coverage(&self) -> Result<CoverageReport> {
        use diesel::dsl::{count_star, max, min};

        let mut conn = self.conn()?;

        let price_rows: i64 = price_data::table
            .select(count_star())
            .first(&mut conn)
            .map_err(map_read_error)?;
        let macro_rows: i64 = macroeconomic_data::table
            .select(count_star())
            .first(&mut conn)
            .map_err(map_read_error)?;
        let feature_rows: i64 = technical_features::table
            .select(count_star())
            .first(&mut conn)
            .map_err(map_read_error)?;
        let risk_rows: i64 = risk_events::table
            .select(count_star())
            .first(&mut conn)
            .map_err(map_read_error)?;
        let flagged_risk_events: i64 = risk_events::table
            .filter(risk_events::is_risk_event.eq(true))
            .select(count_star())
            .first(&mut conn)
            .map_err(map_read_error)?;

        let instruments: Vec<MetalRow> = metals::table
            .order(metals::metal_id.asc())
            .select(MetalRow::as_select())
            .load(&mut conn)
            .map_err(map_read_error)?;

        let mut per_instrument = Vec::with_capacity(instruments.len());
        for metal in instruments {
            let price_count: i64 = price_data::table
                .filter(price_data::metal_id.eq(metal.metal_id))
                .select(count_star())
                .first(&mut conn)
                .map_err(map_read_error)?;
            let (first_date, last_date): (Option<NaiveDate>, Option<NaiveDate>) = price_data::table
                .filter(price_data::metal_id.eq(metal.metal_id))
                .select((min(price_data::date), max(price_data::date)))
                .first(&mut conn)
                .map_err(map_read_error)?;
            let feature_count: i64 = technical_features::table
                .filter(technical_features::metal_id.eq(metal.metal_id))
                .select(count_star())
                .first(&mut conn)
                .map_err(map_read_error)?;
            let risk_count: i64 = risk_events::table
                .filter(risk_events::metal_id.eq(metal.metal_id))
                .select(count_star())
                .first(&mut conn)
                .map_err(map_read_error)?;
            let flagged: i64 = risk_events::table
                .filter(risk_events::metal_id.eq(metal.metal_id))
                .filter(risk_events::is_risk_event.eq(true))
                .select(count_star())
                .first(&mut conn)
                .map_err(map_read_error)?;

            per_instrument.push(InstrumentCoverage {
                symbol: metal.symbol,
                name: metal.name,
                price_rows: price_count,
                first_date,
                last_date,
                feature_rows: feature_count,
                risk_rows: risk_count,
                flagged_risk_events: flagged,
            });
        }

        Ok(CoverageReport {
            price_rows,
            macro_rows,
            feature_rows,
            risk_rows,
            flagged_risk_events,
            instruments: per_instrument,
        })
    }
}
