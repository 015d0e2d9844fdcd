//! Database model types for Diesel ORM.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use super::schema::{macroeconomic_data, metals, price_data, risk_events, technical_features};

/// Database row for an instrument.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = metals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MetalRow {
    pub metal_id: i32,
    pub symbol: String,
    pub name: String,
    pub yfinance_ticker: String,
    pub market_type: String,
}

/// Database row for an instrument (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = metals)]
pub struct NewMetalRow {
    pub symbol: String,
    pub name: String,
    pub yfinance_ticker: String,
    pub market_type: String,
}

/// Database row for a price observation.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = price_data)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceRow {
    pub price_id: i32,
    pub metal_id: i32,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
    pub adjusted_close: Option<f64>,
    pub data_source: String,
    pub created_at: NaiveDateTime,
}

/// Database row for a price observation (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = price_data)]
pub struct NewPriceRow {
    pub metal_id: i32,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
    pub adjusted_close: Option<f64>,
    pub data_source: String,
}

/// Database row for a macro observation.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = macroeconomic_data)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MacroRow {
    pub macro_id: i32,
    pub date: NaiveDate,
    pub usd_index: Option<f64>,
    pub vix: Option<f64>,
    pub treasury_yield_10y: Option<f64>,
    pub sp500_close: Option<f64>,
    pub sp500_return: Option<f64>,
    pub data_source: String,
    pub created_at: NaiveDateTime,
}

/// Database row for a macro observation (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = macroeconomic_data)]
pub struct NewMacroRow {
    pub date: NaiveDate,
    pub usd_index: Option<f64>,
    pub vix: Option<f64>,
    pub treasury_yield_10y: Option<f64>,
    pub sp500_close: Option<f64>,
    pub sp500_return: Option<f64>,
    pub data_source: String,
}

/// Database row for a technical feature vector.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = technical_features)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TechnicalFeatureRow {
    pub feature_id: i32,
    pub metal_id: i32,
    pub date: NaiveDate,
    pub daily_return: Option<f64>,
    pub log_return: Option<f64>,
    pub sma_5: Option<f64>,
    pub sma_10: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub bollinger_width: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub high_low_range: f64,
    pub high_low_ratio: f64,
    pub volume_change: Option<f64>,
    pub volume_sma_20: Option<f64>,
    pub created_at: NaiveDateTime,
}

/// Database row for a technical feature vector (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = technical_features)]
pub struct NewTechnicalFeatureRow {
    pub metal_id: i32,
    pub date: NaiveDate,
    pub daily_return: Option<f64>,
    pub log_return: Option<f64>,
    pub sma_5: Option<f64>,
    pub sma_10: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub bollinger_width: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub high_low_range: f64,
    pub high_low_ratio: f64,
    pub volume_change: Option<f64>,
    pub volume_sma_20: Option<f64>,
}

/// Database row for a risk event.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = risk_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RiskEventRow {
    pub event_id: i32,
    pub metal_id: i32,
    pub date: NaiveDate,
    pub is_risk_event: bool,
    pub price_change_pct: f64,
    pub previous_close: f64,
    pub current_close: f64,
    pub created_at: NaiveDateTime,
}

/// Database row for a risk event (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = risk_events)]
pub struct NewRiskEventRow {
    pub metal_id: i32,
    pub date: NaiveDate,
    pub is_risk_event: bool,
    pub price_change_pct: f64,
    pub previous_close: f64,
    pub current_close: f64,
}
