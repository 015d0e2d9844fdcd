//! Coverage reporting DTOs.
//!
//! Read-side summaries of how much of the store is populated, mirroring
//! the verification queries an operator runs after an ingest/compute pass.

use chrono::NaiveDate;
use serde::Serialize;

/// Store-wide row counts plus per-instrument coverage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoverageReport {
    pub price_rows: i64,
    pub macro_rows: i64,
    pub feature_rows: i64,
    pub risk_rows: i64,
    /// Risk rows whose flag is set.
    pub flagged_risk_events: i64,
    pub instruments: Vec<InstrumentCoverage>,
}

/// Date-range coverage for one instrument.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentCoverage {
    pub symbol: String,
    pub name: String,
    pub price_rows: i64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub feature_rows: i64,
    pub risk_rows: i64,
    pub flagged_risk_events: i64,
}
