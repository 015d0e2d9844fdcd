//! Metalstore - a metal-commodity price feature store.
//!
//! This crate stores OHLCV prices and macroeconomic indicators in SQLite,
//! derives technical-indicator feature rows from price history, and labels
//! days whose move exceeds a configured threshold as risk events.
//!
//! # Architecture
//!
//! - [`domain`] - Validated value types and the rolling-window indicator
//!   math (`domain::indicator`)
//! - [`store`] - Persistence ports plus the SQLite and in-memory
//!   implementations; duplicate keys resolve first-wins everywhere
//! - [`service`] - The feature engine, risk labeler,
//!   instrument-partitioned backfill, CSV ingest, and registry seeding
//! - [`db`] - Diesel schema, row models, pooling, embedded migrations
//! - [`config`] - TOML configuration with `DATABASE_URL` override
//! - [`error`] - Error types for the crate
//! - [`cli`] - The `metalstore` command tree
//!
//! # Example
//!
//! ```no_run
//! use metalstore::service::{features, labeling};
//! use metalstore::store::{DateRange, MemoryStore, PriceStore};
//!
//! # async fn demo(bars: Vec<metalstore::domain::PriceObservation>) -> metalstore::error::Result<()> {
//! let store = MemoryStore::new();
//! store.record_prices(&bars).await?;
//! let series = store.price_series(bars[0].metal_id, DateRange::unbounded()).await?;
//! let rows = features::compute(&series)?;
//! let events = labeling::label(&series, 3.0)?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;
