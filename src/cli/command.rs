//! Command-line interface definitions.
//!
//! Defines the CLI structure for the metalstore application using `clap`:
//! subcommands for initializing the store, managing instruments, importing
//! price and macro data, computing features, labeling risk events, and
//! reporting coverage.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Metal-commodity price feature store and risk-event labeling CLI
#[derive(Parser, Debug)]
#[command(name = "metalstore")]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "metalstore.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the metalstore CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database schema and seed the instrument registry
    Init,

    /// Manage the instrument registry
    #[command(subcommand)]
    Instrument(InstrumentCommand),

    /// Import observations from CSV files
    #[command(subcommand)]
    Import(ImportCommand),

    /// Compute technical features from stored prices
    Features(FeaturesArgs),

    /// Label risk events from stored prices
    Label(LabelArgs),

    /// Show row counts and per-instrument coverage
    Stats,
}

/// Subcommands for `metalstore instrument`.
#[derive(Subcommand, Debug)]
pub enum InstrumentCommand {
    /// List registered instruments
    List,

    /// Register an instrument (no-op if the symbol exists)
    Add(AddInstrumentArgs),

    /// Delete an instrument and all of its price, feature, and risk rows
    Remove(RemoveInstrumentArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddInstrumentArgs {
    /// Unique symbol, e.g. GOLD
    pub symbol: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Data-source ticker, e.g. GC=F
    #[arg(long)]
    pub ticker: String,

    /// Market classification, e.g. precious or industrial
    #[arg(long = "market-type")]
    pub market_type: String,
}

#[derive(clap::Args, Debug)]
pub struct RemoveInstrumentArgs {
    /// Symbol of the instrument to delete
    pub symbol: String,

    /// Skip the interactive confirmation
    #[arg(long)]
    pub yes: bool,
}

/// Subcommands for `metalstore import`.
#[derive(Subcommand, Debug)]
pub enum ImportCommand {
    /// Import price observations for one instrument
    Prices(ImportPricesArgs),

    /// Import macroeconomic observations
    Macro(ImportMacroArgs),
}

#[derive(clap::Args, Debug)]
pub struct ImportPricesArgs {
    /// CSV file with date,open,high,low,close[,volume][,adjusted_close]
    pub file: PathBuf,

    /// Instrument symbol the rows belong to
    #[arg(long)]
    pub symbol: String,

    /// Data source label stored with each row
    #[arg(long, default_value = "yfinance")]
    pub source: String,
}

#[derive(clap::Args, Debug)]
pub struct ImportMacroArgs {
    /// CSV file with date and any of
    /// usd_index,vix,treasury_yield_10y,sp500_close,sp500_return
    pub file: PathBuf,

    /// Data source label stored with each row
    #[arg(long, default_value = "yfinance")]
    pub source: String,
}

#[derive(clap::Args, Debug)]
pub struct FeaturesArgs {
    /// Compute for one instrument instead of all
    #[arg(long)]
    pub symbol: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct LabelArgs {
    /// Label one instrument instead of all
    #[arg(long)]
    pub symbol: Option<String>,

    /// Override the configured risk threshold (absolute percent move)
    #[arg(long = "threshold-pct")]
    pub threshold_pct: Option<f64>,
}
