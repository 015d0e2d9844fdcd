//! CLI module graph.

pub mod command;
pub mod features;
pub mod import;
pub mod init;
pub mod instrument;
pub mod label;
pub mod output;
pub mod stats;

use std::path::Path;

use crate::config::Config;
use crate::db;
use crate::domain::Instrument;
use crate::error::{Error, Result};
use crate::store::{InstrumentRegistry, SqliteStore};

use command::{Cli, Commands};

/// Route a parsed command line to its handler.
pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Init => init::run(&config).await,
        Commands::Instrument(command) => instrument::run(command, &config).await,
        Commands::Import(command) => import::run(command, &config).await,
        Commands::Features(args) => features::run(args, &config).await,
        Commands::Label(args) => label::run(args, &config).await,
        Commands::Stats => stats::run(&config).await,
    }
}

/// Open the configured database, applying any pending migrations.
pub(crate) fn open_store(config: &Config) -> Result<SqliteStore> {
    let url = &config.database.url;
    if url != ":memory:" {
        if let Some(parent) = Path::new(url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    let pool = db::create_pool(url)?;
    db::run_migrations(&pool)?;
    Ok(SqliteStore::new(pool))
}

/// One instrument when a symbol was given, otherwise all of them.
pub(crate) async fn resolve_instruments(
    store: &SqliteStore,
    symbol: Option<&str>,
) -> Result<Vec<Instrument>> {
    match symbol {
        Some(symbol) => {
            let instrument = store.lookup(symbol).await?.ok_or_else(|| Error::NotFound {
                entity: "instrument",
                key: symbol.to_string(),
            })?;
            Ok(vec![instrument])
        }
        None => store.list().await,
    }
}
