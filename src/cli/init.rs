//! `metalstore init` - create the schema and seed the registry.

use serde_json::json;

use super::{open_store, output};
use crate::config::Config;
use crate::error::Result;
use crate::service::seed;

pub async fn run(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let instruments = seed::seed_instruments(&store).await?;

    output::json_payload(
        "init",
        json!({
            "database": config.database.url,
            "instruments": instruments.iter().map(|i| i.symbol.clone()).collect::<Vec<_>>(),
        }),
    );
    output::success(format!("database ready at {}", config.database.url));
    output::success(format!(
        "registry seeded with {} instruments",
        instruments.len()
    ));
    Ok(())
}
