//! Idempotent installation of the default instrument list.

use tracing::info;

use crate::domain::{Instrument, InstrumentSpec, DEFAULT_INSTRUMENTS};
use crate::error::Result;
use crate::store::InstrumentRegistry;

/// Register the seed instruments and return them with their registry ids.
/// Running this any number of times leaves exactly the seed rows.
pub async fn seed_instruments<R: InstrumentRegistry>(registry: &R) -> Result<Vec<Instrument>> {
    let mut seeded = Vec::with_capacity(DEFAULT_INSTRUMENTS.len());
    for (symbol, name, ticker, market_type) in DEFAULT_INSTRUMENTS {
        let spec = InstrumentSpec::try_new(symbol, name, ticker, market_type)?;
        seeded.push(registry.register(&spec).await?);
    }
    info!(count = seeded.len(), "seed instruments registered");
    Ok(seeded)
}
