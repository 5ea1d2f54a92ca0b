use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::brand::Brand;
use crate::config::StaticConfig;
use crate::data::{Database, DataStore};
use crate::pins::{PinRef, board_from_config};
use crate::reagents::ReagentService;

pub struct StartupContext {
    pub store: Arc<DataStore>,
    pub reagents: Arc<ReagentService>,
    pub brand: Brand,
    pub title: String,
}

/// Board and pin reference described by the `[pins]` section
pub fn open_database(config: &StaticConfig) -> Result<Database> {
    let board = board_from_config(&config.pins).context("Failed to create pin board")?;
    let pin = PinRef::parse(&config.pins.db_pin)
        .context("Invalid pins.db_pin")?
        .with_version(config.pins.version.clone());
    info!("Database pin: {}", pin);
    Ok(Database::new(board, pin))
}

/// Build everything the server needs before binding
///
/// A database that cannot be loaded does not stop the server; the pages
/// show the error until a refresh succeeds.
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let db = open_database(config)?;
    let ui_url = config.lims.ui_url.clone();

    let store = match DataStore::load(db, ui_url.clone()).await {
        Ok(store) => store,
        Err(e) => {
            error!("Initial data load failed: {}", e);
            DataStore::unloaded(open_database(config)?, ui_url, e.to_string())
        }
    };

    let reagents = ReagentService::new(&config.lims);
    let brand = Brand::load(&config.brand.path);

    info!("Pre-startup completed in {:?}", start_time.elapsed());
    Ok(StartupContext {
        store: Arc::new(store),
        reagents: Arc::new(reagents),
        brand,
        title: config.brand.title.clone(),
    })
}
