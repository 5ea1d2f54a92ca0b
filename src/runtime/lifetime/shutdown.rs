use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::data::DataStore;

/// Seconds to wait for the database to close
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// Wait for Ctrl+C, then close the database pool
pub async fn listen_for_shutdown(store: &DataStore) {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }

    match timeout(
        Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
        store.database().refresh(),
    )
    .await
    {
        Ok(()) => info!("Database connection closed"),
        Err(_) => error!(
            "Closing the database timed out after {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
