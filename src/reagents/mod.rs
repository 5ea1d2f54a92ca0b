//! Reagent lot registration against Clarity LIMS

mod catalog;
mod lims_api;
mod queue;

use std::time::Duration;

use chrono::Local;
use moka::future::Cache;
use parking_lot::Mutex;
use tracing::{info, warn};

pub use catalog::{
    INDEX_SET_LETTERS, NamingGroup, REAGENT_TYPES, ReagentType, find_reagent_type,
    parse_set_letter,
};
pub use lims_api::{ConnectionStatus, LimsClient, lot_result};
pub use queue::{LotRequest, LotResult, PendingLot, ReagentQueue, internal_name, naming_key};

use crate::config::LimsConfig;
use crate::errors::{LimsError, Result};

/// Queue, client and cached connection status shared by the web handlers
pub struct ReagentService {
    queue: Mutex<ReagentQueue>,
    /// One submission at a time
    submit_lock: tokio::sync::Mutex<()>,
    client: LimsClient,
    status_cache: Cache<String, ConnectionStatus>,
}

impl ReagentService {
    pub fn new(config: &LimsConfig) -> Self {
        Self::with_client(
            LimsClient::from_config(config),
            ReagentQueue::new(config.sequence_numbers.clone()),
            Duration::from_secs(config.status_cache_secs),
        )
    }

    pub fn with_client(client: LimsClient, queue: ReagentQueue, status_ttl: Duration) -> Self {
        let status_cache = Cache::builder()
            .time_to_live(status_ttl)
            .max_capacity(4)
            .build();

        Self {
            queue: Mutex::new(queue),
            submit_lock: tokio::sync::Mutex::new(()),
            client,
            status_cache,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Copy of the queue for rendering
    pub fn queue(&self) -> ReagentQueue {
        self.queue.lock().clone()
    }

    pub fn preview(&self, reagent_type: &str, set_letter: Option<&str>) -> Result<String> {
        self.queue.lock().preview(reagent_type, set_letter)
    }

    pub fn add(&self, request: &LotRequest) -> Result<PendingLot> {
        let mut queue = self.queue.lock();
        let lot = queue.add(request)?.clone();
        info!("Added {} ({}) to reagent queue", lot.internal_name, lot.lot_number);
        Ok(lot)
    }

    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    /// Submit every queued lot; returns one result per lot
    ///
    /// The lots leave the queue before the first request, so a second
    /// submit or a clear cannot post them again or reuse their numbers.
    pub async fn submit(&self) -> Result<Vec<LotResult>> {
        let _guard = self.submit_lock.lock().await;

        let lots = self.queue.lock().take_pending();
        if lots.is_empty() {
            return Err(LimsError::validation("No lots to submit"));
        }

        let client = self.client.clone();
        let notes = format!("Created via limsmeta on {}", Local::now().format("%Y-%m-%d"));
        let results =
            match tokio::task::spawn_blocking(move || client.submit_all(&lots, &notes)).await {
                Ok(results) => results,
                Err(e) => {
                    self.queue.lock().restore_in_flight();
                    return Err(LimsError::lims_api(format!("Submission task failed: {}", e)));
                }
            };

        let failures = results.iter().filter(|r| !r.success).count();
        if failures == 0 {
            info!("All {} lots created successfully", results.len());
        } else {
            warn!("{} of {} lots failed to submit", failures, results.len());
        }

        self.queue.lock().apply_results(results.clone());
        Ok(results)
    }

    /// Connection check, cached for the configured time
    pub async fn connection_status(&self) -> ConnectionStatus {
        let client = self.client.clone();
        self.status_cache
            .get_with(self.client.base_url().to_string(), async move {
                tokio::task::spawn_blocking(move || client.test_connection())
                    .await
                    .unwrap_or_else(|e| ConnectionStatus {
                        connected: false,
                        message: format!("Connection check failed: {}", e),
                    })
            })
            .await
    }
}
