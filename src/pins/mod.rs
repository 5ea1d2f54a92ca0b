//! Pin board access
//!
//! A pin is a named, versioned artifact stored on a board. The database
//! the app displays is published as a pin by the LIMS instrument server;
//! this module resolves versions, reads `data.txt` metadata and downloads
//! pin files into a local cache.

mod cache;
mod connect;
mod folder;
mod meta;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

pub use cache::PinCache;
pub use connect::ConnectBoard;
pub use folder::FolderBoard;
pub use meta::{OneOrMany, PIN_CREATED_FORMAT, PinMeta, PinRef, parse_pin_timestamp};

use crate::config::{BoardKind, PinsConfig};
use crate::errors::{LimsError, Result};

#[async_trait]
pub trait PinBoard: Send + Sync {
    /// Versions of a pin, oldest first
    async fn pin_versions(&self, name: &str) -> Result<Vec<String>>;

    /// Metadata of the pinned version, or of the latest one
    async fn pin_meta(&self, pin: &PinRef) -> Result<PinMeta>;

    /// Download every file of the pin and return the path of the first
    async fn pin_download(&self, pin: &PinRef) -> Result<PathBuf>;

    fn board_name(&self) -> &'static str;
}

/// Build the board described by the `[pins]` section
pub fn board_from_config(config: &PinsConfig) -> Result<Arc<dyn PinBoard>> {
    let cache = PinCache::new(&config.cache_dir);

    let board: Arc<dyn PinBoard> = match config.board {
        BoardKind::Connect => {
            let server_url = config
                .server_url
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| {
                    LimsError::config(
                        "Pin board server URL is not set (POSIT_SERVER_URL or pins.server_url)",
                    )
                })?;
            let api_key = config
                .api_key
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| {
                    LimsError::config("Pin board API key is not set (POSIT_API_KEY or pins.api_key)")
                })?;

            Arc::new(ConnectBoard::new(
                server_url,
                api_key,
                cache,
                Duration::from_secs(config.timeout_secs),
            ))
        }
        BoardKind::Folder => Arc::new(FolderBoard::new(&config.folder, cache)),
    };

    info!("Using {} pin board", board.board_name());
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_board_requires_credentials() {
        let config = PinsConfig {
            server_url: Some("https://connect.example.org".to_string()),
            api_key: None,
            ..PinsConfig::default()
        };
        let err = board_from_config(&config).err().unwrap();
        assert!(matches!(err, LimsError::Config(_)));
        assert!(err.message().contains("POSIT_API_KEY"));
    }

    #[test]
    fn folder_board_needs_no_credentials() {
        let config = PinsConfig {
            board: BoardKind::Folder,
            ..PinsConfig::default()
        };
        let board = board_from_config(&config).unwrap();
        assert_eq!(board.board_name(), "folder");
    }
}
