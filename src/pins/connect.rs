//! Hosted pin board speaking the Posit Connect content API

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, trace};
use ureq::Agent;

use super::{PinBoard, PinCache, PinMeta, PinRef};
use crate::errors::{LimsError, Result};

#[derive(Debug, Clone, Deserialize)]
struct ContentItem {
    guid: String,
    name: String,
    content_url: String,
    #[serde(default)]
    bundle_id: Option<String>,
    #[serde(default)]
    owner: Option<ContentOwner>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentOwner {
    username: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Bundle {
    id: String,
}

/// Blocking HTTP side of the board; cloned into `spawn_blocking` closures
#[derive(Clone)]
struct ConnectClient {
    server_url: String,
    api_key: String,
    agent: Agent,
}

impl ConnectClient {
    fn get(&self, url: &str) -> Result<ureq::http::Response<ureq::Body>> {
        trace!("GET {}", url);
        self.agent
            .get(url)
            .header("Authorization", format!("Key {}", self.api_key))
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(404) => {
                    LimsError::pin_not_found(format!("Not found on pin board: {}", url))
                }
                other => LimsError::pin_board(format!("Request to {} failed: {}", url, other)),
            })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get(url)?
            .into_body()
            .read_json()
            .map_err(|e| LimsError::pin_board(format!("Invalid JSON from {}: {}", url, e)))
    }

    fn find_content(&self, pin: &PinRef) -> Result<ContentItem> {
        let (owner, name) = pin.owner_and_name();
        let url = format!(
            "{}/__api__/v1/content?name={}&include=owner",
            self.server_url,
            urlencoding::encode(name)
        );
        let items: Vec<ContentItem> = self.get_json(&url)?;

        items
            .into_iter()
            .filter(|item| item.name == name)
            .find(|item| match owner {
                Some(owner) => item.owner.as_ref().is_some_and(|o| o.username == owner),
                None => true,
            })
            .ok_or_else(|| LimsError::pin_not_found(format!("Pin '{}' not found", pin.name)))
    }

    fn versions(&self, pin: &PinRef) -> Result<Vec<String>> {
        let content = self.find_content(pin)?;
        let url = format!(
            "{}/__api__/v1/content/{}/bundles",
            self.server_url, content.guid
        );
        let bundles: Vec<Bundle> = self.get_json(&url)?;
        Ok(bundles.into_iter().map(|b| b.id).collect())
    }

    /// Resolve the content item and the bundle that holds the requested version
    fn locate(&self, pin: &PinRef) -> Result<(ContentItem, String)> {
        let content = self.find_content(pin)?;
        let bundle = match &pin.version {
            Some(version) => version.clone(),
            None => content.bundle_id.clone().ok_or_else(|| {
                LimsError::pin_not_found(format!("Pin '{}' has no active bundle", pin.name))
            })?,
        };
        Ok((content, bundle))
    }

    fn bundle_url(content: &ContentItem, bundle: &str, file: &str) -> String {
        format!(
            "{}/_rev{}/{}",
            content.content_url.trim_end_matches('/'),
            bundle,
            file
        )
    }

    fn meta(&self, pin: &PinRef) -> Result<PinMeta> {
        let (content, bundle) = self.locate(pin)?;
        let url = Self::bundle_url(&content, &bundle, "data.txt");
        let text = self
            .get(&url)?
            .into_body()
            .read_to_string()
            .map_err(|e| LimsError::pin_board(format!("Failed to read {}: {}", url, e)))?;

        let mut meta = PinMeta::from_yaml(&text)?;
        meta.version = bundle;
        Ok(meta)
    }

    fn download(&self, pin: &PinRef, cache: &PinCache) -> Result<PathBuf> {
        let (content, bundle) = self.locate(pin)?;
        let meta_url = Self::bundle_url(&content, &bundle, "data.txt");
        let text = self
            .get(&meta_url)?
            .into_body()
            .read_to_string()
            .map_err(|e| LimsError::pin_board(format!("Failed to read {}: {}", meta_url, e)))?;
        let meta = PinMeta::from_yaml(&text)?;

        let mut paths = Vec::new();
        for (index, file) in meta.files().iter().enumerate() {
            let target = cache.path_for(&pin.name, &bundle, file);
            if cache.is_fresh(&target, meta.file_size_at(index)) {
                debug!("Using cached pin file {}", target.display());
            } else {
                let url = Self::bundle_url(&content, &bundle, file);
                self.fetch_to(&url, &target)?;
            }
            paths.push(target);
        }

        paths
            .into_iter()
            .next()
            .ok_or_else(|| LimsError::pin_board(format!("Pin '{}' lists no files", pin.name)))
    }

    fn fetch_to(&self, url: &str, target: &Path) -> Result<()> {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let partial = target.with_extension("part");

        info!("Downloading {} -> {}", url, target.display());
        let response = self.get(url)?;
        let mut reader = response.into_body().into_reader();
        let mut file = std::fs::File::create(&partial)?;
        let written = std::io::copy(&mut reader, &mut file)?;
        drop(file);
        std::fs::rename(&partial, target)?;

        debug!("Downloaded {} bytes", written);
        Ok(())
    }
}

/// Posit Connect pin board
///
/// Authenticates with `Authorization: Key <api key>`. A pin version is a
/// bundle id; pin files live under `{content_url}_rev{bundle}/`.
pub struct ConnectBoard {
    client: ConnectClient,
    cache: PinCache,
}

impl ConnectBoard {
    pub fn new(server_url: &str, api_key: &str, cache: PinCache, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            client: ConnectClient {
                server_url: server_url.trim_end_matches('/').to_string(),
                api_key: api_key.to_string(),
                agent,
            },
            cache,
        }
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(ConnectClient) -> Result<T> + Send + 'static,
    {
        let client = self.client.clone();
        tokio::task::spawn_blocking(move || f(client))
            .await
            .map_err(|e| LimsError::pin_board(format!("Pin board task failed: {}", e)))?
    }
}

#[async_trait]
impl PinBoard for ConnectBoard {
    async fn pin_versions(&self, name: &str) -> Result<Vec<String>> {
        let pin = PinRef::parse(name)?;
        self.blocking(move |client| client.versions(&pin)).await
    }

    async fn pin_meta(&self, pin: &PinRef) -> Result<PinMeta> {
        let pin = pin.clone();
        self.blocking(move |client| client.meta(&pin)).await
    }

    async fn pin_download(&self, pin: &PinRef) -> Result<PathBuf> {
        let pin = pin.clone();
        let cache = self.cache.clone();
        self.blocking(move |client| client.download(&pin, &cache))
            .await
    }

    fn board_name(&self) -> &'static str {
        "connect"
    }
}
