use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, trace};

use super::{PinBoard, PinCache, PinMeta, PinRef};
use crate::errors::{LimsError, Result};

/// Board stored in a local directory
///
/// `{root}/{pin name}/{version}/data.txt` plus the pin files. Version
/// directories sort lexicographically, so timestamp-prefixed names give
/// the newest version last.
pub struct FolderBoard {
    root: PathBuf,
    cache: PinCache,
}

impl FolderBoard {
    pub fn new(root: impl Into<PathBuf>, cache: PinCache) -> Self {
        Self {
            root: root.into(),
            cache,
        }
    }

    fn pin_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    async fn resolve_version(&self, pin: &PinRef) -> Result<String> {
        if let Some(version) = &pin.version {
            return Ok(version.clone());
        }
        self.pin_versions(&pin.name)
            .await?
            .pop()
            .ok_or_else(|| LimsError::pin_not_found(format!("Pin '{}' has no versions", pin.name)))
    }
}

#[async_trait]
impl PinBoard for FolderBoard {
    async fn pin_versions(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.pin_dir(name);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LimsError::pin_not_found(format!(
                    "Pin '{}' not found in {}",
                    name,
                    self.root.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir()
                && let Some(name) = entry.file_name().to_str()
            {
                versions.push(name.to_string());
            }
        }
        versions.sort();
        trace!("Folder pin {} versions: {:?}", name, versions);
        Ok(versions)
    }

    async fn pin_meta(&self, pin: &PinRef) -> Result<PinMeta> {
        let version = self.resolve_version(pin).await?;
        let path = self.pin_dir(&pin.name).join(&version).join("data.txt");

        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LimsError::pin_not_found(format!("Pin version '{}@{}' not found", pin.name, version))
            } else {
                LimsError::file_operation(format!("Failed to read {}: {}", path.display(), e))
            }
        })?;

        let mut meta = PinMeta::from_yaml(&text)?;
        meta.version = version;
        Ok(meta)
    }

    async fn pin_download(&self, pin: &PinRef) -> Result<PathBuf> {
        let meta = self.pin_meta(pin).await?;
        let source_dir = self.pin_dir(&pin.name).join(&meta.version);

        let mut paths = Vec::new();
        for (index, file) in meta.files().iter().enumerate() {
            let target = self.cache.path_for(&pin.name, &meta.version, file);
            if !self.cache.is_fresh(&target, meta.file_size_at(index)) {
                copy_into_cache(&self.cache, &source_dir.join(file), &target).await?;
            }
            paths.push(target);
        }

        paths.into_iter().next().ok_or_else(|| {
            LimsError::pin_board(format!("Pin '{}' lists no files", pin.name))
        })
    }

    fn board_name(&self) -> &'static str {
        "folder"
    }
}

async fn copy_into_cache(cache: &PinCache, source: &Path, target: &Path) -> Result<()> {
    cache.prepare(target).await?;
    debug!("Copying {} -> {}", source.display(), target.display());
    tokio::fs::copy(source, target).await.map_err(|e| {
        LimsError::file_operation(format!("Failed to copy {}: {}", source.display(), e))
    })?;
    Ok(())
}
