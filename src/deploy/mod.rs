//! Deployment helpers used by CI
//!
//! The deploy-mode flag selects the branches to force-update; each branch
//! backs one hosted instance of the app.

mod lock;
mod manifest;
mod mode;
mod publish;

use std::path::Path;

use tracing::info;

pub use lock::{dependency_lines, export_dependency_lock};
pub use manifest::{FileEntry, MANIFEST_VERSION, Manifest, ManifestMetadata, sha256_file};
pub use mode::{DeployMode, PROD_BRANCH, TEST_BRANCH};
pub use publish::{GitCommand, PublishPlan, PublishReport};

use crate::config::DeployConfig;
use crate::errors::Result;

/// Regenerate the dependency list and the manifest under `root`
pub fn prepare_bundle(root: &Path, config: &DeployConfig) -> Result<Manifest> {
    export_dependency_lock(&root.join(&config.cargo_lock), &root.join(&config.lock_output))?;

    let manifest = Manifest::build(root, config)?;
    manifest.write(&root.join(&config.manifest_path))?;
    info!(
        "Manifest written to {} ({} files, entrypoint {})",
        config.manifest_path,
        manifest.files.len(),
        manifest.metadata.entrypoint
    );
    Ok(manifest)
}
