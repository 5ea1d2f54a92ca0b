//! `manifest.json` describing the deployed bundle

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::DeployConfig;
use crate::errors::{LimsError, Result};

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub metadata: ManifestMetadata,
    pub files: BTreeMap<String, FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub appmode: String,
    pub entrypoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub checksum: String,
}

/// SHA-256 of a file as lowercase hex
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

impl Manifest {
    /// Checksum every configured file under `root`
    pub fn build(root: &Path, config: &DeployConfig) -> Result<Self> {
        let mut files = BTreeMap::new();
        for rel in &config.files {
            let path = root.join(rel);
            if !path.is_file() {
                return Err(LimsError::file_operation(format!(
                    "Manifest file not found: {}",
                    path.display()
                )));
            }
            files.insert(
                rel.replace('\\', "/"),
                FileEntry {
                    checksum: sha256_file(&path)?,
                },
            );
        }

        Ok(Self {
            version: MANIFEST_VERSION,
            metadata: ManifestMetadata {
                appmode: config.appmode.clone(),
                entrypoint: config.entrypoint.clone(),
            },
            files,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut json = self.to_json()?;
        json.push('\n');
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_sha256_hex() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"abc").unwrap();
        assert_eq!(
            sha256_file(&file).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
