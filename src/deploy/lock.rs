//! Pinned dependency list exported from `Cargo.lock`

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::errors::{LimsError, Result};

#[derive(Debug, Deserialize)]
struct CargoLock {
    #[serde(default)]
    package: Vec<LockedPackage>,
}

#[derive(Debug, Deserialize)]
struct LockedPackage {
    name: String,
    version: String,
    #[serde(default)]
    source: Option<String>,
}

/// `name==version` for every registry or git package, sorted
pub fn dependency_lines(lock_text: &str) -> Result<Vec<String>> {
    let lock: CargoLock = toml::from_str(lock_text)
        .map_err(|e| LimsError::serialization(format!("Invalid Cargo.lock: {}", e)))?;

    let lines: BTreeSet<String> = lock
        .package
        .into_iter()
        .filter(|p| p.source.is_some())
        .map(|p| format!("{}=={}", p.name, p.version))
        .collect();
    Ok(lines.into_iter().collect())
}

/// Write the dependency list; returns the number of entries
pub fn export_dependency_lock(lock_path: &Path, output: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(lock_path).map_err(|e| {
        LimsError::file_operation(format!("Cannot read {}: {}", lock_path.display(), e))
    })?;
    let lines = dependency_lines(&text)?;

    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(output, content)?;

    info!("Wrote {} dependencies to {}", lines.len(), output.display());
    Ok(lines.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = r#"
version = 4

[[package]]
name = "serde"
version = "1.0.228"
source = "registry+https://github.com/rust-lang/crates.io-index"

[[package]]
name = "limsmeta"
version = "0.3.0"

[[package]]
name = "arc-swap"
version = "1.7.1"
source = "registry+https://github.com/rust-lang/crates.io-index"
"#;

    #[test]
    fn lines_are_sorted_and_skip_local_crates() {
        assert_eq!(
            dependency_lines(LOCK).unwrap(),
            vec!["arc-swap==1.7.1", "serde==1.0.228"]
        );
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let lock = dir.path().join("Cargo.lock");
        let out = dir.path().join("dependencies.txt");
        std::fs::write(&lock, LOCK).unwrap();

        assert_eq!(export_dependency_lock(&lock, &out).unwrap(), 2);
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "arc-swap==1.7.1\nserde==1.0.228\n"
        );
    }
}
