//! Local download cache for pin files
//!
//! Layout: `{root}/{sanitized pin name}/{version}/{file}`

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct PinCache {
    root: PathBuf,
}

impl PinCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache location of one file of a pin version
    pub fn path_for(&self, pin_name: &str, version: &str, file: &str) -> PathBuf {
        self.root
            .join(sanitize_segment(&pin_name.replace('/', "__")))
            .join(sanitize_segment(version))
            .join(sanitize_segment(file))
    }

    /// A cached file is reused when it exists and matches the recorded size
    pub fn is_fresh(&self, path: &Path, expected_size: Option<u64>) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => {
                let fresh = expected_size.is_none_or(|size| size == meta.len());
                trace!("Cache check {}: fresh={}", path.display(), fresh);
                fresh
            }
            _ => false,
        }
    }

    /// Make sure the parent directory of `path` exists
    pub async fn prepare(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

fn sanitize_segment(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_paths_stay_inside_root() {
        let cache = PinCache::new("/tmp/pins");
        let path = cache.path_for("vi2172/clarity_lims_sqlite", "..", "../../passwd");
        assert!(path.starts_with("/tmp/pins"));
        assert_eq!(
            path,
            PathBuf::from("/tmp/pins/vi2172__clarity_lims_sqlite/_/.._.._passwd")
        );
    }

    #[test]
    fn freshness_uses_size() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("db.sqlite");
        std::fs::write(&file, b"12345").unwrap();

        let cache = PinCache::new(dir.path());
        assert!(cache.is_fresh(&file, Some(5)));
        assert!(cache.is_fresh(&file, None));
        assert!(!cache.is_fresh(&file, Some(6)));
        assert!(!cache.is_fresh(&dir.path().join("missing"), None));
    }
}
