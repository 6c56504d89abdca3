//! On-disk cache of repository indexes
//!
//! Each repository's raw `index.yaml` is stored as `<cache>/<name>-index.yaml`,
//! the same layout Helm uses, so lookups after an update never hit the network.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{RepoError, Result};
use crate::index::ChartIndex;

/// Directory of cached repository indexes
#[derive(Debug, Clone)]
pub struct IndexCache {
    dir: PathBuf,
}

impl IndexCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache file for a repository
    pub fn index_path(&self, repo_name: &str) -> PathBuf {
        self.dir.join(format!("{}-index.yaml", repo_name))
    }

    /// Validate and store a freshly fetched index
    pub fn store(&self, repo_name: &str, raw: &[u8]) -> Result<ChartIndex> {
        let index = ChartIndex::from_bytes(raw)?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.index_path(repo_name);
        std::fs::write(&path, raw)?;
        debug!(repo = repo_name, path = %path.display(), "cached repository index");

        Ok(index)
    }

    /// Load a cached index
    pub fn load(&self, repo_name: &str) -> Result<ChartIndex> {
        let path = self.index_path(repo_name);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepoError::IndexNotFound {
                    name: repo_name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        ChartIndex::from_bytes(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INDEX: &str = "apiVersion: v1\nentries:\n  nginx:\n    - name: nginx\n      version: 15.0.0\n";

    #[test]
    fn test_store_and_load() {
        let dir = TempDir::new().unwrap();
        let cache = IndexCache::new(dir.path().join("repository"));

        cache.store("nginx-provider", INDEX.as_bytes()).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("repository/nginx-provider-index.yaml")).unwrap(),
            INDEX
        );

        let index = cache.load("nginx-provider").unwrap();
        assert!(index.get_version("nginx", "15.0.0").is_some());
    }

    #[test]
    fn test_missing_index() {
        let dir = TempDir::new().unwrap();
        let cache = IndexCache::new(dir.path());
        assert!(matches!(
            cache.load("nope"),
            Err(RepoError::IndexNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_index_not_cached() {
        let dir = TempDir::new().unwrap();
        let cache = IndexCache::new(dir.path());

        assert!(cache.store("broken", b"entries: [").is_err());
        assert!(!cache.index_path("broken").exists());
    }
}
