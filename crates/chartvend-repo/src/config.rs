//! Repository configuration management
//!
//! Registered repositories live in a YAML file, by default
//! `~/.config/chartvend/repositories.yaml`. Downloaded indexes are cached
//! under `~/.cache/chartvend/repository/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RepoError, Result};

/// Where the client keeps its state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Repository configuration file
    pub repository_config: PathBuf,

    /// Directory holding cached `<name>-index.yaml` files
    pub repository_cache: PathBuf,
}

impl ClientSettings {
    pub fn new(repository_config: impl Into<PathBuf>, repository_cache: impl Into<PathBuf>) -> Self {
        Self {
            repository_config: repository_config.into(),
            repository_cache: repository_cache.into(),
        }
    }

    /// Settings under the user's config and cache directories
    pub fn default_paths() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        let cache_dir = dirs::cache_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "Could not determine cache directory".to_string(),
        })?;

        Ok(Self::new(
            config_dir.join("chartvend").join("repositories.yaml"),
            cache_dir.join("chartvend").join("repository"),
        ))
    }
}

/// Repository configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Configured repositories
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

fn default_api_version() -> String {
    "chartvend.io/v1".to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            repositories: Vec::new(),
        }
    }
}

impl RepositoryConfig {
    /// Load configuration, writing an empty one first if the file is missing
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| RepoError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get a repository by name
    pub fn get(&self, name: &str) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.name == name)
    }

    /// Get a repository by URL, ignoring a trailing slash
    pub fn find_by_url(&self, url: &str) -> Option<&Repository> {
        let wanted = url.trim_end_matches('/');
        self.repositories
            .iter()
            .find(|r| r.url.trim_end_matches('/') == wanted)
    }

    /// Insert a repository, replacing any entry with the same name
    pub fn add_or_update(&mut self, repo: Repository) {
        match self.repositories.iter_mut().find(|r| r.name == repo.name) {
            Some(existing) => *existing = repo,
            None => self.repositories.push(repo),
        }
    }
}

/// Repository definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Unique name for this repository
    pub name: String,

    /// Repository URL (HTTP(S) or local directory)
    pub url: String,

    /// Repository type (auto-detected if not specified)
    #[serde(default)]
    pub repo_type: RepositoryType,

    /// Last successful index refresh
    #[serde(default)]
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

impl Repository {
    /// Create a new repository from URL
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let url = url.into();
        let repo_type = RepositoryType::detect(&url)?;

        Ok(Self {
            name,
            url,
            repo_type,
            last_updated: None,
        })
    }

    /// Name under which a chart's upstream repository is registered
    pub fn provider_name(chart: &str) -> String {
        format!("{}-provider", chart)
    }

    /// Get the index URL (or path, for local repositories)
    pub fn index_url(&self) -> String {
        format!("{}/index.yaml", self.url.trim_end_matches('/'))
    }

    /// Resolve an archive location from the index against this repository
    pub fn resolve(&self, location: &str) -> String {
        if location.contains("://") {
            return location.to_string();
        }
        let base = format!("{}/", self.url.trim_end_matches('/'));
        match self.repo_type {
            RepositoryType::Http => url::Url::parse(&base)
                .and_then(|b| b.join(location))
                .map(|u| u.to_string())
                .unwrap_or_else(|_| format!("{}{}", base, location)),
            RepositoryType::File if location.starts_with('/') => location.to_string(),
            RepositoryType::File => format!("{}{}", base, location),
        }
    }
}

/// Repository type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    /// Helm HTTP repository with index.yaml
    #[default]
    Http,

    /// Local directory laid out like an HTTP repository
    File,
}

impl RepositoryType {
    /// Auto-detect repository type from URL
    pub fn detect(url: &str) -> Result<Self> {
        if url.starts_with("file://") || url.starts_with('/') {
            Ok(RepositoryType::File)
        } else if url.starts_with("http://") || url.starts_with("https://") {
            Ok(RepositoryType::Http)
        } else {
            Err(RepoError::InvalidRepositoryUrl {
                url: url.to_string(),
                reason: "URL must start with http://, https://, file://, or /".to_string(),
            })
        }
    }
}
