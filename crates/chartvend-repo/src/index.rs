//! Repository index types
//!
//! Helm `index.yaml` format. Entries keep every field they were published
//! with, so an entry can be written back out as release metadata.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{RepoError, Result};

/// Repository index (Helm `index.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartIndex {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// When this index was generated, as published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,

    /// Chart versions indexed by chart name
    #[serde(default)]
    pub entries: HashMap<String, Vec<ChartVersionEntry>>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

impl Default for ChartIndex {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            generated: None,
            entries: HashMap::new(),
        }
    }
}

impl ChartIndex {
    /// Parse index from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| RepoError::IndexParseError {
            message: e.to_string(),
        })
    }

    /// Parse index from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let yaml = std::str::from_utf8(bytes).map_err(|e| RepoError::IndexParseError {
            message: format!("Invalid UTF-8: {}", e),
        })?;
        Self::from_yaml(yaml)
    }

    /// Get all published versions of a chart
    pub fn get(&self, name: &str) -> Option<&Vec<ChartVersionEntry>> {
        self.entries.get(name)
    }

    /// Get a specific version of a chart
    ///
    /// An exact string match wins. Otherwise versions are compared as semver,
    /// so `v1.2.3` in the index matches a request for `1.2.3`.
    pub fn get_version(&self, name: &str, version: &str) -> Option<&ChartVersionEntry> {
        let versions = self.entries.get(name)?;
        if let Some(entry) = versions.iter().find(|e| e.version == version) {
            return Some(entry);
        }

        let wanted = Version::parse(version.trim_start_matches('v')).ok()?;
        versions
            .iter()
            .find(|e| e.parsed_version().as_ref() == Some(&wanted))
    }

    /// Look up a chart version, reporting which part was missing
    pub fn require(&self, name: &str, version: &str, repo: &str) -> Result<&ChartVersionEntry> {
        if !self.entries.contains_key(name) {
            return Err(RepoError::ChartNotFound {
                name: name.to_string(),
                repo: repo.to_string(),
            });
        }
        self.get_version(name, version)
            .ok_or_else(|| RepoError::VersionNotFound {
                name: name.to_string(),
                version: version.to_string(),
                repo: repo.to_string(),
            })
    }
}

/// One published chart version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartVersionEntry {
    /// Chart name
    pub name: String,

    /// Chart version
    pub version: String,

    /// Application version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Maintainers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<Maintainer>,

    /// URLs to download the chart archive
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,

    /// SHA256 digest of the archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Creation timestamp, as published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,

    /// Chart API version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Every other field of the entry
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ChartVersionEntry {
    /// Get the primary download URL
    pub fn download_url(&self) -> Option<&str> {
        self.urls.first().map(|s| s.as_str())
    }

    /// Parse version as semver
    pub fn parsed_version(&self) -> Option<Version> {
        Version::parse(self.version.trim_start_matches('v')).ok()
    }

    /// The entry as an untyped YAML document
    pub fn to_yaml_value(&self) -> Result<serde_yaml::Value> {
        Ok(serde_yaml::to_value(self)?)
    }
}

/// Maintainer in index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
