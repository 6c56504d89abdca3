//! Chart client used by the pull pipeline
//!
//! Registers a chart's upstream repository, keeps its index cached, and
//! downloads release archives from HTTP or local repositories.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::archive::{compute_digest, digest_matches, extract_archive};
use crate::cache::IndexCache;
use crate::config::{ClientSettings, Repository, RepositoryConfig};
use crate::error::{RepoError, Result};
use crate::http::HttpClient;
use crate::index::ChartVersionEntry;

/// Operations the pull pipeline needs from a chart repository
#[async_trait]
pub trait ChartClient: Send + Sync {
    /// Register the repository serving `chart` and refresh its index
    ///
    /// A repository already registered under the same URL is reused,
    /// otherwise it is registered as `<chart>-provider`.
    async fn add_and_update_repo(&self, chart: &str, url: &str) -> Result<Repository>;

    /// Download one release and unpack it into `dest`, replacing its contents
    async fn download_archive(
        &self,
        chart: &str,
        repo: &Repository,
        version: &str,
        dest: &Path,
    ) -> Result<()>;

    /// Index entry for one release, from the cached index
    async fn fetch_upstream_metadata(
        &self,
        chart: &str,
        repo: &Repository,
        version: &str,
    ) -> Result<ChartVersionEntry>;
}

/// [`ChartClient`] for Helm repositories served over HTTP(S) or from disk
pub struct HelmRepoClient {
    settings: ClientSettings,
    cache: IndexCache,
    http: HttpClient,
}

impl HelmRepoClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let cache = IndexCache::new(&settings.repository_cache);
        Ok(Self {
            settings,
            cache,
            http: HttpClient::new()?,
        })
    }

    /// Fetch a location already resolved against its repository
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        if location.starts_with("http://") || location.starts_with("https://") {
            return self.http.get_bytes(location).await;
        }

        let path = if location.starts_with("file://") {
            url::Url::parse(location)?
                .to_file_path()
                .map_err(|_| RepoError::InvalidRepositoryUrl {
                    url: location.to_string(),
                    reason: "not a local file URL".to_string(),
                })?
        } else {
            PathBuf::from(location)
        };

        debug!(path = %path.display(), "reading from local repository");
        Ok(tokio::fs::read(&path).await?)
    }

    fn lookup(&self, chart: &str, repo: &Repository, version: &str) -> Result<ChartVersionEntry> {
        let index = self.cache.load(&repo.name)?;
        index.require(chart, version, &repo.name).cloned()
    }
}

#[async_trait]
impl ChartClient for HelmRepoClient {
    async fn add_and_update_repo(&self, chart: &str, url: &str) -> Result<Repository> {
        let config_path = &self.settings.repository_config;
        let mut config = RepositoryConfig::load_or_init(config_path)?;

        let mut repo = match config.find_by_url(url) {
            Some(existing) => {
                debug!(name = %existing.name, url, "reusing registered repository");
                existing.clone()
            }
            None => Repository::new(Repository::provider_name(chart), url)?,
        };

        let raw = self.fetch(&repo.index_url()).await?;
        self.cache.store(&repo.name, &raw)?;

        repo.last_updated = Some(chrono::Utc::now());
        config.add_or_update(repo.clone());
        config.save_to(config_path)?;

        info!(name = %repo.name, url = %repo.url, "repository updated");
        Ok(repo)
    }

    async fn download_archive(
        &self,
        chart: &str,
        repo: &Repository,
        version: &str,
        dest: &Path,
    ) -> Result<()> {
        let entry = self.lookup(chart, repo, version)?;
        let location = entry
            .download_url()
            .ok_or_else(|| RepoError::NoDownloadUrl {
                name: chart.to_string(),
                version: version.to_string(),
            })?;

        let data = self.fetch(&repo.resolve(location)).await?;

        if let Some(expected) = &entry.digest {
            let actual = compute_digest(&data);
            if !digest_matches(expected, &actual) {
                return Err(RepoError::IntegrityCheckFailed {
                    name: format!("{}-{}", chart, version),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        if dest.exists() {
            tokio::fs::remove_dir_all(dest).await?;
        }
        let unpack_to = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extract_archive(&data, &unpack_to))
            .await
            .map_err(|e| RepoError::Extract {
                path: dest.display().to_string(),
                message: e.to_string(),
            })??;

        info!(chart, version, dest = %dest.display(), "chart unpacked");
        Ok(())
    }

    async fn fetch_upstream_metadata(
        &self,
        chart: &str,
        repo: &Repository,
        version: &str,
    ) -> Result<ChartVersionEntry> {
        self.lookup(chart, repo, version)
    }
}
