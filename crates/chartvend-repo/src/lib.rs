//! Helm chart repository client for chartvend
//!
//! This crate talks to the upstream repositories charts are vendored from:
//!
//! - **HTTP repositories**: Helm-style repos serving `index.yaml`
//! - **Local file repositories**: a directory with the same layout, for
//!   mirrors and testing
//!
//! Registered repositories are kept in a YAML configuration file and every
//! refreshed index is cached on disk, so release metadata can be read back
//! without another network round trip.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chartvend_repo::{ChartClient, ClientSettings, HelmRepoClient};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HelmRepoClient::new(ClientSettings::default_paths()?)?;
//!
//! let repo = client
//!     .add_and_update_repo("keycloak", "https://codecentric.github.io/helm-charts")
//!     .await?;
//! client
//!     .download_archive("keycloak", &repo, "18.4.0", Path::new("charts/keycloak/18.4.0"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod index;

pub use archive::{compute_digest, digest_matches, extract_archive};
pub use backend::{ChartClient, HelmRepoClient};
pub use cache::IndexCache;
pub use config::{ClientSettings, Repository, RepositoryConfig, RepositoryType};
pub use error::{RepoError, Result};
pub use http::HttpClient;
pub use index::{ChartIndex, ChartVersionEntry, Maintainer};
