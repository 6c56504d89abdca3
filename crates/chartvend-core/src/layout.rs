//! On-disk layout of a vendored chart repository
//!
//! Every location is derived from the charts root, the chart name and a
//! version, so independent invocations agree on where things live:
//!
//! ```text
//! <workspace>/
//! ├── charts/                          <- charts root
//! │   └── <chart>/<version>/           <- vendored (customized) tree
//! ├── provenance/<chart>/
//! │   ├── <version>.yaml               <- provenance record
//! │   └── upstreams/<upstream>/        <- pristine upstream snapshot
//! ├── <chart>_patch_<version>.patch
//! ├── <chart>_patch_<version>_out
//! └── <chart>_patch_<version>_rejects
//! ```

use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Directory holding provenance records, next to the charts root
pub const PROVENANCE_DIR: &str = "provenance";

/// Directory under `provenance/<chart>/` holding pristine upstream snapshots
pub const UPSTREAMS_DIR: &str = "upstreams";

/// Path resolver for a charts root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLayout {
    root: PathBuf,
}

impl ChartLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The charts root as configured
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parent of the charts root, where provenance and patch artifacts live
    pub fn workspace(&self) -> PathBuf {
        self.root.join("..")
    }

    /// `<root>/<chart>`, holding one directory per vendored version
    pub fn chart_root(&self, chart: &str) -> PathBuf {
        self.root.join(chart)
    }

    /// `<root>/<chart>/<version>`
    pub fn chart_dir(&self, chart: &str, version: &str) -> PathBuf {
        self.chart_root(chart).join(version)
    }

    /// `<root>/../provenance/<chart>`
    pub fn provenance_dir(&self, chart: &str) -> PathBuf {
        self.workspace().join(PROVENANCE_DIR).join(chart)
    }

    /// `<root>/../provenance/<chart>/<version>.yaml`
    pub fn provenance_file(&self, chart: &str, version: &str) -> PathBuf {
        self.provenance_dir(chart).join(format!("{}.yaml", version))
    }

    /// Location of a pristine snapshot relative to `provenance_dir`
    pub fn upstream_rel_path(upstream_version: &str) -> String {
        format!("{}/{}", UPSTREAMS_DIR, upstream_version)
    }

    /// `<root>/../provenance/<chart>/upstreams/<upstream_version>`
    pub fn upstream_dir(&self, chart: &str, upstream_version: &str) -> PathBuf {
        self.provenance_dir(chart)
            .join(UPSTREAMS_DIR)
            .join(upstream_version)
    }

    /// `<root>/../<chart>_patch_<version>.patch`
    pub fn patch_file(&self, chart: &str, version: &str) -> PathBuf {
        self.workspace()
            .join(format!("{}_patch_{}.patch", chart, version))
    }

    /// `<root>/../<chart>_patch_<version>_out`
    pub fn output_file(&self, chart: &str, version: &str) -> PathBuf {
        self.workspace().join(format!("{}_patch_{}_out", chart, version))
    }

    /// `<root>/../<chart>_patch_<version>_rejects`
    pub fn rejects_file(&self, chart: &str, version: &str) -> PathBuf {
        self.workspace()
            .join(format!("{}_patch_{}_rejects", chart, version))
    }

    /// Resolve the charts root to its physical location
    ///
    /// Returns the workspace directory and the root's own name within it. Both
    /// trees handed to `diff` are expressed relative to that workspace, which
    /// keeps patch headers independent of where the repository is checked out.
    pub fn resolve(&self) -> Result<(PathBuf, String)> {
        let canonical = std::fs::canonicalize(&self.root)
            .map_err(|e| CoreError::io(&self.root, e))?;

        let workspace = canonical.parent().map(Path::to_path_buf);
        let name = canonical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());

        match (workspace, name) {
            (Some(workspace), Some(name)) => Ok((workspace, name)),
            _ => Err(CoreError::InvalidInput {
                message: format!(
                    "charts root {} must not be the filesystem root",
                    canonical.display()
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths() {
        let layout = ChartLayout::new("/repo/charts");

        assert_eq!(
            layout.chart_dir("keycloak", "2.1.0"),
            PathBuf::from("/repo/charts/keycloak/2.1.0")
        );
        assert_eq!(
            layout.provenance_file("keycloak", "2.1.0"),
            PathBuf::from("/repo/charts/../provenance/keycloak/2.1.0.yaml")
        );
        assert_eq!(
            layout.upstream_dir("keycloak", "2.0.0"),
            PathBuf::from("/repo/charts/../provenance/keycloak/upstreams/2.0.0")
        );
        assert_eq!(
            layout.patch_file("keycloak", "2.0.0"),
            PathBuf::from("/repo/charts/../keycloak_patch_2.0.0.patch")
        );
        assert_eq!(
            layout.output_file("keycloak", "2.1.0"),
            PathBuf::from("/repo/charts/../keycloak_patch_2.1.0_out")
        );
        assert_eq!(
            layout.rejects_file("keycloak", "2.1.0"),
            PathBuf::from("/repo/charts/../keycloak_patch_2.1.0_rejects")
        );
    }

    #[test]
    fn test_upstream_rel_path() {
        assert_eq!(ChartLayout::upstream_rel_path("1.2.3"), "upstreams/1.2.3");
    }

    #[test]
    fn test_resolve_missing_root() {
        let layout = ChartLayout::new("/definitely/not/here/charts");
        assert!(matches!(layout.resolve(), Err(CoreError::Io { .. })));
    }
}
