//! Version ledger
//!
//! Reads the versions of a chart already vendored under the charts root and
//! decides whose customizations a new version should inherit.

use semver::Version;
use tracing::debug;

use crate::error::{CoreError, Result, parse_version};
use crate::layout::ChartLayout;

/// All vendored versions of `chart`, in ascending order
///
/// Every directory directly under `<root>/<chart>` must be named after a
/// valid semantic version. A stray directory means the repository is damaged
/// and fails the whole listing.
pub fn list_versions(layout: &ChartLayout, chart: &str) -> Result<Vec<Version>> {
    let chart_root = layout.chart_root(chart);
    let entries = std::fs::read_dir(&chart_root).map_err(|e| CoreError::io(&chart_root, e))?;

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::io(&chart_root, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| CoreError::io(&path, e))?;
        if !file_type.is_dir() {
            continue;
        }

        let name = entry.file_name();
        let version = Version::parse(&name.to_string_lossy())
            .map_err(|source| CoreError::MalformedVersionDir { path, source })?;
        versions.push(version);
    }

    versions.sort();
    Ok(versions)
}

/// Pick the version whose customizations should be carried onto `target_version`
///
/// Returns the highest vendored version strictly below the target, or `None`
/// when the target is the oldest version present.
pub fn select_patch_base(
    layout: &ChartLayout,
    chart: &str,
    target_version: &str,
) -> Result<Option<Version>> {
    let target = parse_version(target_version)?;

    let base = list_versions(layout, chart)?
        .into_iter()
        .filter(|v| *v < target)
        .max();

    debug!(chart, target = %target, base = ?base.as_ref().map(|v| v.to_string()), "selected patch base");
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layout_with(versions: &[&str]) -> (TempDir, ChartLayout) {
        let dir = TempDir::new().unwrap();
        let layout = ChartLayout::new(dir.path().join("charts"));
        for v in versions {
            std::fs::create_dir_all(layout.chart_dir("keycloak", v)).unwrap();
        }
        (dir, layout)
    }

    #[test]
    fn test_selects_immediate_predecessor() {
        let (_dir, layout) = layout_with(&["1.0.0", "1.1.0", "1.2.0"]);
        let base = select_patch_base(&layout, "keycloak", "1.2.0").unwrap();
        assert_eq!(base, Some(Version::new(1, 1, 0)));
    }

    #[test]
    fn test_uses_semver_not_string_order() {
        let (_dir, layout) = layout_with(&["1.9.0", "1.10.0", "1.11.0"]);
        let base = select_patch_base(&layout, "keycloak", "1.11.0").unwrap();
        assert_eq!(base, Some(Version::new(1, 10, 0)));
    }

    #[test]
    fn test_target_need_not_exist() {
        let (_dir, layout) = layout_with(&["1.0.0", "2.0.0"]);
        let base = select_patch_base(&layout, "keycloak", "3.0.0").unwrap();
        assert_eq!(base, Some(Version::new(2, 0, 0)));
    }

    #[test]
    fn test_newer_versions_are_ignored() {
        let (_dir, layout) = layout_with(&["1.0.0", "2.0.0", "3.0.0"]);
        let base = select_patch_base(&layout, "keycloak", "2.0.0").unwrap();
        assert_eq!(base, Some(Version::new(1, 0, 0)));
    }

    #[test]
    fn test_no_predecessor() {
        let (_dir, layout) = layout_with(&["1.0.0", "2.0.0"]);
        assert_eq!(select_patch_base(&layout, "keycloak", "1.0.0").unwrap(), None);
        assert_eq!(select_patch_base(&layout, "keycloak", "0.9.0").unwrap(), None);
    }

    #[test]
    fn test_prerelease_precedence() {
        let (_dir, layout) = layout_with(&["1.0.0-alpha", "1.0.0-beta.2", "1.0.0-beta.11", "1.0.0"]);

        let base = select_patch_base(&layout, "keycloak", "1.0.0").unwrap();
        assert_eq!(base, Some(Version::parse("1.0.0-beta.11").unwrap()));

        let base = select_patch_base(&layout, "keycloak", "1.0.0-beta.11").unwrap();
        assert_eq!(base, Some(Version::parse("1.0.0-beta.2").unwrap()));
    }

    #[test]
    fn test_malformed_sibling_is_fatal() {
        let (_dir, layout) = layout_with(&["1.0.0", "latest", "1.1.0"]);
        let err = select_patch_base(&layout, "keycloak", "1.1.0").unwrap_err();
        match err {
            CoreError::MalformedVersionDir { path, .. } => {
                assert!(path.ends_with("keycloak/latest"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_files_are_not_versions() {
        let (_dir, layout) = layout_with(&["1.0.0", "1.1.0"]);
        std::fs::write(layout.chart_root("keycloak").join("README.md"), "notes").unwrap();

        let versions = list_versions(&layout, "keycloak").unwrap();
        assert_eq!(versions, vec![Version::new(1, 0, 0), Version::new(1, 1, 0)]);
    }

    #[test]
    fn test_invalid_target_version() {
        let (_dir, layout) = layout_with(&["1.0.0"]);
        let err = select_patch_base(&layout, "keycloak", "v1").unwrap_err();
        assert!(matches!(err, CoreError::InvalidVersion { .. }));
    }

    #[test]
    fn test_missing_chart_root() {
        let dir = TempDir::new().unwrap();
        let layout = ChartLayout::new(dir.path().join("charts"));
        let err = select_patch_base(&layout, "keycloak", "1.0.0").unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
