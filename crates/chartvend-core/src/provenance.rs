//! Provenance store
//!
//! A provenance record ties a vendored chart version to the exact upstream
//! release it was pulled from, and to a pristine copy of that release kept
//! under `provenance/<chart>/upstreams/`. Customization patches are always
//! computed against that pristine copy.

use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::fs::{copy_dir_recursive, remove_dir_if_exists};
use crate::layout::ChartLayout;

/// Record written to `provenance/<chart>/<version>.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceRecord {
    /// Exact upstream version that was pulled
    pub upstream_version: String,

    /// Pristine copy location, relative to `provenance/<chart>/`
    pub upstream_chart_local_path: String,

    /// Repository index entry of the upstream release, kept verbatim
    #[serde(default)]
    pub upstream_index_entry: serde_yaml::Value,
}

impl ProvenanceRecord {
    /// Create a record pointing at the standard snapshot location
    pub fn new(upstream_version: impl Into<String>, upstream_index_entry: serde_yaml::Value) -> Self {
        let upstream_version = upstream_version.into();
        Self {
            upstream_chart_local_path: ChartLayout::upstream_rel_path(&upstream_version),
            upstream_version,
            upstream_index_entry,
        }
    }

    /// Absolute location of the pristine upstream tree this record points at
    pub fn upstream_dir(&self, layout: &ChartLayout, chart: &str) -> PathBuf {
        layout
            .provenance_dir(chart)
            .join(&self.upstream_chart_local_path)
    }
}

/// Write the record for `chart`/`version`, replacing any previous one whole
pub fn save(
    layout: &ChartLayout,
    chart: &str,
    version: &str,
    record: &ProvenanceRecord,
) -> Result<PathBuf> {
    let path = layout.provenance_file(chart, version);
    let dir = layout.provenance_dir(chart);
    std::fs::create_dir_all(&dir).map_err(|e| CoreError::io(&dir, e))?;

    let content = serde_yaml::to_string(record)?;

    // Stage next to the destination so the rename stays on one filesystem
    let mut staged = tempfile::NamedTempFile::new_in(&dir).map_err(|e| CoreError::io(&dir, e))?;
    staged
        .write_all(content.as_bytes())
        .map_err(|e| CoreError::io(staged.path(), e))?;
    staged
        .persist(&path)
        .map_err(|e| CoreError::io(&path, e.error))?;

    info!(path = %path.display(), "wrote provenance record");
    Ok(path)
}

/// Read the record for `chart`/`version`
pub fn load(layout: &ChartLayout, chart: &str, version: &str) -> Result<ProvenanceRecord> {
    let path = layout.provenance_file(chart, version);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CoreError::ProvenanceNotFound { path });
        }
        Err(e) => return Err(CoreError::io(path, e)),
    };

    serde_yaml::from_str(&content).map_err(|e| CoreError::InvalidProvenance {
        path,
        message: e.to_string(),
    })
}

/// Keep a pristine copy of a freshly pulled tree
///
/// Copies `<root>/<chart>/<target_version>` to
/// `provenance/<chart>/upstreams/<upstream_version>`, replacing any earlier
/// snapshot of that upstream version. Must run before the tree is patched or
/// edited, since later diffs are taken against this copy.
pub fn snapshot_upstream(
    layout: &ChartLayout,
    chart: &str,
    upstream_version: &str,
    target_version: &str,
) -> Result<PathBuf> {
    let source = layout.chart_dir(chart, target_version);
    if !source.is_dir() {
        return Err(CoreError::ChartDirNotFound { path: source });
    }

    let snapshot = layout.upstream_dir(chart, upstream_version);
    remove_dir_if_exists(&snapshot)?;
    copy_dir_recursive(&source, &snapshot)?;

    debug!(from = %source.display(), to = %snapshot.display(), "saved upstream snapshot");
    Ok(snapshot)
}
