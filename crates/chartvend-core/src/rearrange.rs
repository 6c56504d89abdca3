//! Canonical layout for freshly unpacked charts
//!
//! Helm archives carry a top-level directory named after the chart, so an
//! archive unpacked into `<root>/<chart>/<version>` ends up one level too deep.

use tracing::debug;

use crate::error::{CoreError, Result};
use crate::fs::remove_dir_if_exists;
use crate::layout::ChartLayout;

/// Flatten `<root>/<chart>/<version>/<chart>/` into `<root>/<chart>/<version>/`
///
/// Returns `false` when there was no nested directory to flatten. Entries
/// already present at the top level are replaced by their nested
/// counterparts.
pub fn rearrange_chart_dir(layout: &ChartLayout, chart: &str, version: &str) -> Result<bool> {
    let chart_dir = layout.chart_dir(chart, version);
    if !chart_dir.is_dir() {
        return Err(CoreError::ChartDirNotFound { path: chart_dir });
    }

    let nested = chart_dir.join(chart);
    if !nested.is_dir() {
        return Ok(false);
    }

    // Move the nested directory aside first: it may itself contain an entry
    // named after the chart
    let staging = chart_dir.join(format!(".{}-unpacked", chart));
    remove_dir_if_exists(&staging)?;
    std::fs::rename(&nested, &staging).map_err(|e| CoreError::io(&nested, e))?;

    let entries = std::fs::read_dir(&staging).map_err(|e| CoreError::io(&staging, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::io(&staging, e))?;
        let dest = chart_dir.join(entry.file_name());

        if dest.is_dir() {
            remove_dir_if_exists(&dest)?;
        } else if dest.exists() {
            std::fs::remove_file(&dest).map_err(|e| CoreError::io(&dest, e))?;
        }

        std::fs::rename(entry.path(), &dest).map_err(|e| CoreError::io(entry.path(), e))?;
    }

    std::fs::remove_dir(&staging).map_err(|e| CoreError::io(&staging, e))?;
    debug!(dir = %chart_dir.display(), "flattened unpacked chart");
    Ok(true)
}
