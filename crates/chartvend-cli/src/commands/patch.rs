//! Patch command - replay a patch file onto a vendored chart version

use std::path::Path;

use chartvend_core::{ChartLayout, ToolRunner, apply};

use super::{validate_chart_name, validate_version};
use crate::display;
use crate::error::{CliError, Result};

pub fn run(
    chart: &str,
    version: &str,
    dir: &Path,
    patch_file: &Path,
    runner: &dyn ToolRunner,
) -> Result<()> {
    validate_chart_name(chart)?;
    validate_version("version", version)?;
    if patch_file.as_os_str().is_empty() {
        return Err(CliError::input("--patch-file can not be empty"));
    }

    let layout = ChartLayout::new(dir);

    display::step(format!(
        "Applying {} to {} version {}",
        patch_file.display(),
        chart,
        version
    ));
    let report = apply(runner, &layout, chart, version, patch_file)?;
    display::apply_report(&report);

    if report.is_clean() {
        display::success(format!("Patch applied to {} {}", chart, version));
    } else {
        display::success(format!(
            "Patch partially applied to {} {}; resolve the rejected hunks by hand",
            chart, version
        ));
    }
    Ok(())
}
