//! Diff command - write the customization patch of a vendored chart version

use std::path::Path;

use chartvend_core::{ChartLayout, PatchGeneration, ToolRunner, generate};

use super::{validate_chart_name, validate_version};
use crate::display;
use crate::error::Result;

pub fn run(chart: &str, version: &str, dir: &Path, runner: &dyn ToolRunner) -> Result<()> {
    validate_chart_name(chart)?;
    validate_version("version", version)?;

    let layout = ChartLayout::new(dir);

    display::step(format!(
        "Comparing {} version {} with its upstream chart",
        chart, version
    ));
    match generate(runner, &layout, chart, version)? {
        PatchGeneration::NoDiff => {
            display::success(format!("No customizations in {} {}", chart, version));
        }
        PatchGeneration::Diff(path) => {
            display::created("Patch file generated at", &path);
            display::success(format!("Customizations of {} {} captured", chart, version));
        }
    }
    Ok(())
}
