//! Pull command - vendor an upstream chart version and carry customizations onto it

use std::path::PathBuf;

use chartvend_core::{
    ChartLayout, PatchGeneration, ProvenanceRecord, ToolRunner, apply, generate, provenance,
    rearrange_chart_dir, select_patch_base,
};
use chartvend_repo::{ChartClient, RepositoryType};
use tracing::debug;

use super::{validate_chart_name, validate_version};
use crate::display;
use crate::error::{CliError, Result};

/// Flags of `chartvend pull`
#[derive(Debug, Clone)]
pub struct PullArgs {
    pub chart: String,
    pub version: String,
    pub repo: String,
    pub dir: PathBuf,
    pub target_version: Option<String>,
    pub upstream_provenance: bool,
    pub patch: bool,
    pub patch_version: Option<String>,
}

impl PullArgs {
    /// Directory version the chart is vendored under
    fn target(&self) -> &str {
        self.target_version.as_deref().unwrap_or(&self.version)
    }

    /// Check every flag before anything touches the network or disk
    fn validate(&self) -> Result<()> {
        validate_chart_name(&self.chart)?;
        validate_version("version", &self.version)?;
        if let Some(target) = &self.target_version {
            validate_version("target-version", target)?;
        }
        if self.patch
            && let Some(base) = &self.patch_version
        {
            validate_version("patch-version", base)?;
        }
        if self.repo.trim().is_empty() {
            return Err(CliError::input("--repo can not be empty"));
        }
        RepositoryType::detect(&self.repo)?;
        if self.dir.as_os_str().is_empty() {
            return Err(CliError::input("--dir can not be empty"));
        }
        Ok(())
    }
}

/// Pull a chart version into the charts directory
pub async fn run(args: &PullArgs, client: &dyn ChartClient, runner: &dyn ToolRunner) -> Result<()> {
    args.validate()?;

    let chart = args.chart.as_str();
    let version = args.version.as_str();
    let target = args.target();
    let layout = ChartLayout::new(&args.dir);

    display::step(format!(
        "Adding/updating {} chart repository {}",
        chart, args.repo
    ));
    let repo = client.add_and_update_repo(chart, &args.repo).await?;
    display::note(format!("Using repository {}", repo.name));

    display::step(format!(
        "Pulling {} chart version {} to target version {}",
        chart, version, target
    ));
    let dest = layout.chart_dir(chart, target);
    client.download_archive(chart, &repo, version, &dest).await?;
    if rearrange_chart_dir(&layout, chart, target)? {
        debug!(dir = %dest.display(), "rearranged chart directory");
    }
    display::created("Chart pulled to", &dest);

    if args.upstream_provenance {
        display::step("Saving upstream chart and provenance");
        let snapshot = provenance::snapshot_upstream(&layout, chart, version, target)?;
        display::created("Upstream chart saved to", &snapshot);

        let entry = client.fetch_upstream_metadata(chart, &repo, version).await?;
        let record = ProvenanceRecord::new(version, entry.to_yaml_value()?);
        let record_path = provenance::save(&layout, chart, target, &record)?;
        display::created("Upstream provenance manifest created in", &record_path);
    }

    if !args.patch {
        display::success(format!("Pulled {} {}", chart, target));
        return Ok(());
    }

    let base = match &args.patch_version {
        Some(base) => Some(base.clone()),
        None => select_patch_base(&layout, chart, target)?.map(|v| v.to_string()),
    };
    let Some(base) = base else {
        display::note("No earlier version to carry customizations from");
        display::success(format!("Pulled {} {}", chart, target));
        return Ok(());
    };

    display::step(format!("Carrying customizations from version {}", base));
    match generate(runner, &layout, chart, &base)? {
        PatchGeneration::NoDiff => display::note("Nothing to patch from previous version"),
        PatchGeneration::Diff(patch_file) => {
            display::created("Patch file generated at", &patch_file);
            let report = apply(runner, &layout, chart, target, &patch_file)?;
            display::apply_report(&report);
        }
    }

    display::success(format!(
        "Pulled {} {}; any diffs from version {} have been applied",
        chart, target, base
    ));
    Ok(())
}
