//! Customization patches
//!
//! [`generate`] captures every local edit made to a vendored chart as a
//! unified diff against its pristine upstream snapshot. [`apply`] replays that
//! diff onto a newly pulled version and reports which hunks did not fit.
//!
//! Empty results are values, not missing files: a tree without edits yields
//! [`PatchGeneration::NoDiff`], a patch that applied fully yields
//! [`ApplyStatus::Clean`], and the matching artifacts never linger on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::fs::{remove_file_if_exists, take_non_empty};
use crate::layout::{ChartLayout, PROVENANCE_DIR};
use crate::provenance;
use crate::tool::{ToolInvocation, ToolOutput, ToolRunner};

/// Recursive, new-file aware, whitespace-insensitive unified diff
pub const DIFF_FLAGS: &str = "-Naurw";

/// `diff` exit status meaning "trees are identical"
const DIFF_SAME: i32 = 0;

/// `diff` exit status meaning "differences found"
const DIFF_DIFFERENT: i32 = 1;

/// `patch` exit status meaning "some hunks were rejected"
const PATCH_REJECTS: i32 = 1;

/// Path components stripped from patch headers (`<root>/<chart>/<version>`)
pub const STRIP_COMPONENTS: usize = 3;

/// Outcome of diffing a vendored tree against its upstream snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchGeneration {
    /// No local customizations; no patch file exists
    NoDiff,
    /// Customizations written to this patch file
    Diff(PathBuf),
}

impl PatchGeneration {
    pub fn path(&self) -> Option<&Path> {
        match self {
            PatchGeneration::NoDiff => None,
            PatchGeneration::Diff(path) => Some(path),
        }
    }
}

/// A non-empty text artifact left next to the charts root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

/// Whether every hunk of a patch found its place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyStatus {
    Clean,
    /// Matching hunks were applied; the rest are in the rejects artifact
    Partial(Artifact),
}

/// Result of replaying a patch onto a chart version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// What `patch` printed while working, if anything
    pub output: Option<Artifact>,
    pub status: ApplyStatus,
}

impl ApplyReport {
    pub fn rejects(&self) -> Option<&Artifact> {
        match &self.status {
            ApplyStatus::Clean => None,
            ApplyStatus::Partial(rejects) => Some(rejects),
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self.status, ApplyStatus::Clean)
    }
}

/// Diff the pristine upstream copy of `source_version` against its current tree
///
/// Requires the provenance record of `source_version`, the snapshot it points
/// at, and the vendored tree itself; a missing piece means the repository is
/// damaged and nothing is written.
pub fn generate(
    runner: &dyn ToolRunner,
    layout: &ChartLayout,
    chart: &str,
    source_version: &str,
) -> Result<PatchGeneration> {
    let record = provenance::load(layout, chart, source_version)?;

    let chart_dir = layout.chart_dir(chart, source_version);
    if !chart_dir.is_dir() {
        return Err(CoreError::ChartDirNotFound { path: chart_dir });
    }

    let upstream_dir = record.upstream_dir(layout, chart);
    if !upstream_dir.is_dir() {
        return Err(CoreError::UpstreamSnapshotNotFound { path: upstream_dir });
    }

    // Both trees relative to the workspace, so the new side of every header
    // reads `<root>/<chart>/<version>/<file>` wherever the repository lives
    let (workspace, root_name) = layout.resolve()?;
    let upstream_rel = Path::new(PROVENANCE_DIR)
        .join(chart)
        .join(&record.upstream_chart_local_path);
    let local_rel = Path::new(&root_name).join(chart).join(source_version);

    let invocation = ToolInvocation::new("diff")
        .arg(DIFF_FLAGS)
        .arg(upstream_rel)
        .arg(local_rel)
        .current_dir(&workspace);

    let output = runner.run(&invocation)?;
    match output.status {
        Some(DIFF_SAME) | Some(DIFF_DIFFERENT) => {}
        _ => return Err(output.into_failure(&invocation)),
    }

    let patch_file = layout.patch_file(chart, source_version);
    if output.stdout.is_empty() {
        remove_file_if_exists(&patch_file)?;
        info!(chart, version = source_version, "no customizations to carry forward");
        return Ok(PatchGeneration::NoDiff);
    }

    std::fs::write(&patch_file, &output.stdout).map_err(|e| CoreError::io(&patch_file, e))?;
    info!(path = %patch_file.display(), "wrote customization patch");
    Ok(PatchGeneration::Diff(patch_file))
}

/// Replay `patch_file` onto the tree of `target_version`
///
/// Runs unattended and without backup files. Only the target tree and the
/// `_out` / `_rejects` artifacts are written; the patch file is left alone.
pub fn apply(
    runner: &dyn ToolRunner,
    layout: &ChartLayout,
    chart: &str,
    target_version: &str,
    patch_file: &Path,
) -> Result<ApplyReport> {
    let chart_dir = layout.chart_dir(chart, target_version);
    if !chart_dir.is_dir() {
        return Err(CoreError::ChartDirNotFound { path: chart_dir });
    }
    if !patch_file.is_file() {
        return Err(CoreError::PatchFileNotFound {
            path: patch_file.to_path_buf(),
        });
    }

    // `patch -d` changes directory before reading anything, so every path
    // handed to it must be absolute
    let target = canonical(&chart_dir)?;
    let patch_input = canonical(patch_file)?;
    let (workspace, _) = layout.resolve()?;
    let output_path = beside(&workspace, &layout.output_file(chart, target_version));
    let rejects_path = beside(&workspace, &layout.rejects_file(chart, target_version));

    std::fs::File::create(&rejects_path).map_err(|e| CoreError::io(&rejects_path, e))?;

    let invocation = ToolInvocation::new("patch")
        .arg("--force")
        .arg("--no-backup-if-mismatch")
        .arg(format!("-p{}", STRIP_COMPONENTS))
        .arg("-r")
        .arg(&rejects_path)
        .arg("-d")
        .arg(&target)
        .arg("-i")
        .arg(&patch_input)
        .env_remove("POSIXLY_CORRECT");

    let result = runner
        .run(&invocation)
        .and_then(|output| classify(output, &invocation, &rejects_path));

    let (output, rejects) = match result {
        Ok(classified) => classified,
        Err(e) => {
            remove_file_if_exists(&rejects_path)?;
            remove_file_if_exists(&output_path)?;
            return Err(e);
        }
    };

    let output = if output.stdout.is_empty() {
        remove_file_if_exists(&output_path)?;
        None
    } else {
        std::fs::write(&output_path, &output.stdout)
            .map_err(|e| CoreError::io(&output_path, e))?;
        Some(Artifact {
            path: output_path,
            content: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    };

    let status = match rejects {
        None => {
            debug!(target = %target.display(), "patch applied cleanly");
            ApplyStatus::Clean
        }
        Some(content) => {
            warn!(rejects = %rejects_path.display(), "patch applied with rejected hunks");
            ApplyStatus::Partial(Artifact {
                path: rejects_path,
                content,
            })
        }
    };

    Ok(ApplyReport { output, status })
}

/// Accept a clean run, or a run whose only trouble is recorded rejects
///
/// Hunks for files missing from the target are skipped by `patch` without
/// reaching the rejects file, so any skipped hunk makes the run a failure.
fn classify(
    output: ToolOutput,
    invocation: &ToolInvocation,
    rejects_path: &Path,
) -> Result<(ToolOutput, Option<String>)> {
    let rejects = take_non_empty(rejects_path)?;
    match (output.status, &rejects) {
        (Some(0), _) => Ok((output, rejects)),
        (Some(PATCH_REJECTS), Some(_)) if !skipped_hunks(&output.stdout) => Ok((output, rejects)),
        _ => Err(output.into_failure(invocation)),
    }
}

/// Whether `patch` reported hunks it ignored instead of rejecting
fn skipped_hunks(stdout: &[u8]) -> bool {
    String::from_utf8_lossy(stdout).lines().any(|line| {
        line.contains("No file to patch")
            || line.contains(" hunk ignored")
            || line.contains(" hunks ignored")
    })
}

fn canonical(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| CoreError::io(path, e))
}

/// Re-home an artifact path under the resolved workspace
fn beside(workspace: &Path, artifact: &Path) -> PathBuf {
    match artifact.file_name() {
        Some(name) => workspace.join(name),
        None => artifact.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::provenance::ProvenanceRecord;
    use crate::tool::SystemRunner;
    use crate::tool::scripted::ScriptedRunner;
    use tempfile::TempDir;

    const CHART: &str = "keycloak";

    const VALUES: &str = "replicas: 1\nimage: keycloak\nport: 8080\n";
    const CONFIGMAP: &str = "kind: ConfigMap\nname: demo\nlogLevel: info\n";

    fn setup() -> (TempDir, ChartLayout) {
        let dir = TempDir::new().unwrap();
        let layout = ChartLayout::new(dir.path().join("charts"));
        std::fs::create_dir_all(layout.root()).unwrap();
        (dir, layout)
    }

    fn write_tree(dir: &Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            let path = dir.join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
    }

    fn read_tree(dir: &Path) -> BTreeMap<String, String> {
        walkdir::WalkDir::new(dir)
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(dir).unwrap().to_string_lossy().into_owned();
                (rel, std::fs::read_to_string(e.path()).unwrap())
            })
            .collect()
    }

    /// Vendor `version` as pulled from upstream, with snapshot and provenance
    fn vendor(layout: &ChartLayout, version: &str, files: &[(&str, &str)]) {
        write_tree(&layout.chart_dir(CHART, version), files);
        provenance::snapshot_upstream(layout, CHART, version, version).unwrap();
        provenance::save(
            layout,
            CHART,
            version,
            &ProvenanceRecord::new(version, serde_yaml::Value::Null),
        )
        .unwrap();
    }

    fn upstream_files() -> Vec<(&'static str, &'static str)> {
        vec![("values.yaml", VALUES), ("templates/configmap.yaml", CONFIGMAP)]
    }

    #[test]
    fn test_identical_trees_yield_no_diff() {
        let (_dir, layout) = setup();
        vendor(&layout, "1.0.0", &upstream_files());

        let result = generate(&SystemRunner, &layout, CHART, "1.0.0").unwrap();
        assert_eq!(result, PatchGeneration::NoDiff);
        assert!(!layout.patch_file(CHART, "1.0.0").exists());
    }

    #[test]
    fn test_no_diff_removes_stale_patch() {
        let (_dir, layout) = setup();
        vendor(&layout, "1.0.0", &upstream_files());
        std::fs::write(layout.patch_file(CHART, "1.0.0"), "stale").unwrap();

        let result = generate(&SystemRunner, &layout, CHART, "1.0.0").unwrap();
        assert_eq!(result, PatchGeneration::NoDiff);
        assert!(!layout.patch_file(CHART, "1.0.0").exists());
    }

    #[test]
    fn test_single_added_line() {
        let (_dir, layout) = setup();
        vendor(&layout, "1.0.0", &upstream_files());
        write_tree(
            &layout.chart_dir(CHART, "1.0.0"),
            &[("values.yaml", "replicas: 1\nimage: keycloak\nextraEnv: true\nport: 8080\n")],
        );

        let result = generate(&SystemRunner, &layout, CHART, "1.0.0").unwrap();
        let path = result.path().expect("expected a patch file").to_path_buf();
        assert_eq!(path, layout.patch_file(CHART, "1.0.0"));

        let diff = std::fs::read_to_string(&path).unwrap();
        assert!(diff.contains("--- provenance/keycloak/upstreams/1.0.0/values.yaml"));
        assert!(diff.contains("+++ charts/keycloak/1.0.0/values.yaml"));

        let added: Vec<_> = diff
            .lines()
            .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
            .collect();
        let removed: Vec<_> = diff
            .lines()
            .filter(|l| l.starts_with('-') && !l.starts_with("---"))
            .collect();
        assert_eq!(added, vec!["+extraEnv: true"]);
        assert!(removed.is_empty());
    }

    #[test]
    fn test_whitespace_only_changes_are_ignored() {
        let (_dir, layout) = setup();
        vendor(&layout, "1.0.0", &upstream_files());
        write_tree(
            &layout.chart_dir(CHART, "1.0.0"),
            &[("values.yaml", "replicas:   1\nimage: keycloak \nport: 8080\n")],
        );

        let result = generate(&SystemRunner, &layout, CHART, "1.0.0").unwrap();
        assert_eq!(result, PatchGeneration::NoDiff);
    }

    #[test]
    fn test_roundtrip_onto_unchanged_upstream() {
        let (_dir, layout) = setup();
        vendor(&layout, "1.0.0", &upstream_files());
        write_tree(
            &layout.chart_dir(CHART, "1.0.0"),
            &[
                ("values.yaml", "replicas: 3\nimage: keycloak\nport: 8080\n"),
                ("templates/secret.yaml", "kind: Secret\n"),
            ],
        );

        let patch = generate(&SystemRunner, &layout, CHART, "1.0.0").unwrap();
        let patch = patch.path().unwrap().to_path_buf();

        // New upstream version with identical content
        write_tree(&layout.chart_dir(CHART, "1.1.0"), &upstream_files());

        let report = apply(&SystemRunner, &layout, CHART, "1.1.0", &patch).unwrap();
        assert!(report.is_clean());
        assert!(!layout.rejects_file(CHART, "1.1.0").exists());
        assert_eq!(
            read_tree(&layout.chart_dir(CHART, "1.1.0")),
            read_tree(&layout.chart_dir(CHART, "1.0.0"))
        );

        let output = report.output.expect("patch narrates what it patched");
        assert!(output.content.contains("values.yaml"));
        assert_eq!(
            std::fs::read_to_string(&output.path).unwrap(),
            output.content
        );
    }

    #[test]
    fn test_conflicting_hunk_is_rejected_others_applied() {
        let (_dir, layout) = setup();
        vendor(&layout, "1.0.0", &upstream_files());
        write_tree(
            &layout.chart_dir(CHART, "1.0.0"),
            &[
                ("values.yaml", "replicas: 3\nimage: keycloak\nport: 8080\n"),
                ("templates/configmap.yaml", "kind: ConfigMap\nname: demo\nlogLevel: debug\n"),
            ],
        );
        let patch = generate(&SystemRunner, &layout, CHART, "1.0.0").unwrap();
        let patch = patch.path().unwrap().to_path_buf();
        let patch_before = std::fs::read(&patch).unwrap();

        // Upstream independently changed the customized line
        write_tree(
            &layout.chart_dir(CHART, "1.1.0"),
            &[
                ("values.yaml", VALUES),
                ("templates/configmap.yaml", "kind: ConfigMap\nname: demo\nlogLevel: warn\n"),
            ],
        );

        let report = apply(&SystemRunner, &layout, CHART, "1.1.0", &patch).unwrap();
        let rejects = report.rejects().expect("expected rejected hunks");
        assert_eq!(rejects.path.file_name().unwrap(), "keycloak_patch_1.1.0_rejects");
        assert!(rejects.content.contains("+logLevel: debug"));
        assert!(rejects.path.exists());

        let tree = read_tree(&layout.chart_dir(CHART, "1.1.0"));
        assert_eq!(tree["values.yaml"], "replicas: 3\nimage: keycloak\nport: 8080\n");
        assert_eq!(
            tree["templates/configmap.yaml"],
            "kind: ConfigMap\nname: demo\nlogLevel: warn\n"
        );
        assert!(!tree.keys().any(|k| k.ends_with(".orig") || k.ends_with(".rej")));

        assert_eq!(std::fs::read(&patch).unwrap(), patch_before);
    }

    #[test]
    fn test_customized_file_removed_upstream_is_fatal() {
        let (_dir, layout) = setup();
        let mut files = upstream_files();
        files.push(("templates/legacy.yaml", "kind: Service\ntype: ClusterIP\n"));
        vendor(&layout, "1.0.0", &files);
        write_tree(
            &layout.chart_dir(CHART, "1.0.0"),
            &[
                ("templates/configmap.yaml", "kind: ConfigMap\nname: demo\nlogLevel: debug\n"),
                ("templates/legacy.yaml", "kind: Service\ntype: NodePort\n"),
            ],
        );
        let patch = generate(&SystemRunner, &layout, CHART, "1.0.0").unwrap();
        let patch = patch.path().unwrap().to_path_buf();

        // 1.1.0 drops legacy.yaml and changes the customized configmap line
        write_tree(
            &layout.chart_dir(CHART, "1.1.0"),
            &[
                ("values.yaml", VALUES),
                ("templates/configmap.yaml", "kind: ConfigMap\nname: demo\nlogLevel: warn\n"),
            ],
        );

        let err = apply(&SystemRunner, &layout, CHART, "1.1.0", &patch).unwrap_err();
        match err {
            CoreError::ToolFailed { status, stderr, .. } => {
                assert_eq!(status, "exit status 1");
                assert!(stderr.contains("legacy.yaml"), "diagnostics: {stderr}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!layout.rejects_file(CHART, "1.1.0").exists());
    }

    #[test]
    fn test_missing_target_file_explains_failure() {
        let (_dir, layout) = setup();
        let mut files = upstream_files();
        files.push(("templates/legacy.yaml", "kind: Service\ntype: ClusterIP\n"));
        vendor(&layout, "1.0.0", &files);
        write_tree(
            &layout.chart_dir(CHART, "1.0.0"),
            &[("templates/legacy.yaml", "kind: Service\ntype: NodePort\n")],
        );
        let patch = generate(&SystemRunner, &layout, CHART, "1.0.0").unwrap();
        let patch = patch.path().unwrap().to_path_buf();

        write_tree(&layout.chart_dir(CHART, "1.1.0"), &upstream_files());

        let err = apply(&SystemRunner, &layout, CHART, "1.1.0", &patch).unwrap_err();
        assert!(err.to_string().contains("can't find file"), "{err}");
    }

    #[test]
    fn test_generate_missing_chart_dir() {
        let (_dir, layout) = setup();
        vendor(&layout, "1.0.0", &upstream_files());
        std::fs::remove_dir_all(layout.chart_dir(CHART, "1.0.0")).unwrap();

        let err = generate(&SystemRunner, &layout, CHART, "1.0.0").unwrap_err();
        assert!(matches!(err, CoreError::ChartDirNotFound { .. }));
        assert!(!layout.patch_file(CHART, "1.0.0").exists());
    }

    #[test]
    fn test_generate_missing_snapshot() {
        let (_dir, layout) = setup();
        vendor(&layout, "1.0.0", &upstream_files());
        std::fs::remove_dir_all(layout.upstream_dir(CHART, "1.0.0")).unwrap();

        let err = generate(&SystemRunner, &layout, CHART, "1.0.0").unwrap_err();
        assert!(matches!(err, CoreError::UpstreamSnapshotNotFound { .. }));
    }

    #[test]
    fn test_generate_missing_provenance() {
        let (_dir, layout) = setup();
        write_tree(&layout.chart_dir(CHART, "1.0.0"), &upstream_files());

        let err = generate(&SystemRunner, &layout, CHART, "1.0.0").unwrap_err();
        assert!(matches!(err, CoreError::ProvenanceNotFound { .. }));
    }

    #[test]
    fn test_apply_missing_chart_dir() {
        let (_dir, layout) = setup();
        let patch = layout.workspace().join("custom.patch");
        std::fs::write(&patch, "--- a\n+++ b\n").unwrap();

        let err = apply(&SystemRunner, &layout, CHART, "1.1.0", &patch).unwrap_err();
        assert!(matches!(err, CoreError::ChartDirNotFound { .. }));
        assert!(!layout.rejects_file(CHART, "1.1.0").exists());
        assert!(!layout.output_file(CHART, "1.1.0").exists());
    }

    #[test]
    fn test_apply_missing_patch_file() {
        let (_dir, layout) = setup();
        write_tree(&layout.chart_dir(CHART, "1.1.0"), &upstream_files());

        let missing = layout.workspace().join("missing.patch");
        let err = apply(&SystemRunner, &layout, CHART, "1.1.0", &missing).unwrap_err();
        match err {
            CoreError::PatchFileNotFound { path } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_apply_malformed_patch_is_fatal() {
        let (_dir, layout) = setup();
        write_tree(&layout.chart_dir(CHART, "1.1.0"), &upstream_files());
        let patch = layout.workspace().join("garbage.patch");
        std::fs::write(&patch, "this is not a patch\n").unwrap();

        let err = apply(&SystemRunner, &layout, CHART, "1.1.0", &patch).unwrap_err();
        match err {
            CoreError::ToolFailed { command, .. } => assert!(command.starts_with("patch --force")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!layout.rejects_file(CHART, "1.1.0").exists());
    }

    // ============ Exit status classification ============

    #[test]
    fn test_diff_differences_found_is_success() {
        let (_dir, layout) = setup();
        vendor(&layout, "1.0.0", &upstream_files());
        let runner = ScriptedRunner::new([ToolOutput::with_status(1).stdout("--- a\n+++ b\n")]);

        let result = generate(&runner, &layout, CHART, "1.0.0").unwrap();
        let path = result.path().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "--- a\n+++ b\n");

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "diff");
        assert_eq!(calls[0].args[0], DIFF_FLAGS);
        assert_eq!(calls[0].args[1], Path::new("provenance/keycloak/upstreams/1.0.0"));
        assert_eq!(calls[0].args[2], Path::new("charts/keycloak/1.0.0"));
    }

    #[test]
    fn test_diff_trouble_is_fatal() {
        let (_dir, layout) = setup();
        vendor(&layout, "1.0.0", &upstream_files());
        let runner = ScriptedRunner::new([ToolOutput::with_status(2)
            .stdout("partial")
            .stderr("diff: No such file or directory")]);

        let err = generate(&runner, &layout, CHART, "1.0.0").unwrap_err();
        match err {
            CoreError::ToolFailed { command, status, stderr } => {
                assert!(command.starts_with("diff -Naurw"));
                assert_eq!(status, "exit status 2");
                assert!(stderr.contains("No such file"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!layout.patch_file(CHART, "1.0.0").exists());
    }

    fn scripted_apply(runner: &ScriptedRunner) -> (TempDir, ChartLayout, Result<ApplyReport>) {
        let (dir, layout) = setup();
        write_tree(&layout.chart_dir(CHART, "1.1.0"), &upstream_files());
        let patch = layout.workspace().join("custom.patch");
        std::fs::write(&patch, "--- a\n+++ b\n").unwrap();
        let result = apply(runner, &layout, CHART, "1.1.0", &patch);
        (dir, layout, result)
    }

    #[test]
    fn test_patch_rejects_are_partial_success() {
        let runner = ScriptedRunner::new([ToolOutput::with_status(1).stdout("1 out of 1 hunk FAILED\n")])
            .with_rejects("@@ -1 +1 @@\n-a\n+b\n");

        let (_dir, layout, result) = scripted_apply(&runner);
        let report = result.unwrap();
        let rejects = report.rejects().unwrap();
        assert_eq!(rejects.content, "@@ -1 +1 @@\n-a\n+b\n");
        assert_eq!(
            report.output.as_ref().unwrap().content,
            "1 out of 1 hunk FAILED\n"
        );
        assert!(layout.output_file(CHART, "1.1.0").exists());

        let calls = runner.calls.borrow();
        let args: Vec<_> = calls[0].args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(&args[..3], ["--force", "--no-backup-if-mismatch", "-p3"]);
        assert_eq!(calls[0].env_remove, vec!["POSIXLY_CORRECT".to_string()]);
    }

    #[test]
    fn test_patch_failure_without_rejects_is_fatal() {
        let runner = ScriptedRunner::new([ToolOutput::with_status(1).stderr("can't find file")]);

        let (_dir, layout, result) = scripted_apply(&runner);
        assert!(matches!(result, Err(CoreError::ToolFailed { .. })));
        assert!(!layout.rejects_file(CHART, "1.1.0").exists());
        assert!(!layout.output_file(CHART, "1.1.0").exists());
    }

    #[test]
    fn test_patch_ignored_hunks_are_fatal_even_with_rejects() {
        let runner = ScriptedRunner::new([ToolOutput::with_status(1).stdout(
            "patching file values.yaml\nHunk #1 FAILED at 1.\n\
             1 out of 1 hunk FAILED -- saving rejects to file rejects\n\
             The next patch would create the file gone.yaml,\n\
             No file to patch.  Skipping patch.\n\
             1 out of 1 hunk ignored\n",
        )])
        .with_rejects("@@ -1 +1 @@\n-a\n+b\n");

        let (_dir, layout, result) = scripted_apply(&runner);
        match result {
            Err(CoreError::ToolFailed { stderr, .. }) => assert!(stderr.contains("hunk ignored")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!layout.rejects_file(CHART, "1.1.0").exists());
        assert!(!layout.output_file(CHART, "1.1.0").exists());
    }

    #[test]
    fn test_patch_trouble_is_fatal_even_with_rejects() {
        let runner = ScriptedRunner::new([ToolOutput::with_status(2)]).with_rejects("hunk\n");

        let (_dir, layout, result) = scripted_apply(&runner);
        assert!(matches!(result, Err(CoreError::ToolFailed { .. })));
        assert!(!layout.rejects_file(CHART, "1.1.0").exists());
    }

    #[test]
    fn test_silent_clean_apply_leaves_no_artifacts() {
        let runner = ScriptedRunner::new([ToolOutput::with_status(0)]);

        let (_dir, layout, result) = scripted_apply(&runner);
        let report = result.unwrap();
        assert_eq!(
            report,
            ApplyReport {
                output: None,
                status: ApplyStatus::Clean
            }
        );
        assert!(!layout.rejects_file(CHART, "1.1.0").exists());
        assert!(!layout.output_file(CHART, "1.1.0").exists());
    }
}
