//! Display formatting for CLI output

use chartvend_core::{ApplyReport, ApplyStatus, Artifact};
use console::style;
use std::fmt::Display;
use std::path::Path;

/// A pipeline step starting
pub fn step(message: impl Display) {
    println!("{} {}", style("→").cyan(), message);
}

/// A pipeline step that produced something on disk
pub fn created(what: &str, path: &Path) {
    println!("  {} {} {}", style("✓").green(), what, style(path.display()).dim());
}

/// Informational line under the current step
pub fn note(message: impl Display) {
    println!("  {}", message);
}

/// Final line of a command
pub fn success(message: impl Display) {
    println!();
    println!("{} {}", style("✓").green().bold(), message);
}

fn print_artifact(title: &str, artifact: &Artifact) {
    println!(
        "{} {}",
        style(title).bold(),
        style(artifact.path.display()).dim()
    );
    print!("{}", artifact.content);
    if !artifact.content.ends_with('\n') {
        println!();
    }
}

/// Show what `patch` printed and which hunks were rejected
pub fn apply_report(report: &ApplyReport) {
    if let Some(output) = &report.output {
        print_artifact("Patching output:", output);
    }

    match &report.status {
        ApplyStatus::Clean => note("No rejects from patching"),
        ApplyStatus::Partial(rejects) => {
            println!(
                "{} some hunks did not apply and need manual merging",
                style("!").yellow().bold()
            );
            print_artifact("Patching results for rejects:", rejects);
        }
    }
}
