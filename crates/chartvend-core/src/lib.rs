//! Chartvend Core - customization overlays for vendored Helm charts
//!
//! This crate owns the patch lifecycle of a vendored chart:
//! - `ledger`: which already-vendored version a new pull is diffed against
//! - `provenance`: the record linking a vendored tree to its pristine upstream copy
//! - `patch`: generating the customization diff and replaying it onto a new version
//! - `rearrange`: flattening freshly unpacked archives into the canonical layout
//!
//! External `diff` and `patch` binaries do the line-oriented work; they are
//! reached through the [`ToolRunner`] trait so the branching logic can be
//! exercised without real subprocesses.

pub mod error;
pub mod fs;
pub mod layout;
pub mod ledger;
pub mod patch;
pub mod provenance;
pub mod rearrange;
pub mod tool;

pub use error::{CoreError, Result};
pub use layout::ChartLayout;
pub use ledger::{list_versions, select_patch_base};
pub use patch::{ApplyReport, ApplyStatus, Artifact, PatchGeneration, apply, generate};
pub use provenance::ProvenanceRecord;
pub use rearrange::rearrange_chart_dir;
pub use tool::{SystemRunner, ToolInvocation, ToolOutput, ToolRunner};
