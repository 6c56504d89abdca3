//! Standard exit codes for CLI operations

/// Success - operation completed without errors
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Invalid input - bad flag value, version or repository URL
pub const INPUT_ERROR: i32 = 2;

/// Repository corruption - malformed version directory, missing provenance
/// record, missing upstream snapshot
pub const CORRUPTION_ERROR: i32 = 3;

/// External tool error - `diff` or `patch` failed or could not be started
pub const TOOL_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Repository error - chart repository unreachable or inconsistent
pub const REPOSITORY_ERROR: i32 = 6;
