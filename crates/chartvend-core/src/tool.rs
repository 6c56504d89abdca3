//! External tool invocation
//!
//! `diff` and `patch` are run through [`ToolRunner`], a narrow
//! `run(invocation) -> (status, stdout, stderr)` capability. Production code
//! uses [`SystemRunner`]; tests substitute scripted outputs to drive the
//! exit-status classification without spawning processes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{CoreError, Result};

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub current_dir: Option<PathBuf>,
    /// Variables removed from the child's environment
    pub env_remove: Vec<String>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env_remove: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    /// Value following `flag` in the argument list
    pub fn arg_after(&self, flag: &str) -> Option<&Path> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(Path::new)
    }

    /// Human-readable command line for error messages
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        if let Some(dir) = &self.current_dir {
            line.push_str(&format!(" (in {})", dir.display()));
        }
        line
    }
}

/// Captured result of a finished tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn with_status(status: i32) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn stdout(mut self, stdout: impl Into<Vec<u8>>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn stderr(mut self, stderr: impl Into<Vec<u8>>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// What the tool said about its trouble
    ///
    /// `patch` reports most problems on stdout, so stdout stands in when
    /// stderr is empty.
    pub fn diagnostics(&self) -> String {
        let stderr = String::from_utf8_lossy(&self.stderr).trim().to_string();
        if !stderr.is_empty() {
            return stderr;
        }
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }

    /// Build the error reported when this output is not an accepted outcome
    pub fn into_failure(self, invocation: &ToolInvocation) -> CoreError {
        let status = match self.status {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        };
        CoreError::ToolFailed {
            command: invocation.command_line(),
            status,
            stderr: self.diagnostics(),
        }
    }
}

/// Capability to run an external tool to completion
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput>;
}

/// Runs tools as blocking child processes
///
/// Stdin is closed so a tool that wants to ask a question fails instead of
/// hanging. No timeout is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        debug!(command = %invocation.command_line(), "running external tool");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).stdin(Stdio::null());
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }
        for key in &invocation.env_remove {
            command.env_remove(key);
        }

        let output = command.output().map_err(|source| CoreError::ToolSpawn {
            command: invocation.command_line(),
            source,
        })?;

        debug!(status = ?output.status.code(), "external tool finished");

        Ok(ToolOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
