//! Provisioning tool invocation.
//! The tool runs as a child process in the project's working directory; each
//! invocation is reported as a status/message/error triple.

use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

use crate::error::Result;

/// Outcome of one provisioning tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Exit status; -1 when the process was terminated by a signal.
    pub status: i32,
    /// Captured standard output.
    pub message: String,
    /// Captured standard error, `None` when empty.
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn success(&self) -> bool {
        self.status == 0 && self.error.is_none()
    }
}

/// Something that can run provisioning commands in a working directory.
pub trait ProvisioningTool {
    fn run(&self, working_dir: &Path, args: &[&str]) -> Result<StepOutcome>;
}

/// The Terraform executable.
#[derive(Debug, Clone)]
pub struct Terraform {
    binary: String,
}

impl Terraform {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for Terraform {
    fn default() -> Self {
        Terraform::new("terraform")
    }
}

impl ProvisioningTool for Terraform {
    fn run(&self, working_dir: &Path, args: &[&str]) -> Result<StepOutcome> {
        debug!("Executing {} {:?} in {}", self.binary, args, working_dir.display());

        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .output()?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Ok(StepOutcome {
            status: output.status.code().unwrap_or(-1),
            message: String::from_utf8_lossy(&output.stdout).into_owned(),
            error: (!stderr.is_empty()).then_some(stderr),
        })
    }
}
