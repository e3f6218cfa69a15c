//! Profiling backend abstraction

use profiling_types::{ProfilingError, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use crate::directive::{StartDirective, StopDirective};

/// Trait that all profiling backends must implement
///
/// Backends are synchronous: `stop` returns once the artifact named by the
/// directive has been written.
pub trait ProfilerBackend: Send + Sync {
    /// Returns the name of this backend (e.g. "command", "recording")
    fn name(&self) -> &str;

    /// Begin recording the given events into the directive's output path
    fn start(&self, directive: &StartDirective) -> Result<()>;

    /// Stop recording and write the artifact
    fn stop(&self, directive: &StopDirective) -> Result<()>;
}

/// Backend that runs an external profiler program once per directive
///
/// The rendered directive command is passed as the last argument, after any
/// fixed arguments, e.g. `jcmd <pid> AsyncProfiler.execute start,event=cpu,...`.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandBackend {
    /// Create a backend invoking `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add a fixed argument placed before the directive
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Get the configured program
    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    fn execute(&self, command: String) -> Result<()> {
        debug!("Running {} with directive {}", self.program.display(), command);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&command)
            .output()
            .map_err(|e| ProfilingError::backend(&command, e.to_string()))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match stderr.trim() {
            "" => format!("{} exited with {}", self.program.display(), output.status),
            message => message.to_string(),
        };
        Err(ProfilingError::backend(command, reason))
    }
}

impl ProfilerBackend for CommandBackend {
    fn name(&self) -> &str {
        "command"
    }

    fn start(&self, directive: &StartDirective) -> Result<()> {
        self.execute(directive.command())
    }

    fn stop(&self, directive: &StopDirective) -> Result<()> {
        self.execute(directive.command())
    }
}
