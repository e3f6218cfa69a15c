//! In-process recording backend
//!
//! Keeps a log of every directive it receives and writes a small artifact on
//! stop. Used by hosts without an attached profiler and throughout the tests.

use parking_lot::{Mutex, RwLock};
use profiling_types::{ProfilingError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::backend::ProfilerBackend;
use crate::directive::{StartDirective, StopDirective};

/// A directive received by the recording backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// A start directive
    Start(StartDirective),
    /// A stop directive
    Stop(StopDirective),
}

/// Backend that records directives and writes placeholder artifacts
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Every directive received, in order
    calls: RwLock<Vec<BackendCall>>,
    /// Recordings started and not yet stopped, keyed by artifact path
    active: Mutex<HashMap<PathBuf, StartDirective>>,
    /// Reject the next start directives
    fail_start: AtomicBool,
    /// Reject the next stop directives
    fail_stop: AtomicBool,
}

impl RecordingBackend {
    /// Create a new recording backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent start directives fail
    pub fn set_fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent stop directives fail
    pub fn set_fail_stop(&self, fail: bool) {
        self.fail_stop.store(fail, Ordering::SeqCst);
    }

    /// All directives received so far
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.read().clone()
    }

    /// Number of start directives received
    pub fn start_count(&self) -> usize {
        self.calls
            .read()
            .iter()
            .filter(|call| matches!(call, BackendCall::Start(_)))
            .count()
    }

    /// Number of stop directives received
    pub fn stop_count(&self) -> usize {
        self.calls
            .read()
            .iter()
            .filter(|call| matches!(call, BackendCall::Stop(_)))
            .count()
    }

    /// Whether a recording into `path` is in progress
    pub fn is_recording(&self, path: &std::path::Path) -> bool {
        self.active.lock().contains_key(path)
    }
}

impl ProfilerBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn start(&self, directive: &StartDirective) -> Result<()> {
        self.calls.write().push(BackendCall::Start(directive.clone()));

        if self.fail_start.load(Ordering::SeqCst) {
            return Err(ProfilingError::backend(
                directive.command(),
                "injected start failure",
            ));
        }

        let mut active = self.active.lock();
        if active.contains_key(&directive.output_path) {
            return Err(ProfilingError::backend(
                directive.command(),
                "Profiler already started",
            ));
        }
        active.insert(directive.output_path.clone(), directive.clone());
        debug!("Recording into {}", directive.output_path.display());
        Ok(())
    }

    fn stop(&self, directive: &StopDirective) -> Result<()> {
        self.calls.write().push(BackendCall::Stop(directive.clone()));

        let started = self.active.lock().remove(&directive.output_path);

        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(ProfilingError::backend(
                directive.command(),
                "injected stop failure",
            ));
        }

        let started = started.ok_or_else(|| {
            ProfilingError::backend(directive.command(), "Profiler is not active")
        })?;

        if let Some(parent) = directive.output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ProfilingError::backend(directive.command(), e.to_string()))?;
        }
        fs::write(&directive.output_path, format!("{}\n", started.command()))
            .map_err(|e| ProfilingError::backend(directive.command(), e.to_string()))?;

        debug!("Wrote artifact {}", directive.output_path.display());
        Ok(())
    }
}
