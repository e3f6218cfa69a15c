//! ProfilerSession implementation
//!
//! One start-to-stop bracket of a profiling backend. Both transitions are
//! guarded so repeated calls never reach the backend twice.

use profiling_types::{OutputKind, ProfilingConfig, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::ProfilerBackend;
use crate::directive::StartDirective;

/// Compose the artifact path `{base}_{events with ',' replaced by '_'}.{ext}`
///
/// # Example
///
/// ```
/// use profiler_session::output_path;
/// use profiling_types::OutputKind;
/// use std::path::{Path, PathBuf};
///
/// let path = output_path(Path::new("/out/Suite.run"), "cpu,lock", OutputKind::Jfr);
/// assert_eq!(path, PathBuf::from("/out/Suite.run_cpu_lock.jfr"));
/// ```
pub fn output_path(base: &Path, events: &str, kind: OutputKind) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(format!("_{}.{}", events.replace(',', "_"), kind.extension()));
    PathBuf::from(path)
}

/// Idempotent start/stop wrapper around a profiling backend
pub struct ProfilerSession {
    /// Backend receiving the directives
    backend: Arc<dyn ProfilerBackend>,
    /// Start directive derived from the config; stop reuses its path
    directive: StartDirective,
    /// Whether the backend is currently recording for this session
    started: bool,
}

impl ProfilerSession {
    /// Create a session writing to `{base_name}_{events}.{ext}`
    pub fn new(
        backend: Arc<dyn ProfilerBackend>,
        config: &ProfilingConfig,
        base_name: impl AsRef<Path>,
    ) -> Self {
        let path = output_path(base_name.as_ref(), config.events(), config.output_kind());
        Self {
            backend,
            directive: StartDirective {
                events: config.events().to_string(),
                output_kind: config.output_kind(),
                output_path: path,
            },
            started: false,
        }
    }

    /// Artifact path of this session
    pub fn output_path(&self) -> &Path {
        &self.directive.output_path
    }

    /// Start directive issued by [`start`](Self::start)
    pub fn start_directive(&self) -> &StartDirective {
        &self.directive
    }

    /// Whether the backend is recording for this session
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Start profiling; no-op when already started
    ///
    /// A backend failure is returned unchanged and leaves the session stopped.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }

        info!(
            "Start profiling via {}: {}",
            self.backend.name(),
            self.directive.command()
        );
        self.backend.start(&self.directive)?;
        self.started = true;
        Ok(())
    }

    /// Stop profiling; no-op when not started
    ///
    /// The session is marked stopped even when the backend rejects the
    /// directive; the error is still returned.
    pub fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }

        info!("Stop profiling: {}", self.directive.output_path.display());
        let result = self.backend.stop(&self.directive.stop());
        self.started = false;

        if let Err(ref e) = result {
            warn!("Profiler stop failed: {}", e);
        }
        result
    }
}

impl fmt::Debug for ProfilerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfilerSession")
            .field("backend", &self.backend.name())
            .field("output_path", &self.directive.output_path)
            .field("started", &self.started)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording_backend::RecordingBackend;

    fn session(backend: &Arc<RecordingBackend>, kind: OutputKind) -> ProfilerSession {
        let config = ProfilingConfig::builder()
            .events("cpu,lock")
            .output_kind(kind)
            .build();
        let base = std::env::temp_dir()
            .join(format!("session-{}", uuid::Uuid::new_v4()))
            .join("Suite.run");
        ProfilerSession::new(backend.clone(), &config, base)
    }

    #[test]
    fn test_output_path_suffix_and_extension() {
        let base = Path::new("/out/Suite.run");
        assert_eq!(
            output_path(base, "cpu,alloc,lock", OutputKind::Jfr),
            PathBuf::from("/out/Suite.run_cpu_alloc_lock.jfr")
        );
        assert_eq!(
            output_path(base, "wall", OutputKind::Flame),
            PathBuf::from("/out/Suite.run_wall.html")
        );
    }

    #[test]
    fn test_new_session_not_started() {
        let backend = Arc::new(RecordingBackend::new());
        let session = session(&backend, OutputKind::Jfr);

        assert!(!session.is_started());
        assert!(session.output_path().to_string_lossy().ends_with("Suite.run_cpu_lock.jfr"));
        assert_eq!(backend.calls().len(), 0);
    }

    #[test]
    fn test_start_twice_issues_one_directive() {
        let backend = Arc::new(RecordingBackend::new());
        let mut session = session(&backend, OutputKind::Flame);

        session.start().unwrap();
        session.start().unwrap();

        assert!(session.is_started());
        assert_eq!(backend.start_count(), 1);
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let backend = Arc::new(RecordingBackend::new());
        let mut session = session(&backend, OutputKind::Jfr);

        assert!(session.stop().is_ok());
        assert_eq!(backend.stop_count(), 0);
    }

    #[test]
    fn test_failed_start_leaves_session_stopped() {
        let backend = Arc::new(RecordingBackend::new());
        backend.set_fail_start(true);
        let mut session = session(&backend, OutputKind::Jfr);

        assert!(session.start().is_err());
        assert!(!session.is_started());
        // Stopping a session that never started does not reach the backend
        assert!(session.stop().is_ok());
        assert_eq!(backend.stop_count(), 0);
    }

    #[test]
    fn test_failed_stop_clears_started_flag() {
        let backend = Arc::new(RecordingBackend::new());
        let mut session = session(&backend, OutputKind::Jfr);

        session.start().unwrap();
        backend.set_fail_stop(true);

        let err = session.stop().unwrap_err();
        assert!(err.is_backend());
        assert!(!session.is_started());

        // A second stop is a no-op rather than a second failing directive
        assert!(session.stop().is_ok());
        assert_eq!(backend.stop_count(), 1);
    }

    #[test]
    fn test_debug_names_backend() {
        let backend = Arc::new(RecordingBackend::new());
        let session = session(&backend, OutputKind::Jfr);
        let debug = format!("{:?}", session);

        assert!(debug.contains("recording"));
        assert!(debug.contains("started: false"));
    }
}
