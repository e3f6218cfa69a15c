//! LifecycleController implementation
//!
//! Entry point for hosts: plan a workload once, then call [`on_before`] and
//! [`on_after`] around every invocation, and [`finish`] when the sequence ends.
//!
//! [`on_before`]: LifecycleController::on_before
//! [`on_after`]: LifecycleController::on_after
//! [`finish`]: LifecycleController::finish

use profiler_session::{ProfilerBackend, ProfilerSession};
use profiling_types::{ProfilingConfig, Result, WorkloadId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::metadata::{resolve_config, MetadataProvider};
use crate::naming::DisplayNames;
use crate::output_dir::{OutputDirResolver, ProfilingDirResolver};
use crate::registry::WorkloadRegistry;
use crate::state::{AfterOutcome, BeforeOutcome, Phase};

/// Invocation sequence planned for one workload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationPlan {
    /// Total invocations the host must drive (`repeat + warmup`)
    pub invocation_count: u32,
    /// Display name generator for the sequence
    pub display_names: DisplayNames,
    /// Artifact written when the session stops
    pub output_path: PathBuf,
}

/// Drives profiler sessions from per-invocation before/after notifications
pub struct LifecycleController {
    /// Per-workload state
    registry: Arc<WorkloadRegistry>,
    /// Source of per-workload configuration
    metadata: Arc<dyn MetadataProvider>,
    /// Backend shared by all sessions
    backend: Arc<dyn ProfilerBackend>,
    /// Artifact directory resolution
    output_dir: Arc<dyn OutputDirResolver>,
}

impl LifecycleController {
    /// Create a controller with its own registry and the default output directory policy
    pub fn new(metadata: Arc<dyn MetadataProvider>, backend: Arc<dyn ProfilerBackend>) -> Self {
        Self {
            registry: Arc::new(WorkloadRegistry::new()),
            metadata,
            backend,
            output_dir: Arc::new(ProfilingDirResolver::new()),
        }
    }

    /// Use a different output directory resolver
    pub fn with_output_dir(mut self, resolver: Arc<dyn OutputDirResolver>) -> Self {
        self.output_dir = resolver;
        self
    }

    /// Share an existing registry
    pub fn with_registry(mut self, registry: Arc<WorkloadRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Registry holding the planned workloads
    pub fn registry(&self) -> &Arc<WorkloadRegistry> {
        &self.registry
    }

    /// Plan `id` from its metadata
    ///
    /// Returns `Ok(None)` for unconfigured workloads; no state is created and
    /// every later hook for them is a no-op. `origin` locates the workload
    /// (usually the running executable) for output directory resolution.
    pub fn plan(&self, id: &WorkloadId, origin: Option<&Path>) -> Result<Option<InvocationPlan>> {
        let Some(metadata) = self.metadata.metadata(id) else {
            debug!("{} is not configured for profiling", id);
            return Ok(None);
        };

        self.plan_with_config(id, resolve_config(Some(&metadata)), origin)
            .map(Some)
    }

    /// Plan `id` with an already resolved config
    pub fn plan_with_config(
        &self,
        id: &WorkloadId,
        config: ProfilingConfig,
        origin: Option<&Path>,
    ) -> Result<InvocationPlan> {
        let dir = self.output_dir.resolve(origin)?;
        let session = ProfilerSession::new(self.backend.clone(), &config, dir.join(id.to_string()));
        let output_path = session.output_path().to_path_buf();
        info!("File: {}", output_path.display());

        let display_names = DisplayNames::new(config.repeat(), config.warmup());
        if let Some(previous) = self.registry.lookup(id) {
            if previous.is_session_started() {
                warn!("Re-planning {} while its profiler session is running; stopping it", id);
                if let Err(e) = previous.stop_if_started() {
                    warn!("Stopping previous profiler session of {} failed: {}", id, e);
                }
            }
        }
        let invocation_count = self.registry.plan(id.clone(), config, session);

        Ok(InvocationPlan {
            invocation_count,
            display_names,
            output_path,
        })
    }

    /// Notify that an invocation of `id` is about to run
    pub fn on_before(&self, id: &WorkloadId) -> Result<BeforeOutcome> {
        match self.registry.lookup(id) {
            Some(state) => state.before(),
            None => Ok(BeforeOutcome::Unconfigured),
        }
    }

    /// Notify that an invocation of `id` has finished
    pub fn on_after(&self, id: &WorkloadId) -> Result<AfterOutcome> {
        match self.registry.lookup(id) {
            Some(state) => state.after(),
            None => Ok(AfterOutcome::Unconfigured),
        }
    }

    /// Release the state of `id` once its sequence is over
    ///
    /// A session still running (the host stopped early) is stopped here and
    /// any backend error is returned.
    pub fn finish(&self, id: &WorkloadId) -> Result<()> {
        let Some(state) = self.registry.release(id) else {
            return Ok(());
        };

        if state.is_session_started() {
            warn!(
                "{} finished after {} of {} profiling invocations; stopping profiler",
                id,
                state.profiling_count(),
                state.config().repeat()
            );
            state.stop_if_started()?;
        }
        Ok(())
    }

    /// Current phase of `id`, if planned
    pub fn phase(&self, id: &WorkloadId) -> Option<Phase> {
        self.registry.lookup(id).map(|state| state.phase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ProfilingMetadata, StaticMetadata};
    use crate::output_dir::FixedDirResolver;
    use profiler_session::RecordingBackend;

    fn controller(
        metadata: StaticMetadata,
    ) -> (Arc<RecordingBackend>, LifecycleController) {
        let backend = Arc::new(RecordingBackend::new());
        let dir = std::env::temp_dir().join(format!("controller-{}", uuid::Uuid::new_v4()));
        let controller = LifecycleController::new(Arc::new(metadata), backend.clone())
            .with_output_dir(Arc::new(FixedDirResolver::new(dir)));
        (backend, controller)
    }

    #[test]
    fn test_unconfigured_plan_is_none() {
        let (_, controller) = controller(StaticMetadata::new());
        let id = WorkloadId::new("Suite", "plain");

        assert!(controller.plan(&id, None).unwrap().is_none());
        assert!(controller.registry().is_empty());
        assert_eq!(controller.phase(&id), None);
    }

    #[test]
    fn test_plan_names_artifact_after_workload() {
        let id = WorkloadId::new("Suite", "profiled");
        let (_, controller) = controller(
            StaticMetadata::new().with_workload(
                id.clone(),
                ProfilingMetadata::default().with_event("cpu,lock").with_warmup(1),
            ),
        );

        let plan = controller.plan(&id, None).unwrap().unwrap();

        assert_eq!(plan.invocation_count, 2);
        assert!(plan
            .output_path
            .to_string_lossy()
            .ends_with("Suite.profiled_cpu_lock.jfr"));
        assert_eq!(plan.display_names.display_name(1), "Warmup invocation 1/1");
        assert_eq!(controller.phase(&id), Some(Phase::Idle));
    }

    #[test]
    fn test_finish_stops_dangling_session() {
        let id = WorkloadId::new("Suite", "aborted");
        let (backend, controller) = controller(
            StaticMetadata::new()
                .with_workload(id.clone(), ProfilingMetadata::default().with_repeat(3)),
        );

        controller.plan(&id, None).unwrap();
        controller.on_before(&id).unwrap();
        controller.on_after(&id).unwrap();

        controller.finish(&id).unwrap();
        assert_eq!(backend.stop_count(), 1);
        assert!(controller.registry().is_empty());
    }

    #[test]
    fn test_finish_unknown_workload_is_ok() {
        let (_, controller) = controller(StaticMetadata::new());
        assert!(controller.finish(&WorkloadId::new("", "nothing")).is_ok());
    }
}
