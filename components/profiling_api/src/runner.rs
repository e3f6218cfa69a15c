//! Host driver for profiled workloads

use anyhow::Context;
use invocation_lifecycle::{
    AfterOutcome, BeforeOutcome, DisplayNames, FixedDirResolver, InvocationPlan,
    LifecycleController, MetadataProvider, ProfilingDirResolver,
};
use profiler_session::ProfilerBackend;
use profiling_types::WorkloadId;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::RunnerConfig;

/// One invocation handed to the workload body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// 1-based position in the planned sequence
    pub index: u32,
    /// Display name, e.g. "Warmup invocation 1/2"
    pub display_name: String,
    /// Whether this invocation is excluded from profiling
    pub warmup: bool,
}

impl Invocation {
    fn planned(index: u32, names: &DisplayNames) -> Self {
        Self {
            index,
            display_name: names.display_name(index),
            warmup: names.is_warmup(index),
        }
    }

    fn unprofiled(id: &WorkloadId) -> Self {
        Self {
            index: 1,
            display_name: id.to_string(),
            warmup: false,
        }
    }
}

/// Outcome of one driven invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRecord {
    /// The invocation as seen by the body
    pub invocation: Invocation,
    /// What the before hook did
    pub before: BeforeOutcome,
    /// What the after hook did
    pub after: AfterOutcome,
}

/// Summary of a driven workload
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The workload
    pub workload: WorkloadId,
    /// Artifact of the profiling session; `None` for unconfigured workloads
    pub output_path: Option<PathBuf>,
    /// Every invocation, in order
    pub invocations: Vec<InvocationRecord>,
}

impl RunReport {
    fn unprofiled(id: &WorkloadId, invocation: Invocation) -> Self {
        Self {
            workload: id.clone(),
            output_path: None,
            invocations: vec![InvocationRecord {
                invocation,
                before: BeforeOutcome::Unconfigured,
                after: AfterOutcome::Unconfigured,
            }],
        }
    }

    /// Whether the workload ran under the profiler
    pub fn is_profiled(&self) -> bool {
        self.output_path.is_some()
    }

    /// Number of warm-up invocations run
    pub fn warmup_count(&self) -> usize {
        self.invocations
            .iter()
            .filter(|record| record.invocation.warmup)
            .count()
    }

    /// Number of profiled invocations run
    pub fn profiled_count(&self) -> usize {
        self.invocations
            .iter()
            .filter(|record| {
                matches!(
                    record.before,
                    BeforeOutcome::SessionStarted | BeforeOutcome::Profiling { .. }
                )
            })
            .count()
    }
}

/// Runs workloads through their planned warm-up and profiling invocations
///
/// # Example
///
/// ```no_run
/// use invocation_lifecycle::{ProfilingMetadata, StaticMetadata};
/// use profiler_session::RecordingBackend;
/// use profiling_api::{ProfiledRunner, RunnerConfig};
/// use profiling_types::WorkloadId;
/// use std::sync::Arc;
///
/// # fn main() -> anyhow::Result<()> {
/// let id = WorkloadId::new("bench", "sort");
/// let metadata = StaticMetadata::new()
///     .with_workload(id.clone(), ProfilingMetadata::default().with_repeat(3).with_warmup(1));
///
/// let runner = ProfiledRunner::new(
///     RunnerConfig::default(),
///     Arc::new(metadata),
///     Arc::new(RecordingBackend::new()),
/// );
///
/// let report = runner.run(&id, |_invocation| {
///     let mut data: Vec<u32> = (0..10_000).rev().collect();
///     data.sort();
///     Ok(())
/// })?;
/// println!("profile written to {:?}", report.output_path);
/// # Ok(())
/// # }
/// ```
pub struct ProfiledRunner {
    controller: LifecycleController,
    config: RunnerConfig,
}

impl ProfiledRunner {
    /// Create a runner with its own lifecycle controller
    pub fn new(
        config: RunnerConfig,
        metadata: Arc<dyn MetadataProvider>,
        backend: Arc<dyn ProfilerBackend>,
    ) -> Self {
        let controller = LifecycleController::new(metadata, backend);
        let controller = match config.output_dir() {
            Some(dir) => controller.with_output_dir(Arc::new(FixedDirResolver::new(dir))),
            None => controller.with_output_dir(Arc::new(
                ProfilingDirResolver::new().with_dir_name(config.profiling_dir_name()),
            )),
        };
        Self { controller, config }
    }

    /// Create a runner around an existing controller
    pub fn from_controller(config: RunnerConfig, controller: LifecycleController) -> Self {
        Self { controller, config }
    }

    /// Get the runner configuration
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Get the lifecycle controller
    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }

    /// Drive `id` to completion with a synchronous body
    ///
    /// An unconfigured workload runs once without the profiler. If the body
    /// fails, the sequence stops, the session is stopped, and the body's
    /// error is returned.
    pub fn run<F>(&self, id: &WorkloadId, mut body: F) -> anyhow::Result<RunReport>
    where
        F: FnMut(Invocation) -> anyhow::Result<()>,
    {
        let Some(plan) = self.plan(id)? else {
            let invocation = Invocation::unprofiled(id);
            body(invocation.clone())?;
            return Ok(RunReport::unprofiled(id, invocation));
        };

        let mut invocations = Vec::new();
        let mut driven = || -> anyhow::Result<()> {
            for index in 1..=plan.invocation_count {
                let invocation = Invocation::planned(index, &plan.display_names);
                let before = self.controller.on_before(id)?;
                body(invocation.clone())
                    .with_context(|| format!("{} of {} failed", invocation.display_name, id))?;
                let after = self.controller.on_after(id)?;
                invocations.push(InvocationRecord {
                    invocation,
                    before,
                    after,
                });
            }
            Ok(())
        };
        let result = driven();

        self.complete(id, result)?;
        Ok(RunReport {
            workload: id.clone(),
            output_path: Some(plan.output_path),
            invocations,
        })
    }

    /// Drive `id` to completion with an asynchronous body
    ///
    /// Hooks stay synchronous; only the body is awaited.
    pub async fn run_async<F, Fut>(&self, id: &WorkloadId, mut body: F) -> anyhow::Result<RunReport>
    where
        F: FnMut(Invocation) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let Some(plan) = self.plan(id)? else {
            let invocation = Invocation::unprofiled(id);
            body(invocation.clone()).await?;
            return Ok(RunReport::unprofiled(id, invocation));
        };

        let mut invocations = Vec::new();
        let mut result: anyhow::Result<()> = Ok(());
        for index in 1..=plan.invocation_count {
            let invocation = Invocation::planned(index, &plan.display_names);
            let before = match self.controller.on_before(id) {
                Ok(before) => before,
                Err(e) => {
                    result = Err(e.into());
                    break;
                }
            };
            if let Err(e) = body(invocation.clone()).await {
                result = Err(e.context(format!("{} of {} failed", invocation.display_name, id)));
                break;
            }
            match self.controller.on_after(id) {
                Ok(after) => invocations.push(InvocationRecord {
                    invocation,
                    before,
                    after,
                }),
                Err(e) => {
                    result = Err(e.into());
                    break;
                }
            }
        }

        self.complete(id, result)?;
        Ok(RunReport {
            workload: id.clone(),
            output_path: Some(plan.output_path),
            invocations,
        })
    }

    fn plan(&self, id: &WorkloadId) -> anyhow::Result<Option<InvocationPlan>> {
        let origin = self.config.effective_origin();
        let plan = self
            .controller
            .plan(id, origin.as_deref())
            .with_context(|| format!("Cannot plan profiling of {}", id))?;

        match &plan {
            Some(plan) => debug!("{}: {} invocations planned", id, plan.invocation_count),
            None => debug!("{}: not profiled, running once", id),
        }
        Ok(plan)
    }

    /// Release the workload; the sequence's own error takes precedence
    fn complete(&self, id: &WorkloadId, result: anyhow::Result<()>) -> anyhow::Result<()> {
        let finished = self.controller.finish(id);
        match (result, finished) {
            (Err(e), Err(finish_err)) => {
                warn!("Stopping profiler for {} also failed: {}", id, finish_err);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), finished) => finished.map_err(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invocation_lifecycle::{ProfilingMetadata, StaticMetadata};
    use profiler_session::RecordingBackend;

    fn runner(id: &WorkloadId, metadata: ProfilingMetadata) -> (Arc<RecordingBackend>, ProfiledRunner) {
        let backend = Arc::new(RecordingBackend::new());
        let config = RunnerConfig::builder()
            .output_dir(std::env::temp_dir().join(format!("runner-{}", uuid::Uuid::new_v4())))
            .build();
        let provider = StaticMetadata::new().with_workload(id.clone(), metadata);
        (
            backend.clone(),
            ProfiledRunner::new(config, Arc::new(provider), backend),
        )
    }

    #[test]
    fn test_run_passes_display_names() {
        let id = WorkloadId::new("Suite", "named");
        let (_, runner) = runner(&id, ProfilingMetadata::default().with_repeat(2).with_warmup(1));

        let mut seen = Vec::new();
        runner
            .run(&id, |invocation| {
                seen.push(invocation.display_name);
                Ok(())
            })
            .unwrap();

        assert_eq!(
            seen,
            vec![
                "Warmup invocation 1/1",
                "Profiling invocation 1/2",
                "Profiling invocation 2/2",
            ]
        );
    }

    #[test]
    fn test_body_error_stops_session() {
        let id = WorkloadId::new("Suite", "failing");
        let (backend, runner) = runner(&id, ProfilingMetadata::default().with_repeat(3));

        let err = runner
            .run(&id, |invocation| {
                if invocation.index == 2 {
                    anyhow::bail!("assertion failed");
                }
                Ok(())
            })
            .unwrap_err();

        assert!(err.to_string().contains("Profiling invocation 2/3"));
        assert_eq!(backend.start_count(), 1);
        assert_eq!(backend.stop_count(), 1);
        assert!(runner.controller().registry().is_empty());
    }

    #[test]
    fn test_huge_repeat_does_not_reserve_up_front() {
        let id = WorkloadId::new("Suite", "endless");
        let (backend, runner) = runner(&id, ProfilingMetadata::default().with_repeat(u32::MAX));

        let err = runner
            .run(&id, |_| anyhow::bail!("stop after the first invocation"))
            .unwrap_err();

        assert!(err.to_string().contains("Profiling invocation 1/4294967295"));
        assert_eq!(backend.stop_count(), 1);
    }

    #[test]
    fn test_report_counts() {
        let id = WorkloadId::new("Suite", "counted");
        let (_, runner) = runner(&id, ProfilingMetadata::default().with_repeat(4).with_warmup(2));

        let report = runner.run(&id, |_| Ok(())).unwrap();

        assert!(report.is_profiled());
        assert_eq!(report.invocations.len(), 6);
        assert_eq!(report.warmup_count(), 2);
        assert_eq!(report.profiled_count(), 4);
    }
}
