//! Registry of per-workload lifecycle state

use dashmap::DashMap;
use profiler_session::ProfilerSession;
use profiling_types::{ProfilingConfig, WorkloadId};
use std::sync::Arc;
use tracing::debug;

use crate::state::LifecycleState;

/// Maps each planned workload to its isolated lifecycle state
///
/// Lookups and inserts for different workloads are safe from any thread.
/// State is handed out as `Arc` so no map shard stays locked while a backend
/// directive runs.
#[derive(Debug, Default)]
pub struct WorkloadRegistry {
    states: DashMap<WorkloadId, Arc<LifecycleState>>,
}

impl WorkloadRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the state of `id`; returns the invocation count to drive
    pub fn plan(&self, id: WorkloadId, config: ProfilingConfig, session: ProfilerSession) -> u32 {
        let count = config.invocation_count();
        debug!(
            "Planning {} ({} warm-up + {} profiling invocations)",
            id,
            config.warmup(),
            config.repeat()
        );
        self.states
            .insert(id, Arc::new(LifecycleState::new(config, session)));
        count
    }

    /// State of `id`, if planned
    pub fn lookup(&self, id: &WorkloadId) -> Option<Arc<LifecycleState>> {
        self.states.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Drop the state of `id`
    pub fn release(&self, id: &WorkloadId) -> Option<Arc<LifecycleState>> {
        debug!("Releasing lifecycle state of {}", id);
        self.states.remove(id).map(|(_, v)| v)
    }

    /// Whether `id` is planned
    pub fn contains(&self, id: &WorkloadId) -> bool {
        self.states.contains_key(id)
    }

    /// Number of planned workloads
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no workload is planned
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
