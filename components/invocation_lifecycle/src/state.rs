//! Per-workload lifecycle state
//!
//! Two monotonic counters decide every transition:
//!
//! - `warm_up_count` grows while it is below the configured warm-up;
//! - afterwards each before-call grows `profiling_count` instead.
//!
//! The session starts when `profiling_count` becomes 1 and stops on the
//! after-call that observes `profiling_count >= repeat`.

use parking_lot::Mutex;
use profiler_session::ProfilerSession;
use profiling_types::{ProfilingConfig, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::debug;

/// Lifecycle phase of a workload, derived from its counters and session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Planned, no invocation yet
    Idle,
    /// Running warm-up invocations
    Warmup,
    /// Profiler session running
    Profiling,
    /// Profiling invocations done, session stopped
    Done,
}

/// What a before-call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeforeOutcome {
    /// The workload is not configured for profiling
    Unconfigured,
    /// Warm-up invocation; profiler untouched
    WarmUp {
        /// 1-based warm-up iteration
        iteration: u32,
    },
    /// First profiling invocation; the session was started
    SessionStarted,
    /// Later profiling invocation; the session keeps running
    Profiling {
        /// 1-based profiling iteration
        iteration: u32,
    },
}

/// What an after-call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterOutcome {
    /// The workload is not configured for profiling
    Unconfigured,
    /// A warm-up invocation finished; profiler untouched
    WarmUp,
    /// A profiling invocation finished below the repeat threshold
    Continue {
        /// Profiling invocations completed so far
        profiled: u32,
    },
    /// The last profiling invocation finished; the session was stopped
    SessionStopped,
}

/// Counters, config and session of one planned workload
#[derive(Debug)]
pub struct LifecycleState {
    config: ProfilingConfig,
    warm_up_count: AtomicU32,
    profiling_count: AtomicU32,
    /// Set once the session has started successfully
    session_ran: AtomicBool,
    session: Mutex<ProfilerSession>,
}

impl LifecycleState {
    /// Create fresh state for a planned workload
    pub fn new(config: ProfilingConfig, session: ProfilerSession) -> Self {
        Self {
            config,
            warm_up_count: AtomicU32::new(0),
            profiling_count: AtomicU32::new(0),
            session_ran: AtomicBool::new(false),
            session: Mutex::new(session),
        }
    }

    /// Resolved configuration
    pub fn config(&self) -> &ProfilingConfig {
        &self.config
    }

    /// Warm-up invocations begun so far
    pub fn warm_up_count(&self) -> u32 {
        self.warm_up_count.load(Ordering::SeqCst)
    }

    /// Profiling invocations begun so far
    pub fn profiling_count(&self) -> u32 {
        self.profiling_count.load(Ordering::SeqCst)
    }

    /// Whether the profiler session is running
    pub fn is_session_started(&self) -> bool {
        self.session.lock().is_started()
    }

    /// Artifact path of the session
    pub fn output_path(&self) -> PathBuf {
        self.session.lock().output_path().to_path_buf()
    }

    /// Current phase
    ///
    /// A workload whose session never started successfully has not left
    /// the warm-up side of the lifecycle: it reports `Warmup` after warm-up
    /// invocations and `Idle` otherwise.
    pub fn phase(&self) -> Phase {
        if self.is_session_started() {
            Phase::Profiling
        } else if self.session_ran.load(Ordering::SeqCst) {
            Phase::Done
        } else if self.warm_up_count() == 0 {
            Phase::Idle
        } else {
            Phase::Warmup
        }
    }

    /// Account for an invocation about to run
    ///
    /// Counters move before the backend is contacted, so a failed start
    /// still counts the invocation.
    pub fn before(&self) -> Result<BeforeOutcome> {
        if self.warm_up_count.load(Ordering::SeqCst) < self.config.warmup() {
            let iteration = self.warm_up_count.fetch_add(1, Ordering::SeqCst) + 1;
            debug!("Warm-up iteration {}", iteration);
            return Ok(BeforeOutcome::WarmUp { iteration });
        }

        let iteration = self.profiling_count.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Profiling iteration {}", iteration);
        if iteration == 1 {
            self.session.lock().start()?;
            self.session_ran.store(true, Ordering::SeqCst);
            return Ok(BeforeOutcome::SessionStarted);
        }
        Ok(BeforeOutcome::Profiling { iteration })
    }

    /// Account for an invocation that just finished
    pub fn after(&self) -> Result<AfterOutcome> {
        let profiled = self.profiling_count();

        // Warm-ups all precede the first profiling invocation
        if profiled == 0 {
            return Ok(AfterOutcome::WarmUp);
        }

        if profiled < self.config.repeat() {
            return Ok(AfterOutcome::Continue { profiled });
        }

        let mut session = self.session.lock();
        if !session.is_started() {
            return Ok(AfterOutcome::Continue { profiled });
        }
        session.stop()?;
        Ok(AfterOutcome::SessionStopped)
    }

    /// Stop the session if it is still running; returns whether it was
    pub fn stop_if_started(&self) -> Result<bool> {
        let mut session = self.session.lock();
        if !session.is_started() {
            return Ok(false);
        }
        session.stop()?;
        Ok(true)
    }
}
