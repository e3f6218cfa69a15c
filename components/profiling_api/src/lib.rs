//! Public API for profiled workload runs
//!
//! Wraps the lower-level `invocation_lifecycle` controller with a host
//! driver that plans a workload, runs its warm-up and profiled invocations,
//! and releases its state afterwards.
//!
//! # Example
//!
//! ```no_run
//! use invocation_lifecycle::{ProfilingMetadata, StaticMetadata};
//! use profiler_session::CommandBackend;
//! use profiling_api::{ProfiledRunner, RunnerConfig};
//! use profiling_types::WorkloadId;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let id = WorkloadId::new("service", "handle_request");
//!     let metadata = StaticMetadata::from_json_file("profiling.json")?;
//!     let backend = CommandBackend::new("asprof-agent");
//!
//!     let runner = ProfiledRunner::new(RunnerConfig::default(), Arc::new(metadata), Arc::new(backend));
//!     let report = runner
//!         .run_async(&id, |_invocation| async { Ok(()) })
//!         .await?;
//!
//!     println!("{} invocations", report.invocations.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod config;
mod runner;

pub use config::{RunnerConfig, RunnerConfigBuilder};
pub use runner::{Invocation, InvocationRecord, ProfiledRunner, RunReport};

// Re-export public types from the lower-level crates
pub use invocation_lifecycle::{AfterOutcome, BeforeOutcome, ProfilingMetadata, StaticMetadata};
pub use profiling_types::{OutputKind, ProfilingConfig, ProfilingError, WorkloadId};
