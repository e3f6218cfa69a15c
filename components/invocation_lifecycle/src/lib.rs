//! Invocation lifecycle for profiled workloads
//!
//! Splits the repeated invocations of a workload into a warm-up phase and a
//! profiling phase, and brackets the profiling phase with exactly one
//! profiler session.
//!
//! ## Features
//!
//! - **LifecycleController**: before/after hooks driving the session at phase boundaries
//! - **WorkloadRegistry**: isolated per-workload state in a concurrent map
//! - **Naming**: display names for warm-up and profiling invocations
//! - **Metadata**: per-workload configuration with documented defaults
//! - **Output directories**: artifact directory resolution with temp-dir fallback

pub mod controller;
pub mod metadata;
pub mod naming;
pub mod output_dir;
pub mod registry;
pub mod state;

pub use controller::{InvocationPlan, LifecycleController};
pub use metadata::{resolve_config, MetadataProvider, ProfilingMetadata, StaticMetadata};
pub use naming::{invocation_display_name, DisplayNames};
pub use output_dir::{FixedDirResolver, OutputDirResolver, ProfilingDirResolver};
pub use registry::WorkloadRegistry;
pub use state::{AfterOutcome, BeforeOutcome, LifecycleState, Phase};
