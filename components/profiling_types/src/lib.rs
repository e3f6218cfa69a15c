// Profiling configuration, workload identity, and error definitions
//
// Shared vocabulary for the profiled-runs components.

pub mod config;
pub mod errors;
pub mod workload;

// Re-export commonly used types
pub use config::{
    OutputKind, ProfilingConfig, ProfilingConfigBuilder, DEFAULT_EVENTS, DEFAULT_REPEAT,
    DEFAULT_WARMUP,
};
pub use errors::{ProfilingError, Result};
pub use workload::WorkloadId;
