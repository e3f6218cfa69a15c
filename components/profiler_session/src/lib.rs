//! Profiling sessions and backends
//!
//! A [`ProfilerSession`] brackets one profiling run of a workload: it composes
//! the artifact path from the workload's base name, event list and output kind,
//! and issues start/stop directives to a [`ProfilerBackend`] at most once each.
//!
//! # Features
//!
//! - **ProfilerSession**: idempotent start/stop with output-path construction
//! - **CommandBackend**: drives an external profiler program per directive
//! - **RecordingBackend**: in-process backend that records directives and writes artifacts

mod backend;
mod directive;
mod recording_backend;
mod session;

pub use backend::{CommandBackend, ProfilerBackend};
pub use directive::{StartDirective, StopDirective};
pub use recording_backend::{BackendCall, RecordingBackend};
pub use session::{output_path, ProfilerSession};
