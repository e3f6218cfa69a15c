//! Per-workload profiling configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ProfilingError;

/// Events recorded when a workload does not name its own
pub const DEFAULT_EVENTS: &str = "cpu,alloc,lock";

/// Profiling invocations run when a workload does not set a repeat count
pub const DEFAULT_REPEAT: u32 = 1;

/// Warm-up invocations run when a workload does not set a warm-up count
pub const DEFAULT_WARMUP: u32 = 0;

/// Kind of artifact the profiling backend produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Structured recording (Java Flight Recorder format)
    #[default]
    #[serde(alias = "JFR")]
    Jfr,
    /// Self-contained HTML flame graph
    #[serde(alias = "FLAME")]
    Flame,
}

impl OutputKind {
    /// File extension of artifacts of this kind
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jfr => "jfr",
            Self::Flame => "html",
        }
    }

    /// Whether the backend records in the structured format
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Jfr)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jfr => write!(f, "jfr"),
            Self::Flame => write!(f, "flame"),
        }
    }
}

impl FromStr for OutputKind {
    type Err = ProfilingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jfr" => Ok(Self::Jfr),
            "flame" => Ok(Self::Flame),
            other => Err(ProfilingError::InvalidConfiguration(format!(
                "unknown output kind '{}'",
                other
            ))),
        }
    }
}

/// Fully resolved profiling configuration of one workload
///
/// Immutable once built. Use [`ProfilingConfig::builder`] to override
/// individual fields; anything left unset keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilingConfig {
    /// Comma-joined profiling event identifiers
    events: String,

    /// Artifact kind
    output_kind: OutputKind,

    /// Number of profiled invocations
    repeat: u32,

    /// Number of warm-up invocations preceding the profiled ones
    warmup: u32,
}

impl ProfilingConfig {
    /// Create a new builder for ProfilingConfig
    ///
    /// # Example
    ///
    /// ```
    /// use profiling_types::{OutputKind, ProfilingConfig};
    ///
    /// let config = ProfilingConfig::builder()
    ///     .events("cpu")
    ///     .output_kind(OutputKind::Flame)
    ///     .repeat(5)
    ///     .warmup(2)
    ///     .build();
    ///
    /// assert_eq!(config.invocation_count(), 7);
    /// ```
    pub fn builder() -> ProfilingConfigBuilder {
        ProfilingConfigBuilder::default()
    }

    /// Comma-joined event identifiers, as handed to the backend
    pub fn events(&self) -> &str {
        &self.events
    }

    /// Event identifiers in their configured order
    pub fn event_list(&self) -> Vec<&str> {
        self.events
            .split(',')
            .map(str::trim)
            .filter(|event| !event.is_empty())
            .collect()
    }

    /// Get the artifact kind
    pub fn output_kind(&self) -> OutputKind {
        self.output_kind
    }

    /// Get the number of profiled invocations
    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    /// Get the number of warm-up invocations
    pub fn warmup(&self) -> u32 {
        self.warmup
    }

    /// Total invocations the host has to drive: `repeat + warmup`
    pub fn invocation_count(&self) -> u32 {
        self.repeat.saturating_add(self.warmup)
    }
}

impl Default for ProfilingConfig {
    /// Default values:
    /// - events: "cpu,alloc,lock"
    /// - output_kind: Jfr
    /// - repeat: 1
    /// - warmup: 0
    fn default() -> Self {
        Self {
            events: DEFAULT_EVENTS.to_string(),
            output_kind: OutputKind::default(),
            repeat: DEFAULT_REPEAT,
            warmup: DEFAULT_WARMUP,
        }
    }
}

/// Builder for ProfilingConfig
#[derive(Debug, Clone, Default)]
pub struct ProfilingConfigBuilder {
    events: Option<String>,
    output_kind: Option<OutputKind>,
    repeat: Option<u32>,
    warmup: Option<u32>,
}

impl ProfilingConfigBuilder {
    /// Set the comma-joined event list (e.g. "cpu,lock")
    pub fn events(mut self, events: impl Into<String>) -> Self {
        self.events = Some(events.into());
        self
    }

    /// Set the artifact kind
    pub fn output_kind(mut self, kind: OutputKind) -> Self {
        self.output_kind = Some(kind);
        self
    }

    /// Set the number of profiled invocations
    pub fn repeat(mut self, repeat: u32) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// Set the number of warm-up invocations
    pub fn warmup(mut self, warmup: u32) -> Self {
        self.warmup = Some(warmup);
        self
    }

    /// Build the ProfilingConfig
    ///
    /// Uses default values for any options not explicitly set.
    pub fn build(self) -> ProfilingConfig {
        let default = ProfilingConfig::default();

        ProfilingConfig {
            events: self.events.unwrap_or(default.events),
            output_kind: self.output_kind.unwrap_or(default.output_kind),
            repeat: self.repeat.unwrap_or(default.repeat),
            warmup: self.warmup.unwrap_or(default.warmup),
        }
    }
}
