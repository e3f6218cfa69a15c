//! Per-workload profiling metadata and its resolution into a config
//!
//! A workload is profiled only when its [`MetadataProvider`] returns a record
//! for it. Fields missing from the record fall back to the defaults in
//! [`profiling_types::ProfilingConfig`].

use dashmap::DashMap;
use profiling_types::{OutputKind, ProfilingConfig, ProfilingError, Result, WorkloadId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Partial profiling settings attached to a workload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilingMetadata {
    /// Comma-joined event identifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Artifact kind
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<OutputKind>,
    /// Profiled invocation count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u32>,
    /// Warm-up invocation count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<u32>,
}

impl ProfilingMetadata {
    /// Set the event list
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Set the artifact kind
    pub fn with_kind(mut self, kind: OutputKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the profiled invocation count
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// Set the warm-up invocation count
    pub fn with_warmup(mut self, warmup: u32) -> Self {
        self.warmup = Some(warmup);
        self
    }

    fn validate(&self, key: &str) -> Result<()> {
        if let Some(event) = &self.event {
            if event.split(',').all(|e| e.trim().is_empty()) {
                return Err(ProfilingError::InvalidConfiguration(format!(
                    "workload '{}' has an empty event list",
                    key
                )));
            }
        }
        Ok(())
    }
}

/// Fill every field absent from `metadata` with its default
pub fn resolve_config(metadata: Option<&ProfilingMetadata>) -> ProfilingConfig {
    let mut builder = ProfilingConfig::builder();
    if let Some(metadata) = metadata {
        if let Some(event) = &metadata.event {
            builder = builder.events(event.clone());
        }
        if let Some(kind) = metadata.kind {
            builder = builder.output_kind(kind);
        }
        if let Some(repeat) = metadata.repeat {
            builder = builder.repeat(repeat);
        }
        if let Some(warmup) = metadata.warmup {
            builder = builder.warmup(warmup);
        }
    }
    builder.build()
}

/// Source of per-workload profiling metadata
///
/// `None` marks the workload as unconfigured: it is not profiled and the
/// lifecycle hooks ignore it.
pub trait MetadataProvider: Send + Sync {
    /// Metadata attached to `id`, if any
    fn metadata(&self, id: &WorkloadId) -> Option<ProfilingMetadata>;
}

impl<F> MetadataProvider for F
where
    F: Fn(&WorkloadId) -> Option<ProfilingMetadata> + Send + Sync,
{
    fn metadata(&self, id: &WorkloadId) -> Option<ProfilingMetadata> {
        self(id)
    }
}

/// Structured metadata document: `{"workloads": {"owner.name": {...}}}`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MetadataDocument {
    #[serde(default)]
    workloads: BTreeMap<String, ProfilingMetadata>,
}

/// In-memory metadata provider
///
/// Populated programmatically or from a JSON document.
#[derive(Debug, Default)]
pub struct StaticMetadata {
    entries: DashMap<WorkloadId, ProfilingMetadata>,
}

impl StaticMetadata {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a workload, builder style
    pub fn with_workload(self, id: WorkloadId, metadata: ProfilingMetadata) -> Self {
        self.insert(id, metadata);
        self
    }

    /// Add or replace a workload's metadata
    pub fn insert(&self, id: WorkloadId, metadata: ProfilingMetadata) {
        debug!("Registering profiling metadata for {}", id);
        self.entries.insert(id, metadata);
    }

    /// Remove a workload's metadata
    pub fn remove(&self, id: &WorkloadId) -> Option<ProfilingMetadata> {
        self.entries.remove(id).map(|(_, v)| v)
    }

    /// Number of configured workloads
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no workload is configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load from a JSON document
    ///
    /// # Example
    ///
    /// ```
    /// use invocation_lifecycle::{MetadataProvider, StaticMetadata};
    /// use profiling_types::WorkloadId;
    ///
    /// let metadata = StaticMetadata::from_json_str(
    ///     r#"{"workloads": {"suite.parse": {"repeat": 3, "warmup": 1}}}"#,
    /// ).unwrap();
    ///
    /// let entry = metadata.metadata(&WorkloadId::new("suite", "parse")).unwrap();
    /// assert_eq!(entry.repeat, Some(3));
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: MetadataDocument = serde_json::from_str(json)?;
        let provider = Self::new();
        for (key, metadata) in document.workloads {
            metadata.validate(&key)?;
            provider.insert(WorkloadId::from_key(&key), metadata);
        }
        Ok(provider)
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl MetadataProvider for StaticMetadata {
    fn metadata(&self, id: &WorkloadId) -> Option<ProfilingMetadata> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_without_metadata_uses_defaults() {
        let config = resolve_config(None);
        assert_eq!(config, ProfilingConfig::default());
    }

    #[test]
    fn test_resolve_empty_record_uses_defaults() {
        let config = resolve_config(Some(&ProfilingMetadata::default()));

        assert_eq!(config.events(), "cpu,alloc,lock");
        assert_eq!(config.output_kind(), OutputKind::Jfr);
        assert_eq!(config.repeat(), 1);
        assert_eq!(config.warmup(), 0);
    }

    #[test]
    fn test_resolve_partial_record() {
        let metadata = ProfilingMetadata::default().with_repeat(1).with_warmup(1);
        let config = resolve_config(Some(&metadata));

        assert_eq!(config.repeat(), 1);
        assert_eq!(config.warmup(), 1);
        assert_eq!(config.events(), "cpu,alloc,lock");
    }

    #[test]
    fn test_resolve_full_record() {
        let metadata = ProfilingMetadata::default()
            .with_event("wall")
            .with_kind(OutputKind::Flame)
            .with_repeat(10)
            .with_warmup(4);
        let config = resolve_config(Some(&metadata));

        assert_eq!(config.events(), "wall");
        assert_eq!(config.output_kind(), OutputKind::Flame);
        assert_eq!(config.invocation_count(), 14);
    }

    #[test]
    fn test_static_metadata_lookup() {
        let id = WorkloadId::new("suite", "profiled");
        let provider = StaticMetadata::new()
            .with_workload(id.clone(), ProfilingMetadata::default().with_warmup(1));

        assert_eq!(provider.len(), 1);
        assert!(provider.metadata(&id).is_some());
        assert!(provider
            .metadata(&WorkloadId::new("suite", "plain"))
            .is_none());
    }

    #[test]
    fn test_from_json_str() {
        let provider = StaticMetadata::from_json_str(
            r#"{
                "workloads": {
                    "bench.Suite.hot_loop": {"event": "cpu", "type": "FLAME", "repeat": 2},
                    "defaults": {}
                }
            }"#,
        )
        .unwrap();

        let hot = provider
            .metadata(&WorkloadId::new("bench.Suite", "hot_loop"))
            .unwrap();
        assert_eq!(hot.kind, Some(OutputKind::Flame));
        assert_eq!(hot.repeat, Some(2));
        assert_eq!(hot.warmup, None);

        let defaults = provider.metadata(&WorkloadId::new("", "defaults")).unwrap();
        assert_eq!(defaults, ProfilingMetadata::default());
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        let err = StaticMetadata::from_json_str(r#"{"workloads": {"a.b": {"repets": 2}}}"#)
            .unwrap_err();
        assert!(matches!(err, ProfilingError::Serialization(_)));
    }

    #[test]
    fn test_from_json_rejects_empty_events() {
        let err = StaticMetadata::from_json_str(r#"{"workloads": {"a.b": {"event": " , "}}}"#)
            .unwrap_err();
        assert!(matches!(err, ProfilingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_closure_provider() {
        let provider = |id: &WorkloadId| {
            (id.name == "profiled").then(|| ProfilingMetadata::default().with_repeat(3))
        };

        assert_eq!(
            provider
                .metadata(&WorkloadId::new("", "profiled"))
                .and_then(|m| m.repeat),
            Some(3)
        );
        assert!(provider.metadata(&WorkloadId::new("", "other")).is_none());
    }
}
