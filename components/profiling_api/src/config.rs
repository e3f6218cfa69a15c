//! Configuration for the profiled runner

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for [`ProfiledRunner`](crate::ProfiledRunner)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Location of the workload code, used to place the output directory
    origin: Option<PathBuf>,

    /// Directory that receives every artifact, bypassing origin-based resolution
    output_dir: Option<PathBuf>,

    /// Name of the directory created next to the origin
    profiling_dir_name: String,
}

impl RunnerConfig {
    /// Create a new builder for RunnerConfig
    ///
    /// # Example
    ///
    /// ```
    /// use profiling_api::RunnerConfig;
    ///
    /// let config = RunnerConfig::builder()
    ///     .output_dir("/tmp/profiles")
    ///     .build();
    ///
    /// assert!(config.output_dir().is_some());
    /// ```
    pub fn builder() -> RunnerConfigBuilder {
        RunnerConfigBuilder::default()
    }

    /// Get the configured origin
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Origin used for resolution: the configured one, else the running executable
    pub fn effective_origin(&self) -> Option<PathBuf> {
        self.origin
            .clone()
            .or_else(|| std::env::current_exe().ok())
    }

    /// Get the output directory override
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Get the profiling directory name
    pub fn profiling_dir_name(&self) -> &str {
        &self.profiling_dir_name
    }
}

impl Default for RunnerConfig {
    /// Create a default configuration
    ///
    /// Default values:
    /// - origin: the running executable
    /// - output_dir: none (resolved next to the origin)
    /// - profiling_dir_name: "profiling"
    fn default() -> Self {
        Self {
            origin: None,
            output_dir: None,
            profiling_dir_name: "profiling".to_string(),
        }
    }
}

/// Builder for RunnerConfig
#[derive(Debug, Clone, Default)]
pub struct RunnerConfigBuilder {
    origin: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    profiling_dir_name: Option<String>,
}

impl RunnerConfigBuilder {
    /// Set the workload origin (a file; artifacts go beside its directory)
    pub fn origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Write every artifact into `dir`
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the profiling directory name
    pub fn profiling_dir_name(mut self, name: impl Into<String>) -> Self {
        self.profiling_dir_name = Some(name.into());
        self
    }

    /// Build the RunnerConfig
    ///
    /// Uses default values for any options not explicitly set.
    pub fn build(self) -> RunnerConfig {
        let default = RunnerConfig::default();

        RunnerConfig {
            origin: self.origin,
            output_dir: self.output_dir,
            profiling_dir_name: self
                .profiling_dir_name
                .unwrap_or(default.profiling_dir_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();

        assert!(config.origin().is_none());
        assert!(config.output_dir().is_none());
        assert_eq!(config.profiling_dir_name(), "profiling");
    }

    #[test]
    fn test_builder_all_options() {
        let config = RunnerConfig::builder()
            .origin("/work/target/debug/deps/suite")
            .output_dir("/tmp/profiles")
            .profiling_dir_name("flames")
            .build();

        assert_eq!(config.origin(), Some(Path::new("/work/target/debug/deps/suite")));
        assert_eq!(config.output_dir(), Some(Path::new("/tmp/profiles")));
        assert_eq!(config.profiling_dir_name(), "flames");
    }

    #[test]
    fn test_effective_origin_defaults_to_executable() {
        let config = RunnerConfig::default();
        assert_eq!(config.effective_origin(), std::env::current_exe().ok());

        let config = RunnerConfig::builder().origin("/bin/suite").build();
        assert_eq!(config.effective_origin(), Some(PathBuf::from("/bin/suite")));
    }
}
