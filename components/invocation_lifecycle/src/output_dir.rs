//! Output directory resolution for profiling artifacts

use profiling_types::{ProfilingError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Resolves the directory a workload's artifacts are written to
pub trait OutputDirResolver: Send + Sync {
    /// Return an existing, writable directory for a workload originating at `origin`
    fn resolve(&self, origin: Option<&Path>) -> Result<PathBuf>;
}

/// Places artifacts in a `profiling` directory next to the workload's origin
///
/// For a test binary at `target/debug/deps/suite-1a2b` artifacts land in
/// `target/debug/deps/../profiling`, i.e. beside the binary's directory.
/// Falls back to a fresh directory under the process temp dir when the origin
/// is unknown or the primary directory cannot be created.
#[derive(Debug, Clone)]
pub struct ProfilingDirResolver {
    dir_name: String,
    temp_root: PathBuf,
}

impl ProfilingDirResolver {
    /// Create a resolver using the `profiling` directory name
    pub fn new() -> Self {
        Self {
            dir_name: "profiling".to_string(),
            temp_root: std::env::temp_dir(),
        }
    }

    /// Use a different directory name next to the origin
    pub fn with_dir_name(mut self, name: impl Into<String>) -> Self {
        self.dir_name = name.into();
        self
    }

    /// Use a different root for the fallback directory
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = root.into();
        self
    }

    fn primary(&self, origin: Option<&Path>) -> Option<PathBuf> {
        // The origin is a file (binary); its containing directory's parent hosts the output
        let dir = origin?.parent().filter(|p| !p.as_os_str().is_empty())?;
        let base = dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(dir);
        Some(base.join(&self.dir_name))
    }

    fn fallback(&self) -> Result<PathBuf> {
        let dir = self
            .temp_root
            .join(format!("{}-{}", self.dir_name, Uuid::new_v4()));
        fs::create_dir_all(&dir).map_err(|source| ProfilingError::Resolution {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }
}

impl Default for ProfilingDirResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDirResolver for ProfilingDirResolver {
    fn resolve(&self, origin: Option<&Path>) -> Result<PathBuf> {
        let Some(dir) = self.primary(origin) else {
            debug!("No usable workload origin, using a temporary output directory");
            return self.fallback();
        };

        match fs::create_dir_all(&dir) {
            Ok(()) => Ok(dir),
            Err(e) => {
                warn!(
                    "Cannot create {} ({}), using a temporary output directory",
                    dir.display(),
                    e
                );
                self.fallback()
            }
        }
    }
}

/// Always writes artifacts to one configured directory
#[derive(Debug, Clone)]
pub struct FixedDirResolver {
    dir: PathBuf,
}

impl FixedDirResolver {
    /// Create a resolver for `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl OutputDirResolver for FixedDirResolver {
    fn resolve(&self, _origin: Option<&Path>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| ProfilingError::Resolution {
            path: self.dir.clone(),
            source,
        })?;
        Ok(self.dir.clone())
    }
}
