// Workload identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one profiled workload (function + owning module or type)
///
/// Only used to namespace lifecycle state and to name output artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkloadId {
    /// Owning module or type path (may be empty)
    pub owner: String,
    /// Workload function name
    pub name: String,
}

impl WorkloadId {
    /// Create a workload identity
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse a `owner.name` key; the last `.` separates owner from name
    pub fn from_key(key: &str) -> Self {
        match key.rsplit_once('.') {
            Some((owner, name)) => Self::new(owner, name),
            None => Self::new("", key),
        }
    }
}

impl fmt::Display for WorkloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.owner.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.owner, self.name)
        }
    }
}
