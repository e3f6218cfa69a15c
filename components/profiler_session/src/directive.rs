//! Start/stop directives sent to a profiling backend
//!
//! Command strings follow the async-profiler agent syntax so directives can be
//! forwarded verbatim to tools that understand it.

use profiling_types::OutputKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directive asking the backend to begin recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDirective {
    /// Comma-joined event identifiers
    pub events: String,
    /// Artifact kind
    pub output_kind: OutputKind,
    /// Where the backend writes the artifact
    pub output_path: PathBuf,
}

impl StartDirective {
    /// Render as an agent command, e.g.
    /// `start,jfr,event=cpu,lock,jfrsync=profile,file=/out/x_cpu_lock.jfr`
    pub fn command(&self) -> String {
        if self.output_kind.is_structured() {
            format!(
                "start,jfr,event={},jfrsync=profile,file={}",
                self.events,
                self.output_path.display()
            )
        } else {
            format!(
                "start,event={},file={}",
                self.events,
                self.output_path.display()
            )
        }
    }

    /// The matching stop directive for the same artifact
    pub fn stop(&self) -> StopDirective {
        StopDirective {
            output_path: self.output_path.clone(),
        }
    }
}

/// Directive asking the backend to stop recording and write the artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDirective {
    /// Artifact path given to the matching start directive
    pub output_path: PathBuf,
}

impl StopDirective {
    /// Render as an agent command, e.g. `stop,file=/out/x_cpu_lock.jfr`
    pub fn command(&self) -> String {
        format!("stop,file={}", self.output_path.display())
    }
}
