//! Display names for workload invocations

/// Label an invocation by its 1-based position in the `repeat + warmup` sequence
///
/// Indexes up to `warmup` are warm-up invocations; the rest are numbered
/// from 1 within the profiling phase. The profiling numerator is display
/// text only and may exceed `repeat`.
///
/// # Example
///
/// ```
/// use invocation_lifecycle::invocation_display_name;
///
/// assert_eq!(invocation_display_name(2, 1, 1), "Warmup invocation 1/1");
/// assert_eq!(invocation_display_name(2, 1, 2), "Profiling invocation 1/2");
/// ```
pub fn invocation_display_name(repeat: u32, warmup: u32, index: u32) -> String {
    if index <= warmup {
        format!("Warmup invocation {}/{}", index, warmup)
    } else {
        format!("Profiling invocation {}/{}", index - warmup, repeat)
    }
}

/// Display-name generator handed to the host for one planned workload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayNames {
    repeat: u32,
    warmup: u32,
}

impl DisplayNames {
    /// Create a generator for the given counts
    pub fn new(repeat: u32, warmup: u32) -> Self {
        Self { repeat, warmup }
    }

    /// Name of the invocation at the 1-based `index`
    pub fn display_name(&self, index: u32) -> String {
        invocation_display_name(self.repeat, self.warmup, index)
    }

    /// Whether the invocation at `index` is a warm-up
    pub fn is_warmup(&self, index: u32) -> bool {
        index <= self.warmup
    }

    /// Names of the whole planned sequence
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        let total = self.repeat.saturating_add(self.warmup);
        (1..=total).map(move |index| self.display_name(index))
    }
}
