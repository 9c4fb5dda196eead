//! Where flows report what they saw.
//!
//! Observations are human-readable lines, not a parseable interface. They
//! are kept apart from diagnostic `tracing` output so a flow's visible
//! results can go to stdout while diagnostics go to stderr.

use std::sync::Mutex;

pub trait ObservationSink: Sync {
    fn observe(&self, line: &str);
}

impl<S: ObservationSink + ?Sized> ObservationSink for &S {
    fn observe(&self, line: &str) {
        (**self).observe(line)
    }
}

/// Prints each observation on its own line to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ObservationSink for ConsoleSink {
    fn observe(&self, line: &str) {
        println!("{line}");
    }
}

/// Emits each observation as an info event on the `ckan_flows::observation` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ObservationSink for TracingSink {
    fn observe(&self, line: &str) {
        tracing::info!(target: "ckan_flows::observation", "{line}");
    }
}

/// Keeps observations in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }
}

impl ObservationSink for MemorySink {
    fn observe(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record<S: ObservationSink>(sink: S, line: &str) {
        sink.observe(line);
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        let as_dyn: &dyn ObservationSink = &sink;
        as_dyn.observe("first");
        record(&sink, "second");
        assert_eq!(sink.lines(), vec!["first", "second"]);
    }
}
