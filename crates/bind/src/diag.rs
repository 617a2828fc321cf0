//! Injected diagnostic sink.
//!
//! Components receive an `Arc<dyn DiagSink>` at construction instead of
//! looking up a process-global logger, so tests can substitute a
//! capturing sink. The default sink forwards to `tracing`.

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Destination for binding-layer diagnostics.
pub trait DiagSink {
    fn event(&self, level: DiagLevel, component: &str, message: &str);
}

/// Forwards diagnostics to the `tracing` ecosystem.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagSink for TracingSink {
    fn event(&self, level: DiagLevel, component: &str, message: &str) {
        match level {
            DiagLevel::Trace => tracing::trace!(component, "{message}"),
            DiagLevel::Debug => tracing::debug!(component, "{message}"),
            DiagLevel::Info => tracing::info!(component, "{message}"),
            DiagLevel::Warn => tracing::warn!(component, "{message}"),
            DiagLevel::Error => tracing::error!(component, "{message}"),
        }
    }
}

/// Discards all diagnostics.
#[derive(Debug, Default)]
pub struct NullSink;

impl DiagSink for NullSink {
    fn event(&self, _level: DiagLevel, _component: &str, _message: &str) {}
}

/// Records diagnostics for assertions in tests.
#[derive(Debug, Default)]
pub struct CaptureSink {
    events: Mutex<Vec<(DiagLevel, String, String)>>,
}

impl CaptureSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<(DiagLevel, String, String)> {
        self.events.lock().expect("capture sink lock").clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.events()
            .iter()
            .any(|(_, _, message)| message.contains(needle))
    }
}

impl DiagSink for CaptureSink {
    fn event(&self, level: DiagLevel, component: &str, message: &str) {
        self.events
            .lock()
            .expect("capture sink lock")
            .push((level, component.to_string(), message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_sink_records_in_order() {
        let sink = CaptureSink::new();
        sink.event(DiagLevel::Debug, "registry", "first");
        sink.event(DiagLevel::Warn, "stream", "second");
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].2, "first");
        assert_eq!(events[1].0, DiagLevel::Warn);
        assert!(sink.contains("second"));
    }
}
