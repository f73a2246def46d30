//! Observability subsystem
//!
//! - Structured JSON logging
//! - Per-index counters
//! - Typed lifecycle events
//!
//! Observability is read-only: it never changes what an operation returns,
//! and a failed log write is silently dropped.
//!
//! ```ignore
//! use chronoweave::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ChainCreated, &[("namespace", "VW:KEY001:")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

/// Whether `event` would currently be written.
pub fn event_enabled(event: Event) -> bool {
    Logger::enabled(event.severity())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::IndexOpen);
        log_event(Event::BenchComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("data_dir", "/tmp/test")]);
    }

    #[test]
    fn test_trace_events_gated() {
        assert!(!event_enabled(Event::AppendCommit));
        assert!(event_enabled(Event::CorruptionDetected));
    }
}
