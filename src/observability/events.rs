//! Observable events
//!
//! Events are explicit and typed; the string form is what appears in the
//! `event` field of a log line.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,

    // Index lifecycle
    /// Index reopened from a persisted key directory
    IndexOpen,
    /// First append to a key created its chain
    ChainCreated,
    /// Chain restored from persisted metadata
    ChainReopened,

    // Write path
    /// Node and chain metadata written
    AppendCommit,
    /// Bridge pointer set on a node
    BridgeRecorded,
    /// Bridge write failed; the append stands without it
    BridgeFailed,

    // Read path
    /// Range scan ignored a bridge and descended from the chain head
    HintFallback,
    /// Stored record failed validation (FATAL)
    CorruptionDetected,

    // Benchmark
    BenchBegin,
    BenchRun,
    BenchComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::IndexOpen => "INDEX_OPEN",
            Event::ChainCreated => "CHAIN_CREATED",
            Event::ChainReopened => "CHAIN_REOPENED",
            Event::AppendCommit => "APPEND_COMMIT",
            Event::BridgeRecorded => "BRIDGE_RECORDED",
            Event::BridgeFailed => "BRIDGE_FAILED",
            Event::HintFallback => "HINT_FALLBACK",
            Event::CorruptionDetected => "CORRUPTION_DETECTED",
            Event::BenchBegin => "BENCH_BEGIN",
            Event::BenchRun => "BENCH_RUN",
            Event::BenchComplete => "BENCH_COMPLETE",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::CorruptionDetected)
    }

    /// Severity the event is logged at.
    pub fn severity(&self) -> Severity {
        match self {
            Event::CorruptionDetected => Severity::Fatal,
            Event::BridgeFailed => Severity::Warn,
            Event::AppendCommit
            | Event::BridgeRecorded
            | Event::HintFallback
            | Event::ChainReopened
            | Event::BenchRun => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
