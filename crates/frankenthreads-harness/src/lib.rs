//! # frankenthreads-harness
//!
//! Conformance harness for the frankenthreads compatibility layer.
//!
//! The adapter itself performs no logging, so observable evidence lives
//! here: named scenarios exercise the mutex, condition variable, thread,
//! and clock surfaces end to end; each run emits a structured JSONL log and
//! a JSON report whose SHA-256 digest ties the two artifacts together.

pub mod runner;
pub mod scenarios;
pub mod structured_log;

pub use runner::{
    HarnessError, RunReport, ScenarioReport, run_scenarios, sha256_hex, write_artifacts,
};
pub use scenarios::{Scenario, all_scenarios};
pub use structured_log::{
    LogEmitter, LogEntry, LogLevel, Outcome, validate_log_file, validate_log_line,
};
