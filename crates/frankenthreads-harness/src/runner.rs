//! Scenario execution engine and artifact emission.
//!
//! Runs the conformance suite (or a filtered slice of it), collects one
//! report per scenario, and writes the JSONL log plus a JSON report whose
//! SHA-256 digest ties the two artifacts together.

use std::fs;
use std::panic;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::scenarios::{Scenario, all_scenarios};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

/// Failures of the harness machinery itself (never of a scenario).
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
}

/// Result of one scenario run.
#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregated run report. The artifact fields are filled in by
/// [`write_artifacts`].
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub ok: bool,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_jsonl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_sha256: Option<String>,
    pub scenarios: Vec<ScenarioReport>,
}

/// Run the suite, optionally restricted to one named scenario.
pub fn run_scenarios(filter: Option<&str>) -> Result<(RunReport, LogEmitter), HarnessError> {
    let mut suite = all_scenarios();
    if let Some(name) = filter {
        suite.retain(|s| s.name == name);
        if suite.is_empty() {
            return Err(HarnessError::UnknownScenario(name.to_string()));
        }
    }

    let mut emitter = LogEmitter::new();
    let mut scenarios = Vec::with_capacity(suite.len());
    for scenario in &suite {
        scenarios.push(run_one(scenario, &mut emitter)?);
    }

    let passed = scenarios
        .iter()
        .filter(|r| r.outcome == Outcome::Pass)
        .count();
    let report = RunReport {
        ok: passed == scenarios.len(),
        total: scenarios.len(),
        passed,
        failed: scenarios.len() - passed,
        log_jsonl: None,
        log_sha256: None,
        scenarios,
    };
    Ok((report, emitter))
}

fn run_one(scenario: &Scenario, emitter: &mut LogEmitter) -> Result<ScenarioReport, HarnessError> {
    let trace_id = format!("frankenthreads::conformance::{}", scenario.name);
    emitter.emit(
        &LogEntry::new(&trace_id, LogLevel::Debug, "scenario_start").with_scenario(scenario.name),
    )?;

    let started = Instant::now();
    let result = panic::catch_unwind(scenario.run);
    let duration_ms = started.elapsed().as_millis() as u64;

    let (outcome, errno, detail, level) = match result {
        Ok(Ok(evidence)) => (Outcome::Pass, evidence.errno, evidence.detail, LogLevel::Info),
        Ok(Err(msg)) => (Outcome::Fail, None, Some(msg), LogLevel::Error),
        Err(_) => (
            Outcome::Error,
            None,
            Some("scenario panicked".to_string()),
            LogLevel::Error,
        ),
    };

    let mut entry = LogEntry::new(&trace_id, level, "scenario_end")
        .with_scenario(scenario.name)
        .with_outcome(outcome)
        .with_duration_ms(duration_ms);
    if let Some(code) = errno {
        entry = entry.with_errno(code);
    }
    if let Some(text) = &detail {
        entry = entry.with_detail(text.clone());
    }
    emitter.emit(&entry)?;

    Ok(ScenarioReport {
        name: scenario.name.to_string(),
        outcome,
        errno,
        duration_ms,
        detail,
    })
}

/// Write the JSONL log and JSON report under `out_dir`, recording the log's
/// path and SHA-256 digest in the report. Returns the report path.
pub fn write_artifacts(
    report: &mut RunReport,
    emitter: &LogEmitter,
    out_dir: &Path,
) -> Result<PathBuf, HarnessError> {
    fs::create_dir_all(out_dir)?;

    let log_path = out_dir.join("threads_conformance.log.jsonl");
    emitter.flush_to(&log_path)?;

    report.log_jsonl = Some(log_path.to_string_lossy().into_owned());
    report.log_sha256 = Some(sha256_hex(emitter.payload().as_bytes()));

    let report_path = out_dir.join("threads_conformance.report.json");
    fs::write(&report_path, serde_json::to_string_pretty(report)?)?;
    Ok(report_path)
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
