//! Structured logging contract for conformance workflows.
//!
//! Provides:
//! - [`LogEntry`]: canonical JSONL log record with required + optional fields.
//! - [`LogEmitter`]: buffers entries as JSONL lines and flushes them to disk.
//! - [`validate_log_line`] / [`validate_log_file`]: schema validation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Scenario outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Error,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::Error => "error",
        };
        f.write_str(text)
    }
}

const LEVEL_VOCAB: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const OUTCOME_VOCAB: [&str; 3] = ["pass", "fail", "error"];

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`. The trace id
/// is `::`-separated so entries from different runs aggregate cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            scenario: None,
            outcome: None,
            errno: None,
            duration_ms: None,
            detail: None,
        }
    }

    /// Set the scenario name.
    #[must_use]
    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    /// Set the outcome.
    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Set the errno observed by the scenario, when one is part of the
    /// expected contract.
    #[must_use]
    pub fn with_errno(mut self, errno: i32) -> Self {
        self.errno = Some(errno);
        self
    }

    /// Set the wall-clock duration of the scenario.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Set a free-form detail string.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Buffers JSONL lines for a run and flushes them to a file.
#[derive(Debug, Default)]
pub struct LogEmitter {
    lines: Vec<String>,
}

impl LogEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry to the buffer.
    pub fn emit(&mut self, entry: &LogEntry) -> serde_json::Result<()> {
        self.lines.push(entry.to_jsonl()?);
        Ok(())
    }

    /// Buffered JSONL lines, in emission order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The full JSONL payload, newline-terminated.
    #[must_use]
    pub fn payload(&self) -> String {
        let mut payload = self.lines.join("\n");
        payload.push('\n');
        payload
    }

    /// Write the buffered lines to `path`.
    pub fn flush_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.payload())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a single JSONL line against the schema. Returns the list of
/// problems found, or `Ok(())` for a conforming line.
pub fn validate_log_line(line: &str, lineno: usize) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return Err(vec![format!("line {lineno}: not valid JSON: {e}")]),
    };

    for field in ["timestamp", "trace_id", "level", "event"] {
        match value.get(field) {
            Some(v) if v.is_string() => {}
            Some(_) => errors.push(format!("line {lineno}: field '{field}' must be a string")),
            None => errors.push(format!("line {lineno}: missing required field '{field}'")),
        }
    }

    if let Some(trace_id) = value.get("trace_id").and_then(|v| v.as_str())
        && !trace_id.contains("::")
    {
        errors.push(format!(
            "line {lineno}: trace_id '{trace_id}' lacks a '::' separator"
        ));
    }

    if let Some(level) = value.get("level").and_then(|v| v.as_str())
        && !LEVEL_VOCAB.contains(&level)
    {
        errors.push(format!("line {lineno}: unknown level '{level}'"));
    }

    if let Some(outcome) = value.get("outcome")
        && !outcome
            .as_str()
            .is_some_and(|o| OUTCOME_VOCAB.contains(&o))
    {
        errors.push(format!("line {lineno}: unknown outcome '{outcome}'"));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate an entire JSONL file. Returns the line count and all problems.
pub fn validate_log_file(path: &Path) -> std::io::Result<(usize, Vec<String>)> {
    let content = fs::read_to_string(path)?;
    let mut line_count = 0;
    let mut all_errors = Vec::new();

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        line_count += 1;
        if let Err(errs) = validate_log_line(line, i + 1) {
            all_errors.extend(errs);
        }
    }

    Ok((line_count, all_errors))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// UTC timestamp without an external date dependency, via the civil-date
/// algorithm over days since the epoch.
fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    let days = secs / 86_400;
    let (year, month, day) = civil_from_days(days as i64);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        year,
        month,
        day,
        (secs % 86_400) / 3_600,
        (secs % 3_600) / 60,
        secs % 60,
        millis,
    )
}

/// Gregorian date from days since 1970-01-01 (Howard Hinnant's algorithm).
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}
