//! Runs the full conformance suite and checks the emitted artifacts.

use std::path::PathBuf;

use frankenthreads_harness::{
    Outcome, run_scenarios, sha256_hex, validate_log_file, write_artifacts,
};

fn workspace_root() -> PathBuf {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest.parent().unwrap().parent().unwrap().to_path_buf()
}

#[test]
fn full_suite_passes_and_artifacts_validate() {
    let (mut report, emitter) = run_scenarios(None).expect("suite execution");
    let failing: Vec<_> = report
        .scenarios
        .iter()
        .filter(|s| s.outcome != Outcome::Pass)
        .map(|s| format!("{}: {:?}", s.name, s.detail))
        .collect();
    assert!(report.ok, "failing scenarios: {failing:?}");
    assert_eq!(report.passed, report.total);

    let out_dir = workspace_root().join("target/conformance");
    let report_path = write_artifacts(&mut report, &emitter, &out_dir).expect("artifact write");
    assert!(report_path.exists());

    let log_path = out_dir.join("threads_conformance.log.jsonl");
    let (lines, errors) = validate_log_file(&log_path).expect("read log artifact");
    assert!(errors.is_empty(), "schema violations: {errors:?}");
    // One start and one end line per scenario.
    assert_eq!(lines, report.total * 2);

    let payload = std::fs::read(&log_path).expect("reread log artifact");
    assert_eq!(
        report.log_sha256.as_deref(),
        Some(sha256_hex(&payload).as_str()),
        "report digest must match the log artifact"
    );
}

#[test]
fn filtered_run_executes_exactly_one_scenario() {
    let (report, emitter) = run_scenarios(Some("mutex_lock_roundtrip")).expect("filtered run");
    assert_eq!(report.total, 1);
    assert_eq!(report.scenarios[0].outcome, Outcome::Pass);
    assert_eq!(emitter.lines().len(), 2);
}
