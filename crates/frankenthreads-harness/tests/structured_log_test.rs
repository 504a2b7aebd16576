//! Emitter round-trip and schema validation over a real file.

use std::path::PathBuf;

use frankenthreads_harness::{LogEmitter, LogEntry, LogLevel, Outcome, validate_log_file};

fn workspace_root() -> PathBuf {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest.parent().unwrap().parent().unwrap().to_path_buf()
}

#[test]
fn emitter_flush_roundtrips_through_validation() {
    let mut emitter = LogEmitter::new();
    emitter
        .emit(&LogEntry::new(
            "frankenthreads::smoke::001",
            LogLevel::Debug,
            "scenario_start",
        ))
        .unwrap();
    emitter
        .emit(
            &LogEntry::new("frankenthreads::smoke::001", LogLevel::Info, "scenario_end")
                .with_scenario("smoke")
                .with_outcome(Outcome::Pass)
                .with_duration_ms(1)
                .with_detail("synthetic entry"),
        )
        .unwrap();

    let path = workspace_root().join("target/conformance/structured_log_smoke.log.jsonl");
    emitter.flush_to(&path).expect("flush log");

    let (lines, errors) = validate_log_file(&path).expect("read log");
    assert_eq!(lines, 2);
    assert!(errors.is_empty(), "schema violations: {errors:?}");
}

#[test]
fn tampered_line_fails_validation() {
    let good = LogEntry::new("frankenthreads::smoke::002", LogLevel::Info, "scenario_end")
        .to_jsonl()
        .unwrap();
    let tampered = good.replace("\"info\"", "\"critical\"");

    let path = workspace_root().join("target/conformance/structured_log_tampered.log.jsonl");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, format!("{good}\n{tampered}\n")).unwrap();

    let (lines, errors) = validate_log_file(&path).expect("read log");
    assert_eq!(lines, 2);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("unknown level"));
}
