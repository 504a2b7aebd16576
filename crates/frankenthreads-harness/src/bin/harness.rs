//! Conformance harness CLI.
//!
//! Runs the scenario suite (or one named scenario), prints a summary, and
//! writes the JSONL log and JSON report artifacts.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use frankenthreads_harness::{all_scenarios, run_scenarios, write_artifacts};

#[derive(Parser)]
#[command(
    name = "harness",
    about = "Runs the frankenthreads conformance scenario suite"
)]
struct Args {
    /// Run only the named scenario.
    #[arg(long)]
    scenario: Option<String>,

    /// List scenario names and exit.
    #[arg(long)]
    list: bool,

    /// Directory receiving the JSONL log and JSON report.
    #[arg(long, default_value = "target/conformance")]
    out_dir: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.list {
        for scenario in all_scenarios() {
            println!("{}", scenario.name);
        }
        return ExitCode::SUCCESS;
    }

    let (mut report, emitter) = match run_scenarios(args.scenario.as_deref()) {
        Ok(run) => run,
        Err(err) => {
            eprintln!("harness: {err}");
            return ExitCode::FAILURE;
        }
    };

    for scenario in &report.scenarios {
        println!(
            "{:<40} {:<5} ({}ms)",
            scenario.name, scenario.outcome, scenario.duration_ms
        );
    }

    match write_artifacts(&mut report, &emitter, &args.out_dir) {
        Ok(report_path) => println!("report: {}", report_path.display()),
        Err(err) => {
            eprintln!("harness: {err}");
            return ExitCode::FAILURE;
        }
    }

    println!("{}/{} scenarios passed", report.passed, report.total);
    if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
