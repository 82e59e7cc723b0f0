use std::process::ExitCode;

use engine::{run_app, RunReport};
use serde::Serialize;
use tracing::{error, info};
use village::RunSummary;

use super::bootstrap::AppWiring;

#[derive(Debug, Serialize)]
struct RunOutput {
    run: RunReport,
    village: RunSummary,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        mut scene,
        summary_json,
    } = app;

    let report = match run_app(config, &mut scene) {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    let summary = scene.summary();
    info!(
        ticks = report.ticks,
        stop_reason = ?report.stop_reason,
        status = ?summary.status,
        elapsed_seconds = summary.elapsed_seconds,
        defenses = summary.counters.defenses,
        sparkles = summary.counters.sparkles,
        "run_finished"
    );

    if summary_json {
        let output = RunOutput {
            run: report,
            village: summary,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!(error = %err, "summary_serialize_failed");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
