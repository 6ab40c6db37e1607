//! Debug bundle writer for inspecting a forecast run.
//!
//! Wire-level issues (unexpected schemas, masked rows in odd places, horizon
//! mismatches) are easiest to chase from a file, so `d` in the TUI and
//! post-mortems in general get a timestamped markdown snapshot of the run.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::ForecastConfig;
use crate::error::{AppError, ErrorKind};

pub fn write_debug_bundle(run: &RunOutput, config: &ForecastConfig) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir)
        .map_err(|e| AppError::new(ErrorKind::Config, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("stockcast_debug_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(ErrorKind::Config, format!("Failed to create debug file: {e}")))?;

    let mut out = String::new();
    out.push_str("# stockcast debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- horizon: {}\n", config.horizon.display_name()));
    out.push_str(&format!("- deployment: {}\n", run.target.deployment));
    out.push_str(&format!("- region: {}\n", run.target.region));
    out.push_str(&format!("- url: {}\n", run.target.invocation_url()));
    out.push_str(&format!(
        "- profile: encoding={}, weekend={}, truncation={:?}\n",
        config.profile.encoding.content_type(),
        config.profile.weekend_policy.display_name(),
        config.profile.horizon_truncation,
    ));

    match &run.history {
        Some(history) => {
            out.push_str("\n## History\n");
            out.push_str(&format!(
                "- rows: {} | dates: [{}, {}]\n",
                history.stats.n_rows, history.stats.first_date, history.stats.last_date
            ));
            out.push_str(&format!("- columns: {}\n", history.columns.join(", ")));
        }
        None => out.push_str("\n## History\n- inline JSON payload\n"),
    }

    if !run.row_errors.is_empty() {
        out.push_str("\n## Ingest row errors\n");
        for err in &run.row_errors {
            out.push_str(&format!("- line {}: {}\n", err.line, err.message));
        }
    }

    out.push_str("\n## Forecast\n");
    out.push_str("| # | Date | mean | p10 | p50 | p90 |\n");
    out.push_str("| - | - | - | - | - | - |\n");
    for row in &run.forecast.rows {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            row.ordinal, row.date, row.mean, row.p10, row.p50, row.p90
        ));
    }

    file.write_all(out.as_bytes())
        .map_err(|e| AppError::new(ErrorKind::Config, format!("Failed to write debug bundle: {e}")))?;

    Ok(path)
}
