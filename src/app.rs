//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the run configuration
//! - drives the forecast pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, ForecastArgs};
use crate::domain::{DeploymentProfile, ForecastConfig, HistorySource};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `stockcast` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::init();

    // We want `stockcast` and `stockcast -t long` to behave like
    // `stockcast tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Tui(args) => crate::tui::run(args),
        Command::Endpoints => handle_endpoints(),
    }
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let source = match source_from_args(&args) {
        Some(source) => source,
        None => HistorySource::File(crate::cli::picker::prompt_for_history_path()?),
    };
    let config = forecast_config(&args, source);
    let run = pipeline::run_forecast(&config)?;

    for err in &run.row_errors {
        eprintln!("warning: history line {}: {}", err.line, err.message);
    }

    print!("{}", crate::report::format_run_summary(&run, &config));
    println!();
    print!(
        "{}",
        crate::report::format_forecast_table(&run.forecast, config.limit)
    );

    if config.plot {
        let plot =
            crate::plot::render_ascii_plot(&run.forecast, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if let Some(path) = &config.export_csv {
        crate::io::export::write_forecast_csv(path, &run.forecast)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_forecast_json(path, &run.forecast)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn handle_endpoints() -> Result<(), AppError> {
    let region = crate::data::runtime::region_from_env();
    print!("{}", crate::report::format_endpoint_listing(&region));
    Ok(())
}

/// Resolve an explicit history source from flags.
///
/// `None` means nothing was specified: the CLI falls back to the interactive
/// picker, the TUI to its demo series.
pub fn source_from_args(args: &ForecastArgs) -> Option<HistorySource> {
    if args.sample {
        Some(HistorySource::Sample {
            seed: args.seed,
            days: args.sample_days,
        })
    } else if let Some(data) = &args.data {
        Some(HistorySource::Inline(data.clone()))
    } else {
        args.file.clone().map(HistorySource::File)
    }
}

/// Build the run configuration from CLI flags plus a resolved source.
pub fn forecast_config(args: &ForecastArgs, source: HistorySource) -> ForecastConfig {
    let mut profile = DeploymentProfile::for_horizon(args.horizon);
    profile.encoding = args.encoding;
    profile.weekend_policy = args.weekend;

    ForecastConfig {
        source,
        horizon: args.horizon,
        profile,
        limit: if args.all { None } else { Some(args.limit) },
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

/// Rewrite argv so `stockcast` defaults to `stockcast tui`.
///
/// Rules:
/// - `stockcast`                     -> `stockcast tui`
/// - `stockcast -t long ...`         -> `stockcast tui -t long ...`
/// - `stockcast --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "forecast" | "tui" | "endpoints");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["stockcast"])), argv(&["stockcast", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["stockcast", "-t", "long"])),
            argv(&["stockcast", "tui", "-t", "long"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["stockcast", "forecast", "-f", "a.csv"])),
            argv(&["stockcast", "forecast", "-f", "a.csv"])
        );
        assert_eq!(
            rewrite_args(argv(&["stockcast", "--help"])),
            argv(&["stockcast", "--help"])
        );
    }
}
