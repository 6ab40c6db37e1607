//! Shared forecast pipeline used by both the CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load payload -> resolve endpoint -> serialize -> invoke -> parse -> post-process
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! A failed step abandons the run outright; no partial forecast escapes.

use log::info;

use crate::data::{EndpointTarget, RuntimeClient, resolve};
use crate::domain::{ForecastConfig, ForecastResult, HistoryData, HistorySource};
use crate::error::AppError;
use crate::forecast::request::RequestPayload;
use crate::forecast::{post, request, response};
use crate::io::history::{RowError, load_history};
use crate::io::input::parse_inline_payload;

/// All computed outputs of a single forecast run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// The loaded table; `None` when the payload was inline JSON.
    pub history: Option<HistoryData>,
    /// Row-level problems from history ingest (empty for inline payloads).
    pub row_errors: Vec<RowError>,
    pub target: EndpointTarget,
    pub forecast: ForecastResult,
}

enum LoadedPayload {
    Table(HistoryData, Vec<RowError>),
    Inline(serde_json::Value),
}

/// Execute the full pipeline, creating a client from the environment.
pub fn run_forecast(config: &ForecastConfig) -> Result<RunOutput, AppError> {
    let client = RuntimeClient::from_env()?;
    run_forecast_with_client(&client, config)
}

/// Execute the pipeline with an existing client.
///
/// This is what the TUI uses so repeated predictions don't re-read the
/// environment.
pub fn run_forecast_with_client(
    client: &RuntimeClient,
    config: &ForecastConfig,
) -> Result<RunOutput, AppError> {
    // 1) Load (and validate) the payload before anything touches the network.
    let loaded = load_payload(&config.source)?;

    // 2) Resolve the deployment for the selected horizon.
    let target = resolve(config.horizon, client.region());

    // 3) Serialize into the deployment's wire encoding.
    let encoded = match &loaded {
        LoadedPayload::Table(history, _) => {
            request::serialize(&RequestPayload::Table(history), config.profile.encoding)?
        }
        LoadedPayload::Inline(value) => {
            request::serialize(&RequestPayload::Inline(value), config.profile.encoding)?
        }
    };

    info!(
        "invoking {} ({} horizon, {} body)",
        target.deployment,
        config.horizon.display_name(),
        config.profile.encoding.content_type()
    );

    // 4) Single blocking invocation; 5) decode; 6) post-process.
    let raw = client.invoke(&target, &encoded)?;
    let rows = response::parse(&raw)?;
    let forecast = post::apply(rows, config.horizon, &config.profile)?;

    let (history, row_errors) = match loaded {
        LoadedPayload::Table(history, row_errors) => (Some(history), row_errors),
        LoadedPayload::Inline(_) => (None, Vec::new()),
    };

    Ok(RunOutput {
        history,
        row_errors,
        target,
        forecast,
    })
}

fn load_payload(source: &HistorySource) -> Result<LoadedPayload, AppError> {
    match source {
        HistorySource::File(path) => {
            let ingested = load_history(path)?;
            Ok(LoadedPayload::Table(ingested.data, ingested.row_errors))
        }
        HistorySource::Inline(raw) => Ok(LoadedPayload::Inline(parse_inline_payload(raw)?)),
        HistorySource::Sample { seed, days } => {
            let history = crate::data::generate_history(*seed, *days, 100.0)?;
            Ok(LoadedPayload::Table(history, Vec::new()))
        }
    }
}
