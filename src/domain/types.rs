//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the pipeline stages (serialize -> invoke -> parse -> post-process)
//! - exported to JSON/CSV
//! - rendered by both the CLI and the TUI without conversion

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Literal cell contents for a masked weekend row.
///
/// This exact string is what the presentation layer shows and what exports
/// write; the response parser also accepts it back in numeric columns so a
/// previously masked table round-trips.
pub const WEEKEND_MARKER: &str = "Weekend - Market is closed";

/// Forecast horizon selector.
///
/// The surrounding UI only ever offers these two values; everything else is a
/// caller contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    /// 7-day forecast.
    #[value(name = "short")]
    ShortTerm,
    /// Annual forecast (365 calendar rows).
    #[value(name = "long")]
    LongTerm,
}

impl Horizon {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Horizon::ShortTerm => "Short Term (7 days)",
            Horizon::LongTerm => "Long Term (Annually)",
        }
    }

    /// Number of forecast rows this horizon is expected to produce.
    pub fn horizon_len(self) -> usize {
        match self {
            Horizon::ShortTerm => 7,
            Horizon::LongTerm => 365,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Horizon::ShortTerm => Horizon::LongTerm,
            Horizon::LongTerm => Horizon::ShortTerm,
        }
    }
}

/// Wire encoding of the request body.
///
/// Fixed per deployment; not negotiated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    Json,
    Csv,
}

impl PayloadEncoding {
    pub fn content_type(self) -> &'static str {
        match self {
            PayloadEncoding::Json => "application/json",
            PayloadEncoding::Csv => "text/csv",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            PayloadEncoding::Json => PayloadEncoding::Csv,
            PayloadEncoding::Csv => PayloadEncoding::Json,
        }
    }
}

/// What to do with forecast rows that fall on a Saturday or Sunday.
///
/// Exactly one policy applies per deployment; Mask and Filter are never
/// combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeekendPolicy {
    /// Replace mean/p10/p50/p90 with the market-closed marker.
    Mask,
    /// Drop weekend rows from the result entirely.
    Filter,
    /// Leave weekend rows untouched.
    Keep,
}

impl WeekendPolicy {
    pub fn display_name(self) -> &'static str {
        match self {
            WeekendPolicy::Mask => "mask",
            WeekendPolicy::Filter => "filter",
            WeekendPolicy::Keep => "keep",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            WeekendPolicy::Mask => WeekendPolicy::Filter,
            WeekendPolicy::Filter => WeekendPolicy::Keep,
            WeekendPolicy::Keep => WeekendPolicy::Mask,
        }
    }
}

/// Per-deployment adapter parameters.
///
/// The hosted deployments differ only in wire encoding and weekend handling;
/// collapsing them into one value keeps a single adapter code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentProfile {
    pub encoding: PayloadEncoding,
    pub weekend_policy: WeekendPolicy,
    /// Keep only the first N response rows when set.
    pub horizon_truncation: Option<usize>,
}

impl DeploymentProfile {
    /// Default profile for a horizon: JSON body, weekend masking, and
    /// truncation to 365 rows for the annual deployment.
    pub fn for_horizon(horizon: Horizon) -> Self {
        Self {
            encoding: PayloadEncoding::Json,
            weekend_policy: WeekendPolicy::Mask,
            horizon_truncation: match horizon {
                Horizon::ShortTerm => None,
                Horizon::LongTerm => Some(horizon.horizon_len()),
            },
        }
    }
}

/// A single historical observation: trade date plus the numeric price fields.
///
/// Values are positionally aligned with `HistoryData::columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRecord {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

/// Summary stats about the loaded history (shown in run summaries and the TUI).
#[derive(Debug, Clone)]
pub struct HistoryStats {
    pub n_rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// The historical table: source of truth for a forecast request.
///
/// Immutable once loaded; each user action reads it, never rewrites it.
#[derive(Debug, Clone)]
pub struct HistoryData {
    /// Price column names, in file order, excluding the date column.
    pub columns: Vec<String>,
    pub records: Vec<HistoricalRecord>,
    pub stats: HistoryStats,
}

/// A forecast value cell: a number, or the market-closed marker after masking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Value(f64),
    MarketClosed,
}

impl Cell {
    pub fn as_value(self) -> Option<f64> {
        match self {
            Cell::Value(v) => Some(v),
            Cell::MarketClosed => None,
        }
    }

    pub fn is_market_closed(self) -> bool {
        matches!(self, Cell::MarketClosed)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Value(v) => write!(f, "{v:.2}"),
            Cell::MarketClosed => write!(f, "{WEEKEND_MARKER}"),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Value(v) => serializer.serialize_f64(*v),
            Cell::MarketClosed => serializer.serialize_str(WEEKEND_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Cell::Value(v)),
            Raw::Text(s) if s == WEEKEND_MARKER => Ok(Cell::MarketClosed),
            Raw::Text(s) => Err(de::Error::custom(format!(
                "expected a number or the weekend marker, got '{s}'"
            ))),
        }
    }
}

/// A forecast row as decoded off the wire, before post-processing.
///
/// The date stays a string here: normalization (including stripping a
/// time-of-day component) is a post-processing step, not a parsing one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseRow {
    #[serde(rename = "Date", alias = "date")]
    pub date: String,
    pub mean: Cell,
    pub p10: Cell,
    pub p50: Cell,
    pub p90: Cell,
}

/// A fully post-processed forecast row, ready for display and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    /// Display ordinal, 1-based.
    pub ordinal: usize,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    pub mean: Cell,
    pub p10: Cell,
    pub p50: Cell,
    pub p90: Cell,
}

/// Ordered forecast rows for one request/render cycle.
///
/// Nothing here persists beyond the cycle; a new user action builds a new one.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    pub horizon: Horizon,
    pub rows: Vec<ForecastRow>,
}

/// Where the historical table comes from.
#[derive(Debug, Clone)]
pub enum HistorySource {
    /// A local CSV with at least a Date column.
    File(PathBuf),
    /// Raw user-entered JSON text, validated before any network call.
    Inline(String),
    /// Deterministic synthetic demo series.
    Sample { seed: u64, days: usize },
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults) or the TUI settings panel.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub source: HistorySource,
    pub horizon: Horizon,
    pub profile: DeploymentProfile,

    /// Row cap for the printed table (full result still exported/charted).
    pub limit: Option<usize>,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
