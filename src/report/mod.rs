//! Reporting utilities: run summaries and forecast tables.

mod format;

pub use format::{format_endpoint_listing, format_forecast_table, format_run_summary};
