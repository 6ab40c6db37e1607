//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::RunOutput;
use crate::data::resolve;
use crate::domain::{ForecastConfig, ForecastResult, Horizon};

/// Format the run summary: endpoint, profile, and input stats.
pub fn format_run_summary(run: &RunOutput, config: &ForecastConfig) -> String {
    let mut out = String::new();

    out.push_str("=== stockcast - Stock Price Forecast ===\n");
    out.push_str(&format!("Horizon: {}\n", config.horizon.display_name()));
    out.push_str(&format!(
        "Endpoint: {} ({})\n",
        run.target.deployment, run.target.region
    ));
    out.push_str(&format!(
        "Profile: encoding={} | weekend={} | truncation={}\n",
        config.profile.encoding.content_type(),
        config.profile.weekend_policy.display_name(),
        match config.profile.horizon_truncation {
            Some(n) => n.to_string(),
            None => "none".to_string(),
        }
    ));

    match &run.history {
        Some(history) => {
            out.push_str(&format!(
                "History: n={} | dates=[{}, {}] | columns=[{}]\n",
                history.stats.n_rows,
                history.stats.first_date,
                history.stats.last_date,
                history.columns.join(", ")
            ));
        }
        None => out.push_str("History: inline JSON payload\n"),
    }

    if !run.row_errors.is_empty() {
        out.push_str(&format!(
            "Warning: {} history row(s) skipped during ingest.\n",
            run.row_errors.len()
        ));
    }

    out.push_str(&format!("Forecast rows: {}\n", run.forecast.rows.len()));
    out
}

/// Format the forecast table, capped at `limit` rows when set.
pub fn format_forecast_table(result: &ForecastResult, limit: Option<usize>) -> String {
    let mut out = String::new();

    // Value columns widen to fit the weekend marker when any row is masked.
    let w = result
        .rows
        .iter()
        .flat_map(|r| [r.mean, r.p10, r.p50, r.p90])
        .map(|c| c.to_string().len())
        .max()
        .unwrap_or(8)
        .max(8);

    out.push_str(&format!(
        "{:>5}  {:<10}  {:>w$}  {:>w$}  {:>w$}  {:>w$}\n",
        "#", "Date", "mean", "p10", "p50", "p90"
    ));

    let shown = limit.unwrap_or(result.rows.len()).min(result.rows.len());
    for row in &result.rows[..shown] {
        out.push_str(&format!(
            "{:>5}  {:<10}  {:>w$}  {:>w$}  {:>w$}  {:>w$}\n",
            row.ordinal,
            row.date.to_string(),
            row.mean.to_string(),
            row.p10.to_string(),
            row.p50.to_string(),
            row.p90.to_string(),
        ));
    }

    if shown < result.rows.len() {
        out.push_str(&format!("… ({} more rows)\n", result.rows.len() - shown));
    }

    out
}

/// Format the static horizon -> deployment mapping.
pub fn format_endpoint_listing(region: &str) -> String {
    let mut out = String::new();
    for horizon in [Horizon::ShortTerm, Horizon::LongTerm] {
        let target = resolve(horizon, region);
        out.push_str(&format!(
            "{:<22} -> {}\n{:>25}{}\n",
            horizon.display_name(),
            target.deployment,
            "",
            target.invocation_url()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Cell, ForecastRow};

    fn result_with_mask() -> ForecastResult {
        ForecastResult {
            horizon: Horizon::ShortTerm,
            rows: vec![
                ForecastRow {
                    ordinal: 1,
                    date: NaiveDate::from_ymd_opt(2024, 7, 12).unwrap(),
                    mean: Cell::Value(101.25),
                    p10: Cell::Value(97.0),
                    p50: Cell::Value(101.0),
                    p90: Cell::Value(105.5),
                },
                ForecastRow {
                    ordinal: 2,
                    date: NaiveDate::from_ymd_opt(2024, 7, 13).unwrap(),
                    mean: Cell::MarketClosed,
                    p10: Cell::MarketClosed,
                    p50: Cell::MarketClosed,
                    p90: Cell::MarketClosed,
                },
            ],
        }
    }

    #[test]
    fn table_shows_marker_and_starts_at_ordinal_one() {
        let table = format_forecast_table(&result_with_mask(), None);
        let mut lines = table.lines();
        lines.next(); // header
        assert!(lines.next().unwrap().trim_start().starts_with('1'));
        assert!(lines.next().unwrap().contains("Weekend - Market is closed"));
    }

    #[test]
    fn table_limit_adds_a_trailer() {
        let table = format_forecast_table(&result_with_mask(), Some(1));
        assert!(table.contains("(1 more rows)"));
    }

    #[test]
    fn endpoint_listing_names_both_deployments() {
        let listing = format_endpoint_listing("eu-north-1");
        assert!(listing.contains("canvas-shortterm"));
        assert!(listing.contains("canvas-new-deployment-07-11-2024-2-00-AM"));
    }
}
