//! Export a forecast to CSV or JSON.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream
//! scripts; masked weekend cells are written as the literal marker string.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ForecastResult;
use crate::error::{AppError, ErrorKind};

/// Write forecast rows to a CSV file.
pub fn write_forecast_csv(path: &Path, result: &ForecastResult) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::Config,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(file, "ordinal,Date,mean,p10,p50,p90")
        .map_err(|e| AppError::new(ErrorKind::Config, format!("Failed to write export CSV header: {e}")))?;

    for row in &result.rows {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            row.ordinal, row.date, row.mean, row.p10, row.p50, row.p90
        )
        .map_err(|e| AppError::new(ErrorKind::Config, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the forecast (horizon + rows) to a pretty JSON file.
pub fn write_forecast_json(path: &Path, result: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::Config,
            format!("Failed to create export JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(ErrorKind::Config, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Cell, ForecastRow, Horizon};

    fn sample_result() -> ForecastResult {
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
    fn csv_export_writes_marker_literals() {
        let path = std::env::temp_dir().join("stockcast-export-test.csv");
        write_forecast_csv(&path, &sample_result()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("ordinal,Date,mean,p10,p50,p90"));
        assert!(lines.next().unwrap().starts_with("1,2024-07-12,101.25"));
        assert!(lines.next().unwrap().contains("Weekend - Market is closed"));
    }

    #[test]
    fn json_export_round_trips_the_marker() {
        let path = std::env::temp_dir().join("stockcast-export-test.json");
        write_forecast_json(&path, &sample_result()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["rows"][0]["mean"], serde_json::json!(101.25));
        assert_eq!(
            value["rows"][1]["mean"],
            serde_json::json!("Weekend - Market is closed")
        );
    }
}
