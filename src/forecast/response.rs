//! Response decoding for the forecasting endpoints.
//!
//! Dispatch is on the declared response content type. CSV bodies must carry
//! the full forecast schema (Date, mean, p10, p50, p90); JSON bodies are
//! decoded to a generic value first and the row collection is extracted
//! without reordering or rewriting.

use std::collections::HashMap;

use csv::StringRecord;
use serde_json::Value;

use crate::data::RawResponse;
use crate::domain::{Cell, ResponseRow, WEEKEND_MARKER};
use crate::error::{AppError, ErrorKind};

const REQUIRED_COLUMNS: [&str; 5] = ["date", "mean", "p10", "p50", "p90"];

/// Decode a raw endpoint response into wire-shape forecast rows.
pub fn parse(raw: &RawResponse) -> Result<Vec<ResponseRow>, AppError> {
    if is_csv(&raw.content_type) {
        parse_csv(&raw.body)
    } else {
        parse_json(&raw.body)
    }
}

fn is_csv(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|t| t.eq_ignore_ascii_case("text/csv"))
}

/// Decode a CSV response body.
pub fn parse_csv(body: &[u8]) -> Result<Vec<ResponseRow>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(ErrorKind::Parse, format!("Failed to read response CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);

    let mut indices = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = *header_map.get(name).ok_or_else(|| {
            AppError::new(
                ErrorKind::Parse,
                format!("Response CSV is missing the '{name}' column."),
            )
        })?;
    }
    let [date_idx, mean_idx, p10_idx, p50_idx, p90_idx] = indices;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(ErrorKind::Parse, format!("Malformed response CSV at line {line}: {e}")))?;

        let date = field(&record, date_idx, line, "Date")?.to_string();
        rows.push(ResponseRow {
            date,
            mean: parse_cell(&record, mean_idx, line, "mean")?,
            p10: parse_cell(&record, p10_idx, line, "p10")?,
            p50: parse_cell(&record, p50_idx, line, "p50")?,
            p90: parse_cell(&record, p90_idx, line, "p90")?,
        });
    }

    Ok(rows)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            (
                name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase(),
                idx,
            )
        })
        .collect()
}

fn field<'r>(record: &'r StringRecord, idx: usize, line: usize, name: &str) -> Result<&'r str, AppError> {
    record.get(idx).ok_or_else(|| {
        AppError::new(
            ErrorKind::Parse,
            format!("Response CSV line {line} is missing the '{name}' field."),
        )
    })
}

fn parse_cell(record: &StringRecord, idx: usize, line: usize, name: &str) -> Result<Cell, AppError> {
    let raw = field(record, idx, line, name)?;
    if raw == WEEKEND_MARKER {
        return Ok(Cell::MarketClosed);
    }
    let value = raw.parse::<f64>().map_err(|_| {
        AppError::new(
            ErrorKind::Parse,
            format!("Response CSV line {line}: '{name}' has a non-numeric value '{raw}'."),
        )
    })?;
    Ok(Cell::Value(value))
}

/// Decode a JSON response body.
///
/// The body is decoded to a generic `serde_json::Value` first; rows are then
/// taken from a top-level array or a `predictions` field, unmodified.
pub fn parse_json(body: &[u8]) -> Result<Vec<ResponseRow>, AppError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::new(ErrorKind::Parse, format!("Response is not valid JSON: {e}")))?;

    let rows_value = match &value {
        Value::Array(_) => &value,
        Value::Object(map) => map.get("predictions").ok_or_else(|| {
            AppError::new(
                ErrorKind::Parse,
                "Response JSON has no top-level array or 'predictions' field.",
            )
        })?,
        _ => {
            return Err(AppError::new(
                ErrorKind::Parse,
                "Response JSON is neither an array nor an object.",
            ));
        }
    };

    serde_json::from_value(rows_value.clone())
        .map_err(|e| AppError::new(ErrorKind::Parse, format!("Unexpected forecast row shape: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{HistoricalRecord, HistoryData, HistoryStats, PayloadEncoding};
    use crate::forecast::request::{RequestPayload, serialize};

    const CSV_BODY: &str = "\
Date,mean,p10,p50,p90
2024-07-12,101.2,97.0,101.0,105.5
2024-07-13,102.1,97.8,101.9,106.3
";

    #[test]
    fn parses_a_csv_body() {
        let rows = parse_csv(CSV_BODY.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2024-07-12");
        assert_eq!(rows[0].mean, Cell::Value(101.2));
        assert_eq!(rows[1].p90, Cell::Value(106.3));
    }

    #[test]
    fn dispatches_on_content_type() {
        let raw = RawResponse {
            body: CSV_BODY.as_bytes().to_vec(),
            content_type: "text/csv; charset=utf-8".to_string(),
        };
        assert_eq!(parse(&raw).unwrap().len(), 2);
    }

    #[test]
    fn missing_column_is_a_parse_error() {
        let body = "Date,mean,p10,p50\n2024-07-12,101.2,97.0,101.0\n";
        let err = parse_csv(body.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("p90"));
    }

    #[test]
    fn non_numeric_cell_is_a_parse_error() {
        let body = "Date,mean,p10,p50,p90\n2024-07-12,oops,97.0,101.0,105.5\n";
        let err = parse_csv(body.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn masked_marker_cells_are_accepted() {
        let body = format!(
            "Date,mean,p10,p50,p90\n2024-07-13,{m},{m},{m},{m}\n",
            m = WEEKEND_MARKER
        );
        let rows = parse_csv(body.as_bytes()).unwrap();
        assert!(rows[0].mean.is_market_closed());
    }

    #[test]
    fn json_top_level_array_parses() {
        let body = r#"[{"Date":"2024-07-12","mean":101.2,"p10":97.0,"p50":101.0,"p90":105.5}]"#;
        let rows = parse_json(body.as_bytes()).unwrap();
        assert_eq!(rows[0].date, "2024-07-12");
        assert_eq!(rows[0].p50, Cell::Value(101.0));
    }

    #[test]
    fn json_predictions_envelope_parses() {
        let body = r#"{"predictions":[{"Date":"2024-07-12","mean":101.2,"p10":97.0,"p50":101.0,"p90":105.5}]}"#;
        assert_eq!(parse_json(body.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_json(b"{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn json_without_rows_is_a_parse_error() {
        let err = parse_json(br#"{"status":"ok"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn serialized_table_round_trips_through_the_parser() {
        // A table with the forecast column set, written by the request
        // serializer, must come back row-for-row through the response parser.
        let records = vec![
            HistoricalRecord {
                date: NaiveDate::from_ymd_opt(2024, 7, 12).unwrap(),
                values: vec![101.2, 97.0, 101.0, 105.5],
            },
            HistoricalRecord {
                date: NaiveDate::from_ymd_opt(2024, 7, 13).unwrap(),
                values: vec![102.1, 97.8, 101.9, 106.3],
            },
        ];
        let table = HistoryData {
            columns: vec![
                "mean".to_string(),
                "p10".to_string(),
                "p50".to_string(),
                "p90".to_string(),
            ],
            stats: HistoryStats {
                n_rows: records.len(),
                first_date: records[0].date,
                last_date: records[1].date,
            },
            records,
        };

        let encoded = serialize(&RequestPayload::Table(&table), PayloadEncoding::Csv).unwrap();
        let rows = parse_csv(&encoded.body).unwrap();

        assert_eq!(rows.len(), table.records.len());
        for (row, record) in rows.iter().zip(&table.records) {
            assert_eq!(row.date, record.date.to_string());
            assert_eq!(row.mean, Cell::Value(record.values[0]));
            assert_eq!(row.p10, Cell::Value(record.values[1]));
            assert_eq!(row.p50, Cell::Value(record.values[2]));
            assert_eq!(row.p90, Cell::Value(record.values[3]));
        }
    }
}
