//! Request serialization for the forecasting endpoints.
//!
//! A deployment accepts exactly one body encoding:
//! - JSON: an array of row objects (or the user's inline JSON value verbatim)
//! - CSV: the historical table with a header row and no index column

use serde_json::{Map, Value};

use crate::data::EncodedRequest;
use crate::domain::{HistoryData, PayloadEncoding};
use crate::error::{AppError, ErrorKind};

/// What goes over the wire: the loaded table, or raw user JSON.
#[derive(Debug, Clone)]
pub enum RequestPayload<'a> {
    Table(&'a HistoryData),
    Inline(&'a Value),
}

/// Serialize a payload into the deployment's wire encoding.
pub fn serialize(
    payload: &RequestPayload<'_>,
    encoding: PayloadEncoding,
) -> Result<EncodedRequest, AppError> {
    let body = match (payload, encoding) {
        (RequestPayload::Table(history), PayloadEncoding::Json) => table_to_json(history)?,
        (RequestPayload::Table(history), PayloadEncoding::Csv) => table_to_csv(history)?,
        (RequestPayload::Inline(value), PayloadEncoding::Json) => serde_json::to_vec(value)
            .map_err(|e| {
                AppError::new(ErrorKind::MalformedInput, format!("Failed to encode inline data: {e}"))
            })?,
        (RequestPayload::Inline(_), PayloadEncoding::Csv) => {
            return Err(AppError::new(
                ErrorKind::Config,
                "Inline data requires a JSON-encoded deployment; load a CSV file instead.",
            ));
        }
    };

    Ok(EncodedRequest {
        body,
        content_type: encoding.content_type(),
    })
}

fn table_to_json(history: &HistoryData) -> Result<Vec<u8>, AppError> {
    let mut rows = Vec::with_capacity(history.records.len());
    for record in &history.records {
        let mut obj = Map::new();
        obj.insert("Date".to_string(), Value::String(record.date.to_string()));
        for (name, value) in history.columns.iter().zip(&record.values) {
            obj.insert(
                name.clone(),
                serde_json::Number::from_f64(*value)
                    .map(Value::Number)
                    .ok_or_else(|| {
                        AppError::new(
                            ErrorKind::MalformedInput,
                            format!("Column '{name}' has a non-finite value."),
                        )
                    })?,
            );
        }
        rows.push(Value::Object(obj));
    }

    serde_json::to_vec(&rows)
        .map_err(|e| AppError::new(ErrorKind::MalformedInput, format!("Failed to encode history as JSON: {e}")))
}

fn table_to_csv(history: &HistoryData) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = Vec::with_capacity(history.columns.len() + 1);
    header.push("Date".to_string());
    header.extend(history.columns.iter().cloned());
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(ErrorKind::MalformedInput, format!("Failed to write CSV header: {e}")))?;

    for record in &history.records {
        let mut fields = Vec::with_capacity(header.len());
        fields.push(record.date.to_string());
        fields.extend(record.values.iter().map(|v| v.to_string()));
        writer
            .write_record(&fields)
            .map_err(|e| AppError::new(ErrorKind::MalformedInput, format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::new(ErrorKind::MalformedInput, format!("Failed to finish CSV body: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{HistoricalRecord, HistoryStats};

    fn sample_history() -> HistoryData {
        let records = vec![
            HistoricalRecord {
                date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                values: vec![100.0, 101.5],
            },
            HistoricalRecord {
                date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
                values: vec![101.5, 99.75],
            },
        ];
        HistoryData {
            columns: vec!["Open".to_string(), "Close".to_string()],
            stats: HistoryStats {
                n_rows: records.len(),
                first_date: records[0].date,
                last_date: records[1].date,
            },
            records,
        }
    }

    #[test]
    fn csv_body_has_header_and_no_index_column() {
        let history = sample_history();
        let encoded = serialize(&RequestPayload::Table(&history), PayloadEncoding::Csv).unwrap();
        assert_eq!(encoded.content_type, "text/csv");

        let text = String::from_utf8(encoded.body).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Open,Close"));
        assert_eq!(lines.next(), Some("2024-07-01,100,101.5"));
        assert_eq!(lines.next(), Some("2024-07-02,101.5,99.75"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn json_body_is_an_array_of_row_objects() {
        let history = sample_history();
        let encoded = serialize(&RequestPayload::Table(&history), PayloadEncoding::Json).unwrap();
        assert_eq!(encoded.content_type, "application/json");

        let value: serde_json::Value = serde_json::from_slice(&encoded.body).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Date"], serde_json::json!("2024-07-01"));
        assert_eq!(rows[1]["Close"], serde_json::json!(99.75));
    }

    #[test]
    fn inline_json_passes_through_verbatim() {
        let value = serde_json::json!({"Close": [100.0, 101.5]});
        let encoded = serialize(&RequestPayload::Inline(&value), PayloadEncoding::Json).unwrap();
        let decoded: serde_json::Value = serde_json::from_slice(&encoded.body).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn inline_payload_rejects_csv_encoding() {
        let value = serde_json::json!({"Close": [100.0]});
        let err = serialize(&RequestPayload::Inline(&value), PayloadEncoding::Csv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
