//! Forecast post-processing.
//!
//! Operations run in a fixed order, driven by the deployment profile:
//!
//! 1. horizon truncation (calendar order from the service is trusted; no
//!    local re-sorting)
//! 2. date normalization (strip any time-of-day component)
//! 3. weekend policy (mask or filter, never both)
//! 4. ordinal renumbering (display ordinals are 1-based)

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::domain::{
    Cell, DeploymentProfile, ForecastResult, ForecastRow, Horizon, ResponseRow, WeekendPolicy,
};
use crate::error::{AppError, ErrorKind};

/// Run the full post-processing chain for one response.
pub fn apply(
    mut rows: Vec<ResponseRow>,
    horizon: Horizon,
    profile: &DeploymentProfile,
) -> Result<ForecastResult, AppError> {
    if let Some(n) = profile.horizon_truncation {
        rows.truncate(n);
    }

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let date = parse_wire_date(&row.date)?;
        out.push(ForecastRow {
            ordinal: 0,
            date,
            mean: row.mean,
            p10: row.p10,
            p50: row.p50,
            p90: row.p90,
        });
    }

    let out = apply_weekend_policy(out, profile.weekend_policy);

    Ok(ForecastResult {
        horizon,
        rows: renumber(out),
    })
}

/// Parse a wire date, stripping any time-of-day component.
///
/// Idempotent on already-normalized (date-only) input.
pub fn parse_wire_date(raw: &str) -> Result<NaiveDate, AppError> {
    let trimmed = raw.trim();

    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date);
        }
    }

    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.date());
        }
    }

    Err(AppError::new(
        ErrorKind::Parse,
        format!("Unrecognized forecast date '{trimmed}'."),
    ))
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn apply_weekend_policy(rows: Vec<ForecastRow>, policy: WeekendPolicy) -> Vec<ForecastRow> {
    match policy {
        WeekendPolicy::Keep => rows,
        WeekendPolicy::Filter => rows.into_iter().filter(|r| !is_weekend(r.date)).collect(),
        WeekendPolicy::Mask => rows
            .into_iter()
            .map(|mut r| {
                if is_weekend(r.date) {
                    r.mean = Cell::MarketClosed;
                    r.p10 = Cell::MarketClosed;
                    r.p50 = Cell::MarketClosed;
                    r.p90 = Cell::MarketClosed;
                }
                r
            })
            .collect(),
    }
}

fn renumber(mut rows: Vec<ForecastRow>) -> Vec<ForecastRow> {
    for (idx, row) in rows.iter_mut().enumerate() {
        row.ordinal = idx + 1;
    }
    rows
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::PayloadEncoding;

    fn wire_rows(start: NaiveDate, n: usize) -> Vec<ResponseRow> {
        (0..n)
            .map(|i| ResponseRow {
                date: (start + Duration::days(i as i64)).to_string(),
                mean: Cell::Value(100.0 + i as f64),
                p10: Cell::Value(95.0 + i as f64),
                p50: Cell::Value(100.0 + i as f64),
                p90: Cell::Value(105.0 + i as f64),
            })
            .collect()
    }

    fn profile(policy: WeekendPolicy, truncation: Option<usize>) -> DeploymentProfile {
        DeploymentProfile {
            encoding: PayloadEncoding::Json,
            weekend_policy: policy,
            horizon_truncation: truncation,
        }
    }

    // 2024-07-08 is a Monday; the 13th/14th are the weekend.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 8).unwrap()
    }

    #[test]
    fn long_term_truncates_400_rows_to_365() {
        let rows = wire_rows(monday(), 400);
        let result = apply(
            rows,
            Horizon::LongTerm,
            &profile(WeekendPolicy::Keep, Some(365)),
        )
        .unwrap();

        assert_eq!(result.rows.len(), 365);
        // Row 366 onward is gone: the last surviving date is day index 364.
        assert_eq!(result.rows.last().unwrap().date, monday() + Duration::days(364));
    }

    #[test]
    fn truncation_is_idempotent() {
        let mut rows = wire_rows(monday(), 400);
        rows.truncate(365);
        rows.truncate(365);
        assert_eq!(rows.len(), 365);
    }

    #[test]
    fn date_normalization_strips_time_of_day() {
        let saturday = NaiveDate::from_ymd_opt(2024, 7, 13).unwrap();
        assert_eq!(parse_wire_date("2024-07-13").unwrap(), saturday);
        assert_eq!(parse_wire_date("2024-07-13T00:00:00").unwrap(), saturday);
        assert_eq!(parse_wire_date("2024-07-13 15:30:00").unwrap(), saturday);
        assert_eq!(parse_wire_date("2024-07-13T09:00:00.250").unwrap(), saturday);

        // Idempotent: normalizing an already-normalized date changes nothing.
        let normalized = parse_wire_date("2024-07-13T00:00:00").unwrap();
        assert_eq!(parse_wire_date(&normalized.to_string()).unwrap(), normalized);
    }

    #[test]
    fn unparseable_date_is_a_parse_error() {
        let err = parse_wire_date("someday soon").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn masking_hits_saturday_and_leaves_weekdays_alone() {
        let rows = wire_rows(monday(), 7);
        let result = apply(
            rows,
            Horizon::ShortTerm,
            &profile(WeekendPolicy::Mask, None),
        )
        .unwrap();

        assert_eq!(result.rows.len(), 7);

        // Friday (index 4) keeps its numbers.
        let friday = &result.rows[4];
        assert_eq!(friday.mean, Cell::Value(104.0));

        // Saturday (index 5) is fully masked.
        let saturday = &result.rows[5];
        assert_eq!(saturday.date, NaiveDate::from_ymd_opt(2024, 7, 13).unwrap());
        assert!(saturday.mean.is_market_closed());
        assert!(saturday.p10.is_market_closed());
        assert!(saturday.p50.is_market_closed());
        assert!(saturday.p90.is_market_closed());
    }

    #[test]
    fn filtering_drops_exactly_the_weekend() {
        let rows = wire_rows(monday(), 7);
        let result = apply(
            rows,
            Horizon::ShortTerm,
            &profile(WeekendPolicy::Filter, None),
        )
        .unwrap();

        assert_eq!(result.rows.len(), 5);
        assert!(result.rows.iter().all(|r| !is_weekend(r.date)));
    }

    #[test]
    fn ordinals_start_at_one_and_stay_consecutive_after_filtering() {
        let rows = wire_rows(monday(), 7);
        let result = apply(
            rows,
            Horizon::ShortTerm,
            &profile(WeekendPolicy::Filter, None),
        )
        .unwrap();

        let ordinals: Vec<usize> = result.rows.iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);
    }
}
