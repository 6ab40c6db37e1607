//! Synthetic demo history generation.
//!
//! A deterministic geometric random walk stands in for a real price file when
//! the user wants to try the client without local data (`--sample`, and the
//! TUI's demo source). Same seed, same series.

use chrono::{Duration, Local};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{HistoricalRecord, HistoryData, HistoryStats};
use crate::error::{AppError, ErrorKind};

/// Daily log-return volatility for the demo series.
const DAILY_VOL: f64 = 0.02;
/// Mild upward drift so the series trends like an equity.
const DAILY_DRIFT: f64 = 0.0004;

pub fn generate_history(seed: u64, days: usize, start_price: f64) -> Result<HistoryData, AppError> {
    if days == 0 {
        return Err(AppError::new(ErrorKind::Config, "Sample day count must be > 0."));
    }
    if !(start_price.is_finite() && start_price > 0.0) {
        return Err(AppError::new(ErrorKind::Config, "Sample start price must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(ErrorKind::Config, format!("Noise distribution error: {e}")))?;

    // The series ends yesterday: a forecast request wants history up to, not
    // including, the first forecast day.
    let last_date = Local::now().date_naive() - Duration::days(1);
    let first_date = last_date - Duration::days(days as i64 - 1);

    let mut price = start_price;
    let mut records = Vec::with_capacity(days);
    for i in 0..days {
        let date = first_date + Duration::days(i as i64);
        let z: f64 = normal.sample(&mut rng);
        price *= (DAILY_DRIFT + DAILY_VOL * z).exp();
        records.push(HistoricalRecord {
            date,
            values: vec![(price * 100.0).round() / 100.0],
        });
    }

    let stats = HistoryStats {
        n_rows: records.len(),
        first_date,
        last_date,
    };

    Ok(HistoryData {
        columns: vec!["Close".to_string()],
        records,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_series() {
        let a = generate_history(7, 30, 100.0).unwrap();
        let b = generate_history(7, 30, 100.0).unwrap();
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn honors_day_count_and_date_range() {
        let history = generate_history(1, 90, 250.0).unwrap();
        assert_eq!(history.records.len(), 90);
        assert_eq!(history.stats.n_rows, 90);
        assert_eq!(
            history.stats.last_date - history.stats.first_date,
            Duration::days(89)
        );
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert_eq!(
            generate_history(0, 0, 100.0).unwrap_err().kind(),
            ErrorKind::Config
        );
        assert_eq!(
            generate_history(0, 10, -5.0).unwrap_err().kind(),
            ErrorKind::Config
        );
    }
}
