//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - forecast mean: `*`
//! - p10/p90 band edges: `.`
//!
//! Masked weekend rows have no numeric cells and are simply skipped.

use crate::domain::{ForecastResult, ForecastRow};

/// Render the forecast as a fixed-size character grid.
pub fn render_ascii_plot(result: &ForecastResult, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let points: Vec<&ForecastRow> = result
        .rows
        .iter()
        .filter(|r| r.mean.as_value().is_some())
        .collect();

    if points.len() < 2 {
        return "Plot: not enough numeric rows to draw.\n".to_string();
    }

    let x_max = (result.rows.len() - 1).max(1) as f64;
    let (y_min, y_max) = y_range(&points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Band edges first so the mean line can overlay them.
    for row in &points {
        let x = map_x((row.ordinal - 1) as f64, x_max, width);
        for cell in [row.p10, row.p90] {
            if let Some(v) = cell.as_value() {
                grid[map_y(v, y_min, y_max, height)][x] = '.';
            }
        }
    }
    for row in &points {
        let x = map_x((row.ordinal - 1) as f64, x_max, width);
        if let Some(v) = row.mean.as_value() {
            grid[map_y(v, y_min, y_max, height)][x] = '*';
        }
    }

    let first = result.rows.first().map(|r| r.date);
    let last = result.rows.last().map(|r| r.date);

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: rows={} | price=[{y_min:.2}, {y_max:.2}]",
        result.rows.len()
    ));
    if let (Some(first), Some(last)) = (first, last) {
        out.push_str(&format!(" | dates=[{first}, {last}]"));
    }
    out.push('\n');

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn y_range(points: &[&ForecastRow]) -> Option<(f64, f64)> {
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for row in points {
        for cell in [row.mean, row.p10, row.p50, row.p90] {
            if let Some(v) = cell.as_value() {
                y_min = y_min.min(v);
                y_max = y_max.max(v);
            }
        }
    }
    if y_min.is_finite() && y_max.is_finite() && y_max > y_min {
        Some((y_min, y_max))
    } else {
        None
    }
}

fn pad_range(y_min: f64, y_max: f64, frac: f64) -> (f64, f64) {
    let pad = ((y_max - y_min).abs() * frac).max(1e-12);
    (y_min - pad, y_max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let u = (x / x_max).clamp(0.0, 1.0);
    ((u * (width as f64 - 1.0)).round() as usize).min(width - 1)
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the grid.
    let inverted = 1.0 - u;
    ((inverted * (height as f64 - 1.0)).round() as usize).min(height - 1)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Cell, Horizon};

    fn row(ordinal: usize, day: u32, mean: f64) -> ForecastRow {
        ForecastRow {
            ordinal,
            date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
            mean: Cell::Value(mean),
            p10: Cell::Value(mean - 3.0),
            p50: Cell::Value(mean),
            p90: Cell::Value(mean + 3.0),
        }
    }

    #[test]
    fn renders_a_grid_of_the_requested_size() {
        let result = ForecastResult {
            horizon: Horizon::ShortTerm,
            rows: (0..7).map(|i| row(i + 1, 8 + i as u32, 100.0 + i as f64)).collect(),
        };
        let plot = render_ascii_plot(&result, 40, 10);
        let lines: Vec<&str> = plot.lines().collect();

        assert_eq!(lines.len(), 11); // header + grid rows
        assert!(lines[1..].iter().all(|l| l.len() == 40));
        assert!(plot.contains('*'));
        assert!(plot.contains('.'));
    }

    #[test]
    fn all_masked_rows_degrade_gracefully() {
        let masked = ForecastRow {
            ordinal: 1,
            date: NaiveDate::from_ymd_opt(2024, 7, 13).unwrap(),
            mean: Cell::MarketClosed,
            p10: Cell::MarketClosed,
            p50: Cell::MarketClosed,
            p90: Cell::MarketClosed,
        };
        let result = ForecastResult {
            horizon: Horizon::ShortTerm,
            rows: vec![masked],
        };
        assert!(render_ascii_plot(&result, 40, 10).contains("not enough numeric rows"));
    }
}
