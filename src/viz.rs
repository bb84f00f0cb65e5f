//! Terminal rendering of price series.
//!
//! This module provides terminal-friendly charts:
//! - ASCII sparklines for a one-line overview
//! - Multi-row line charts with a labelled price axis
//!
//! # Example
//!
//! ```ignore
//! use stockview::viz::{line_chart, sparkline};
//!
//! let closes = vec![148.85, 152.57, 149.80, 150.02];
//! println!("{}", sparkline(&closes, 40));
//! println!("{}", line_chart(&closes, 60, 10));
//! ```

use std::fmt::Write;

use crate::filter::FilteredView;
use crate::types::PriceField;

/// Characters used for sparkline rendering, ordered from low to high.
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

const POINT: char = '•';
const LINK: char = '│';

/// Price range of a compressed series, mapped onto discrete levels.
#[derive(Debug, Clone, Copy)]
struct Scale {
    min: f64,
    max: f64,
}

impl Scale {
    fn of(values: &[f64]) -> Self {
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Self { min, max }
    }

    /// Level of `v` in `0..=top`; a flat series sits in the middle.
    fn level(&self, v: f64, top: usize) -> usize {
        let range = self.max - self.min;
        if range > 0.0 {
            ((((v - self.min) / range) * top as f64).round() as usize).min(top)
        } else {
            top / 2
        }
    }
}

/// One-line sparkline of at most `width` characters.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let points = compress(values, width);
    let scale = Scale::of(&points);
    let top = SPARKLINE_CHARS.len() - 1;
    points
        .iter()
        .map(|&v| SPARKLINE_CHARS[scale.level(v, top)])
        .collect()
}

/// Shrink `values` to at most `width` points, keeping the last value of each bucket.
fn compress(values: &[f64], width: usize) -> Vec<f64> {
    if values.len() <= width || width == 0 {
        return values.to_vec();
    }
    let bucket = values.len().div_ceil(width);
    values
        .chunks(bucket)
        .filter_map(|chunk| chunk.last().copied())
        .collect()
}

/// Render a line chart of `values` into `height` rows of at most `width` columns.
///
/// Rows are prefixed with a price axis; the top row is the maximum and the
/// bottom row the minimum of the compressed data.
pub fn line_chart(values: &[f64], width: usize, height: usize) -> String {
    if values.is_empty() || width == 0 || height == 0 {
        return String::new();
    }

    let sampled = compress(values, width);
    let scale = Scale::of(&sampled);
    let (min_val, max_val) = (scale.min, scale.max);
    let top = height - 1;

    // grid[row][col], row 0 is the bottom
    let mut grid = vec![vec![' '; sampled.len()]; height];
    let mut prev: Option<usize> = None;
    for (col, &v) in sampled.iter().enumerate() {
        let row = scale.level(v, top);
        if let Some(p) = prev {
            let (lo, hi) = if p < row { (p, row) } else { (row, p) };
            for link in grid.iter_mut().take(hi).skip(lo + 1) {
                link[col] = LINK;
            }
        }
        grid[row][col] = POINT;
        prev = Some(row);
    }

    let label_width = format!("{:.2}", max_val)
        .len()
        .max(format!("{:.2}", min_val).len());

    let mut out = String::new();
    for row in (0..height).rev() {
        let label = if row == top {
            format!("{:.2}", max_val)
        } else if row == 0 {
            format!("{:.2}", min_val)
        } else {
            String::new()
        };
        let line: String = grid[row].iter().collect();
        let _ = writeln!(out, "{:>w$} ┤{}", label, line.trim_end(), w = label_width);
    }
    let _ = write!(
        out,
        "{:>w$} └{}",
        "",
        "─".repeat(sampled.len()),
        w = label_width
    );

    out
}

/// Chart of one field over a filtered view, with a title and date axis.
pub fn render_chart(
    title: &str,
    view: &FilteredView,
    field: PriceField,
    width: usize,
    height: usize,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} · {}", title, field.label());

    let (first, last) = match (view.records().first(), view.records().last()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            out.push_str("(no data in window)");
            return out;
        }
    };

    let values = view.values(field);
    let _ = writeln!(out, "{}", line_chart(&values, width, height));

    let start = first.timestamp.format("%Y-%m-%d %H:%M").to_string();
    let end = last.timestamp.format("%Y-%m-%d %H:%M").to_string();
    let columns = compress(&values, width).len();
    let axis_pad = format!("{:.2}", Scale::of(&values).max).len() + 2;
    let gap = columns.saturating_sub(start.len() + end.len()).max(1);
    let _ = write!(out, "{}{}{}{}", " ".repeat(axis_pad), start, " ".repeat(gap), end);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter_time, AnchorMode};
    use crate::series::PriceSeries;
    use crate::types::{Granularity, PriceRecord};
    use chrono::NaiveDate;

    #[test]
    fn test_sparkline_basic() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let spark = sparkline(&values, 5);
        assert_eq!(spark.chars().count(), 5);
        assert!(spark.starts_with('▁'));
        assert!(spark.ends_with('█'));
    }

    #[test]
    fn test_sparkline_flat_and_empty() {
        assert!(sparkline(&[], 10).is_empty());
        let spark = sparkline(&[3.0, 3.0, 3.0], 10);
        assert!(spark.chars().all(|c| c == '▅' || c == '▄'));
    }

    #[test]
    fn test_compress_keeps_bucket_close() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let points = compress(&values, 10);
        assert_eq!(points.len(), 10);
        assert_eq!(points[0], 9.0);
        assert_eq!(points[9], 99.0);
        assert_eq!(compress(&[1.0, 2.0], 10), vec![1.0, 2.0]);
        assert!(compress(&values, 7).len() <= 7);
    }

    #[test]
    fn test_line_chart_shape() {
        let values = vec![10.0, 12.0, 11.0, 15.0];
        let chart = line_chart(&values, 20, 5);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("15.00"));
        assert!(lines[4].starts_with("10.00"));
        assert_eq!(chart.matches(POINT).count(), 4);
    }

    #[test]
    fn test_line_chart_links_gaps() {
        let chart = line_chart(&[0.0, 10.0], 2, 5);
        assert_eq!(chart.matches(LINK).count(), 3);
    }

    #[test]
    fn test_line_chart_degenerate() {
        assert!(line_chart(&[], 10, 5).is_empty());
        assert!(line_chart(&[1.0], 0, 5).is_empty());
        let flat = line_chart(&[2.0, 2.0], 10, 4);
        assert_eq!(flat.matches(POINT).count(), 2);
    }

    #[test]
    fn test_render_chart() {
        let at = |d| {
            NaiveDate::from_ymd_opt(2021, 2, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        let series = PriceSeries::new(
            Granularity::Daily,
            (1..=5)
                .map(|d| PriceRecord::new(at(d), 1.0, 2.0, 0.5, d as f64))
                .collect(),
        );
        let view = filter_time(&series, 30, AnchorMode::Latest).unwrap();
        let chart = render_chart("Apple", &view, PriceField::Close, 40, 6);
        assert!(chart.starts_with("Apple · Close"));
        assert!(chart.contains("2021-02-01 00:00"));
        assert!(chart.contains("2021-02-05 00:00"));
    }

    #[test]
    fn test_render_chart_empty_view() {
        let series = PriceSeries::new(Granularity::Daily, vec![]);
        let view = FilteredView::unfiltered(&series);
        let chart = render_chart("IBM", &view, PriceField::Open, 40, 6);
        assert!(chart.contains("no data in window"));
    }
}
