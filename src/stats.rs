//! Summary statistics over a filtered view.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::filter::FilteredView;
use crate::types::PriceField;

/// Aggregates of one price field over the visible window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
    pub field: PriceField,
    pub count: usize,
    pub highest: f64,
    pub lowest: f64,
    pub first: f64,
    pub last: f64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WindowSummary {
    /// Summarize `field` over the view; `None` for an empty view.
    pub fn from_view(view: &FilteredView, field: PriceField) -> Option<Self> {
        let records = view.records();
        let first = records.first()?;
        let last = records.last()?;

        let (lowest, highest) = records
            .iter()
            .map(|r| field.value(r))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        Some(Self {
            field,
            count: records.len(),
            highest,
            lowest,
            first: field.value(first),
            last: field.value(last),
            start: first.timestamp,
            end: last.timestamp,
        })
    }

    /// Percent change from the first to the last value in the window.
    pub fn change_pct(&self) -> Option<f64> {
        if self.first == 0.0 {
            return None;
        }
        Some((self.last - self.first) / self.first * 100.0)
    }
}

/// Format a price as a dollar label, e.g. `"149.80 USD"`.
pub fn format_usd(value: f64) -> String {
    format!("{:.2} USD", value)
}

/// Format a number as a percentage with sign.
pub fn format_pct(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}
