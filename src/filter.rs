//! Lookback window filtering of price series.
//!
//! A window is the closed calendar range `[anchor - days, anchor]`. The anchor
//! is the "most recent" date of the series, chosen by [`AnchorMode`].

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Result, StockError};
use crate::series::PriceSeries;
use crate::types::{Granularity, PriceField, PriceRecord};

/// How the anchor date of a window is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorMode {
    /// Date of the first record as stored, before sorting.
    ///
    /// Only the most recent date when the file is reverse-chronological.
    FirstStored,
    /// Latest date present in the series.
    #[default]
    Latest,
}

impl fmt::Display for AnchorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorMode::FirstStored => write!(f, "first-stored"),
            AnchorMode::Latest => write!(f, "latest"),
        }
    }
}

impl FromStr for AnchorMode {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "first-stored" | "first" => Ok(AnchorMode::FirstStored),
            "latest" | "max" => Ok(AnchorMode::Latest),
            other => Err(StockError::InvalidInput(format!(
                "unknown anchor mode '{}', expected latest or first-stored",
                other
            ))),
        }
    }
}

/// Closed calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Window of `days` calendar days ending at `end`.
    pub fn ending_at(end: NaiveDate, days: u32) -> Self {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Anchor date of a series.
pub fn anchor_date(series: &PriceSeries, mode: AnchorMode) -> Result<NaiveDate> {
    let anchor = match mode {
        AnchorMode::FirstStored => series.first_stored().map(|r| r.date()),
        AnchorMode::Latest => series.latest().map(|t| t.date()),
    };
    anchor.ok_or(StockError::EmptySeries)
}

/// Window of `days` calendar days ending at the series anchor.
pub fn time_window(series: &PriceSeries, days: u32, mode: AnchorMode) -> Result<TimeWindow> {
    Ok(TimeWindow::ending_at(anchor_date(series, mode)?, days))
}

/// Records of `series` dated within the lookback window, sorted ascending.
///
/// The input is left untouched. Records sharing a timestamp are all kept, in
/// their stored relative order.
pub fn filter_time(series: &PriceSeries, days: u32, mode: AnchorMode) -> Result<FilteredView> {
    let window = time_window(series, days, mode)?;

    let records: Vec<PriceRecord> = series
        .sorted_records()
        .into_iter()
        .filter(|r| window.contains(r.date()))
        .collect();

    debug!(
        "Filtered {} of {} {} records to {}",
        records.len(),
        series.len(),
        series.granularity(),
        window
    );

    Ok(FilteredView {
        granularity: series.granularity(),
        window: Some(window),
        records,
    })
}

/// Ascending subrange of a price series for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredView {
    granularity: Granularity,
    /// `None` when no window was applied.
    window: Option<TimeWindow>,
    records: Vec<PriceRecord>,
}

impl FilteredView {
    /// Every record of the series, sorted ascending, without a window.
    pub fn unfiltered(series: &PriceSeries) -> Self {
        Self {
            granularity: series.granularity(),
            window: None,
            records: series.sorted_records(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn window(&self) -> Option<TimeWindow> {
        self.window
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one field in chronological order.
    pub fn values(&self, field: PriceField) -> Vec<f64> {
        self.records.iter().map(|r| field.value(r)).collect()
    }

    /// Serialize the view for hand-off to another consumer.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(0, 0, 0).unwrap()
    }

    fn record(ts: NaiveDateTime, close: f64) -> PriceRecord {
        PriceRecord::new(ts, close - 1.0, close + 1.0, close - 2.0, close)
    }

    /// 2021-01-01 through 2021-01-10, ascending as stored.
    fn ascending_january() -> PriceSeries {
        PriceSeries::new(
            Granularity::Daily,
            (1..=10)
                .map(|d| record(at(2021, 1, d), 100.0 + d as f64))
                .collect(),
        )
    }

    fn descending_january() -> PriceSeries {
        let mut records = ascending_january().records().to_vec();
        records.reverse();
        PriceSeries::new(Granularity::Daily, records)
    }

    #[test]
    fn test_first_stored_anchor_on_ascending_file() {
        let series = ascending_january();
        let view = filter_time(&series, 5, AnchorMode::FirstStored).unwrap();

        assert_eq!(
            view.window(),
            Some(TimeWindow {
                start: date(2020, 12, 27),
                end: date(2021, 1, 1)
            })
        );
        assert_eq!(view.len(), 1);
        assert_eq!(view.records()[0].date(), date(2021, 1, 1));
    }

    #[test]
    fn test_latest_anchor_on_ascending_file() {
        let series = ascending_january();
        let view = filter_time(&series, 5, AnchorMode::Latest).unwrap();

        let dates: Vec<NaiveDate> = view.records().iter().map(|r| r.date()).collect();
        let expected: Vec<NaiveDate> = (5..=10).map(|d| date(2021, 1, d)).collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn test_descending_file_sorted_ascending() {
        let series = descending_january();
        let view = filter_time(&series, 3, AnchorMode::FirstStored).unwrap();

        assert_eq!(view.len(), 4);
        assert_eq!(view.records()[0].date(), date(2021, 1, 7));
        assert_eq!(view.records()[3].date(), date(2021, 1, 10));
        // Input untouched
        assert_eq!(series.records()[0].date(), date(2021, 1, 10));
    }

    #[test]
    fn test_zero_days_keeps_anchor_date_only() {
        let ts = |h| date(2021, 1, 10).and_hms_opt(h, 0, 0).unwrap();
        let series = PriceSeries::new(
            Granularity::IntradayExtended,
            vec![
                record(ts(20), 5.0),
                record(ts(10), 4.0),
                record(at(2021, 1, 9), 3.0),
            ],
        );

        let view = filter_time(&series, 0, AnchorMode::Latest).unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.records().iter().all(|r| r.date() == date(2021, 1, 10)));
        assert_eq!(view.values(PriceField::Close), vec![4.0, 5.0]);
    }

    #[test]
    fn test_calendar_day_subtraction() {
        let window = TimeWindow::ending_at(date(2021, 3, 1), 1);
        assert_eq!(window.start, date(2021, 2, 28));
        let window = TimeWindow::ending_at(date(2020, 3, 1), 365);
        assert_eq!(window.start, date(2019, 3, 2));
    }

    #[test]
    fn test_huge_lookback_clamps() {
        let window = TimeWindow::ending_at(date(2021, 1, 1), u32::MAX);
        assert!(window.start <= date(1, 1, 1));
        assert!(window.contains(date(1900, 1, 1)));
    }

    #[test]
    fn test_boundaries_inclusive() {
        let window = TimeWindow::ending_at(date(2021, 1, 10), 2);
        assert!(window.contains(date(2021, 1, 8)));
        assert!(window.contains(date(2021, 1, 10)));
        assert!(!window.contains(date(2021, 1, 7)));
        assert!(!window.contains(date(2021, 1, 11)));
    }

    #[test]
    fn test_duplicates_kept() {
        let series = PriceSeries::new(
            Granularity::Daily,
            vec![
                record(at(2021, 1, 2), 2.0),
                record(at(2021, 1, 1), 1.0),
                record(at(2021, 1, 2), 3.0),
            ],
        );
        let view = filter_time(&series, 10, AnchorMode::Latest).unwrap();
        assert_eq!(view.values(PriceField::Close), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_empty_series_errors() {
        let series = PriceSeries::new(Granularity::Daily, vec![]);
        assert!(matches!(
            filter_time(&series, 7, AnchorMode::Latest),
            Err(StockError::EmptySeries)
        ));
        assert!(matches!(
            anchor_date(&series, AnchorMode::FirstStored),
            Err(StockError::EmptySeries)
        ));
    }

    #[test]
    fn test_refilter_is_idempotent() {
        let series = descending_january();
        let first = filter_time(&series, 4, AnchorMode::FirstStored).unwrap();
        let again = PriceSeries::new(Granularity::Daily, first.records().to_vec());
        let second = filter_time(&again, 4, AnchorMode::Latest).unwrap();
        assert_eq!(first.records(), second.records());
    }

    #[test]
    fn test_unfiltered_view() {
        let view = FilteredView::unfiltered(&descending_january());
        assert!(view.window().is_none());
        assert_eq!(view.len(), 10);
        assert_eq!(view.records()[0].date(), date(2021, 1, 1));
    }

    #[test]
    fn test_to_json() {
        let view = filter_time(&ascending_january(), 0, AnchorMode::Latest).unwrap();
        let json = view.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["granularity"], "daily");
        assert_eq!(parsed["records"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["window"]["end"], "2021-01-10");
    }

    #[test]
    fn test_anchor_mode_parse() {
        assert_eq!("latest".parse::<AnchorMode>().unwrap(), AnchorMode::Latest);
        assert_eq!(
            "first_stored".parse::<AnchorMode>().unwrap(),
            AnchorMode::FirstStored
        );
        assert!("newest".parse::<AnchorMode>().is_err());
        assert_eq!(AnchorMode::default(), AnchorMode::Latest);
    }
}
