//! Core data types for the stock viewer.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StockError;

/// A configured ticker together with its human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub ticker: String,
    pub name: String,
}

impl Symbol {
    pub fn new(ticker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ticker)
    }
}

/// One OHLC price record keyed by its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceRecord {
    pub fn new(timestamp: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// Calendar date of the record, used for window boundaries.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Value of the given price field.
    pub fn value(&self, field: PriceField) -> f64 {
        field.value(self)
    }
}

/// Sampling resolution of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    Daily,
    IntradayExtended,
}

impl Granularity {
    /// Both granularities, in load order.
    pub const ALL: [Granularity; 2] = [Granularity::Daily, Granularity::IntradayExtended];

    /// File name suffix appended to the ticker.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Granularity::Daily => "_TIME_SERIES_DAILY.csv",
            Granularity::IntradayExtended => "_TIME_SERIES_INTRADAY_EXTENDED.csv",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::IntradayExtended => write!(f, "intraday-extended"),
        }
    }
}

/// Selectable price field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

impl PriceField {
    pub const ALL: [PriceField; 4] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
    ];

    /// Read this field from a record.
    pub fn value(&self, record: &PriceRecord) -> f64 {
        match self {
            PriceField::Open => record.open,
            PriceField::High => record.high,
            PriceField::Low => record.low,
            PriceField::Close => record.close,
        }
    }

    /// Lowercase column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        }
    }

    /// Capitalized label for display.
    pub fn label(&self) -> &'static str {
        match self {
            PriceField::Open => "Open",
            PriceField::High => "High",
            PriceField::Low => "Low",
            PriceField::Close => "Close",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceField {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "o" => Ok(PriceField::Open),
            "high" | "h" => Ok(PriceField::High),
            "low" | "l" => Ok(PriceField::Low),
            "close" | "c" => Ok(PriceField::Close),
            other => Err(StockError::InvalidInput(format!(
                "unknown price field '{}', expected open, high, low or close",
                other
            ))),
        }
    }
}
