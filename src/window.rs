//! Discrete lookback choices offered to the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StockError;
use crate::types::Granularity;

/// Selectable lookback window, ordered from shortest to longest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum LookbackWindow {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[default]
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl LookbackWindow {
    pub const ALL: [LookbackWindow; 7] = [
        LookbackWindow::OneDay,
        LookbackWindow::OneWeek,
        LookbackWindow::OneMonth,
        LookbackWindow::ThreeMonths,
        LookbackWindow::OneYear,
        LookbackWindow::FiveYears,
        LookbackWindow::Max,
    ];

    /// Window at slider position `index` (0..=6).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Lookback in calendar days; `None` means no filtering.
    pub fn days(&self) -> Option<u32> {
        match self {
            LookbackWindow::OneDay => Some(1),
            LookbackWindow::OneWeek => Some(7),
            LookbackWindow::OneMonth => Some(30),
            LookbackWindow::ThreeMonths => Some(90),
            LookbackWindow::OneYear => Some(365),
            LookbackWindow::FiveYears => Some(365 * 5),
            LookbackWindow::Max => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LookbackWindow::OneDay => "1 day",
            LookbackWindow::OneWeek => "1 week",
            LookbackWindow::OneMonth => "1 month",
            LookbackWindow::ThreeMonths => "3 months",
            LookbackWindow::OneYear => "1 year",
            LookbackWindow::FiveYears => "5 years",
            LookbackWindow::Max => "Max",
        }
    }

    /// Short code accepted on the command line and in config files.
    pub fn code(&self) -> &'static str {
        match self {
            LookbackWindow::OneDay => "1d",
            LookbackWindow::OneWeek => "1w",
            LookbackWindow::OneMonth => "1m",
            LookbackWindow::ThreeMonths => "3m",
            LookbackWindow::OneYear => "1y",
            LookbackWindow::FiveYears => "5y",
            LookbackWindow::Max => "max",
        }
    }

    /// Series granularity to read for this window.
    ///
    /// Windows up to and including `intraday_through` use the intraday series.
    pub fn granularity(&self, intraday_through: LookbackWindow) -> Granularity {
        if *self <= intraday_through {
            Granularity::IntradayExtended
        } else {
            Granularity::Daily
        }
    }
}

impl fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LookbackWindow {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if let Ok(index) = normalized.parse::<usize>() {
            return Self::from_index(index).ok_or_else(|| {
                StockError::InvalidInput(format!("window index {} out of range 0..=6", index))
            });
        }

        Self::ALL
            .into_iter()
            .find(|w| w.code() == normalized || w.label().to_lowercase() == normalized)
            .ok_or_else(|| {
                StockError::InvalidInput(format!(
                    "unknown window '{}', expected one of 1d, 1w, 1m, 3m, 1y, 5y, max",
                    s.trim()
                ))
            })
    }
}
