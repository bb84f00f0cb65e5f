//! Data loading for locally stored price series.
//!
//! Every symbol is backed by two CSV files under a base directory, one per
//! [`Granularity`]: `<TICKER>_TIME_SERIES_DAILY.csv` and
//! `<TICKER>_TIME_SERIES_INTRADAY_EXTENDED.csv`. The first column holds the
//! timestamp and the OHLC columns are located by header name.

use crate::error::{Result, StockError};
use crate::series::PriceSeries;
use crate::types::{Granularity, PriceRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default data directory, relative to the working directory.
pub const DEFAULT_BASE_DIR: &str = "../data/";

/// Data source configuration.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Directory holding the per-symbol CSV files.
    pub base_dir: PathBuf,
    /// Date format string for parsing (e.g., "%Y-%m-%d" or "%Y-%m-%d %H:%M:%S").
    pub date_format: Option<String>,
    /// CSV delimiter character.
    pub delimiter: u8,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            date_format: None,
            delimiter: b',',
        }
    }
}

impl DataConfig {
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }
}

/// Path of the backing file for one symbol at one granularity.
pub fn series_path(base_dir: impl AsRef<Path>, symbol: &str, granularity: Granularity) -> PathBuf {
    base_dir
        .as_ref()
        .join(format!("{}{}", symbol, granularity.file_suffix()))
}

/// Field order of numeric dates such as `01/02/2022`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayOrder {
    MonthFirst,
    DayFirst,
}

/// A timestamp layout tried when no explicit format is configured.
struct DateLayout {
    pattern: &'static str,
    has_time: bool,
    order: Option<DayOrder>,
}

impl DateLayout {
    const fn new(pattern: &'static str, has_time: bool, order: Option<DayOrder>) -> Self {
        Self {
            pattern,
            has_time,
            order,
        }
    }

    fn parse(&self, s: &str) -> Option<NaiveDateTime> {
        if self.has_time {
            NaiveDateTime::parse_from_str(s, self.pattern).ok()
        } else {
            NaiveDate::parse_from_str(s, self.pattern)
                .ok()?
                .and_hms_opt(0, 0, 0)
        }
    }
}

const DATE_LAYOUTS: [DateLayout; 17] = [
    DateLayout::new("%Y-%m-%d %H:%M:%S", true, None),
    DateLayout::new("%Y-%m-%d %H:%M:%S%.f", true, None),
    DateLayout::new("%Y-%m-%d %H:%M", true, None),
    DateLayout::new("%Y-%m-%dT%H:%M:%S", true, None),
    DateLayout::new("%Y-%m-%dT%H:%M:%S%.f", true, None),
    DateLayout::new("%Y-%m-%dT%H:%M:%SZ", true, None),
    DateLayout::new("%Y/%m/%d %H:%M:%S", true, None),
    DateLayout::new("%m/%d/%Y %H:%M:%S", true, Some(DayOrder::MonthFirst)),
    DateLayout::new("%d/%m/%Y %H:%M:%S", true, Some(DayOrder::DayFirst)),
    DateLayout::new("%Y-%m-%d", false, None),
    DateLayout::new("%Y/%m/%d", false, None),
    DateLayout::new("%Y%m%d", false, None),
    DateLayout::new("%m/%d/%Y", false, Some(DayOrder::MonthFirst)),
    DateLayout::new("%d/%m/%Y", false, Some(DayOrder::DayFirst)),
    DateLayout::new("%d-%m-%Y", false, Some(DayOrder::DayFirst)),
    DateLayout::new("%d-%b-%Y", false, None), // 15-Jan-2024
    DateLayout::new("%b %d, %Y", false, None),
];

/// Timestamp reader for one file.
///
/// Month-first is preferred for ambiguous numeric dates. The first row that
/// settles the day order fixes it for the rest of the file, so a file is never
/// read with both orders.
#[derive(Debug, Default)]
struct DateParser<'a> {
    format: Option<&'a str>,
    order: Option<DayOrder>,
}

impl<'a> DateParser<'a> {
    fn new(format: Option<&'a str>) -> Self {
        Self {
            format,
            order: None,
        }
    }

    fn parse(&mut self, s: &str) -> Option<NaiveDateTime> {
        if let Some(fmt) = self.format {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                return d.and_hms_opt(0, 0, 0);
            }
        }

        for layout in &DATE_LAYOUTS {
            if matches!((self.order, layout.order), (Some(fixed), Some(o)) if fixed != o) {
                continue;
            }
            if let Some(dt) = layout.parse(s) {
                if self.order.is_none() && layout.order.is_some() {
                    debug!("Numeric dates read as {:?} ('{}')", layout.order, s);
                    self.order = layout.order;
                }
                return Some(dt);
            }
        }

        // RFC 3339 with offset, e.g. "2021-01-04T16:00:00-05:00"; keep local wall time.
        DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local())
    }
}

/// Normalize a header for matching: lowercase, drop "1. " style prefixes.
fn normalize_header(header: &str) -> String {
    let lower = header.trim().to_lowercase();
    match lower.split_once(". ") {
        Some((prefix, rest)) if prefix.chars().all(|c| c.is_ascii_digit()) => rest.to_string(),
        _ => lower,
    }
}

/// Column indices of open, high, low and close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OhlcColumns {
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl OhlcColumns {
    /// Locate OHLC columns by header name, falling back to positions 1..=4.
    fn resolve(headers: &StringRecord) -> Self {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |aliases: &[&str]| {
            names
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, n)| aliases.contains(&n.as_str()))
                .map(|(i, _)| i)
        };

        match (
            find(&["open", "o"]),
            find(&["high", "h"]),
            find(&["low", "l"]),
            find(&["close", "c"]),
        ) {
            (Some(open), Some(high), Some(low), Some(close)) => Self {
                open,
                high,
                low,
                close,
            },
            _ => {
                debug!("OHLC headers not found in {:?}, using positional columns", names);
                Self {
                    open: 1,
                    high: 2,
                    low: 3,
                    close: 4,
                }
            }
        }
    }

    fn max_index(&self) -> usize {
        self.open.max(self.high).max(self.low).max(self.close)
    }
}

fn parse_price(
    record: &StringRecord,
    index: usize,
    column: &str,
    path: &Path,
    row: usize,
) -> Result<f64> {
    let raw = record.get(index).unwrap_or_default();
    let value = raw.parse::<f64>().map_err(|_| {
        StockError::malformed(path, row, format!("non-numeric {} value '{}'", column, raw))
    })?;
    if !value.is_finite() {
        return Err(StockError::malformed(
            path,
            row,
            format!("non-finite {} value '{}'", column, raw),
        ));
    }
    Ok(value)
}

fn open_csv(path: &Path) -> Result<File> {
    if !path.is_file() {
        return Err(StockError::DataNotFound {
            path: path.to_path_buf(),
        });
    }
    File::open(path).map_err(|e| {
        debug!("Failed to open {}: {}", path.display(), e);
        StockError::DataNotFound {
            path: path.to_path_buf(),
        }
    })
}

/// Load one price series from a CSV file.
///
/// Records keep the order in which they appear in the file. Any row that cannot
/// be read as a timestamp followed by four numeric prices fails the whole file.
pub fn load_series(
    path: impl AsRef<Path>,
    granularity: Granularity,
    config: &DataConfig,
) -> Result<PriceSeries> {
    let path = path.as_ref();
    info!("Loading {} series from: {}", granularity, path.display());

    let file = open_csv(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(config.delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| StockError::malformed(path, 0, format!("unreadable header: {}", e)))?
        .clone();
    let columns = OhlcColumns::resolve(&headers);
    debug!(
        "Time key column '{}' relabelled as '{}'",
        headers.get(0).unwrap_or_default(),
        PriceSeries::KEY_LABEL
    );

    let mut dates = DateParser::new(config.date_format.as_deref());
    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let record =
            result.map_err(|e| StockError::malformed(path, row, format!("unreadable row: {}", e)))?;

        if record.len() <= columns.max_index() {
            return Err(StockError::malformed(
                path,
                row,
                format!(
                    "expected at least {} columns, found {}",
                    columns.max_index() + 1,
                    record.len()
                ),
            ));
        }

        let raw_date = record.get(0).unwrap_or_default();
        let timestamp = dates.parse(raw_date).ok_or_else(|| {
            StockError::malformed(path, row, format!("could not parse date '{}'", raw_date))
        })?;

        records.push(PriceRecord::new(
            timestamp,
            parse_price(&record, columns.open, "open", path, row)?,
            parse_price(&record, columns.high, "high", path, row)?,
            parse_price(&record, columns.low, "low", path, row)?,
            parse_price(&record, columns.close, "close", path, row)?,
        ));
    }

    if records.is_empty() {
        return Err(StockError::malformed(path, 0, "no data rows"));
    }

    let series = PriceSeries::new(granularity, records);

    let duplicates = series.duplicate_count();
    if duplicates > 0 {
        warn!(
            "{} has {} duplicate timestamps",
            path.display(),
            duplicates
        );
    }

    info!(
        "Loaded {} records from {} to {}",
        series.len(),
        series
            .earliest()
            .map(|t| t.to_string())
            .unwrap_or_default(),
        series.latest().map(|t| t.to_string()).unwrap_or_default()
    );

    Ok(series)
}

/// Both series of one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolData {
    pub daily: PriceSeries,
    pub intraday: PriceSeries,
}

impl SymbolData {
    /// Series at the requested granularity.
    pub fn series(&self, granularity: Granularity) -> &PriceSeries {
        match granularity {
            Granularity::Daily => &self.daily,
            Granularity::IntradayExtended => &self.intraday,
        }
    }
}

/// Reads the daily and intraday series of a symbol from the base directory.
///
/// Each call re-reads the files; nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct StockDataLoader {
    config: DataConfig,
}

impl StockDataLoader {
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Backing file path for a symbol at one granularity.
    pub fn path_for(&self, symbol: &str, granularity: Granularity) -> PathBuf {
        series_path(&self.config.base_dir, symbol, granularity)
    }

    /// Load both series for a symbol.
    pub fn load_symbol(&self, symbol: &str) -> Result<SymbolData> {
        info!("Loading {} from {}", symbol, self.config.base_dir.display());

        let daily = load_series(
            self.path_for(symbol, Granularity::Daily),
            Granularity::Daily,
            &self.config,
        )?;
        let intraday = load_series(
            self.path_for(symbol, Granularity::IntradayExtended),
            Granularity::IntradayExtended,
            &self.config,
        )?;

        Ok(SymbolData { daily, intraday })
    }
}

/// SHA-256 checksum of a data file, hex encoded.
pub fn file_checksum(path: impl AsRef<Path>) -> Result<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(format!("{:x}", hasher.finalize()))
}
