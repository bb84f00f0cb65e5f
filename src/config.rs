//! Configuration file support for the viewer.
//!
//! The symbol set, data location and view defaults are read from a TOML file so
//! they can change without rebuilding.

use crate::data::{DataConfig, DEFAULT_BASE_DIR};
use crate::error::{Result, StockError};
use crate::filter::AnchorMode;
use crate::types::{PriceField, Symbol};
use crate::window::LookbackWindow;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Complete viewer configuration loaded from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Data settings.
    #[serde(default)]
    pub data: DataSettings,
    /// View defaults.
    #[serde(default)]
    pub view: ViewSettings,
    /// Configured symbols, in display order.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<Symbol>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data: DataSettings::default(),
            view: ViewSettings::default(),
            symbols: default_symbols(),
        }
    }
}

fn default_symbols() -> Vec<Symbol> {
    vec![
        Symbol::new("AAPL", "Apple"),
        Symbol::new("NVDA", "Nvidia"),
        Symbol::new("TSLA", "Tesla"),
        Symbol::new("IBM", "IBM"),
    ]
}

/// Data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    /// Directory holding the CSV files.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Date format in CSV.
    #[serde(default)]
    pub date_format: Option<String>,
    /// CSV delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_base_dir() -> PathBuf { PathBuf::from(DEFAULT_BASE_DIR) }
fn default_delimiter() -> char { ',' }

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            date_format: None,
            delimiter: ',',
        }
    }
}

/// View defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Symbol shown when none is requested.
    #[serde(default = "default_symbol")]
    pub default_symbol: String,
    /// Price field shown when none is requested.
    #[serde(default = "default_field")]
    pub default_field: PriceField,
    /// Lookback window shown when none is requested.
    #[serde(default)]
    pub default_window: LookbackWindow,
    /// How the most recent date of a series is chosen.
    #[serde(default)]
    pub anchor: AnchorMode,
    /// Longest window that still reads the intraday series.
    #[serde(default = "default_intraday_through")]
    pub intraday_through: LookbackWindow,
    /// Chart width in columns.
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,
    /// Chart height in rows.
    #[serde(default = "default_chart_height")]
    pub chart_height: usize,
    /// Load symbols on first use instead of at startup.
    #[serde(default)]
    pub lazy: bool,
}

fn default_symbol() -> String { "AAPL".to_string() }
fn default_field() -> PriceField { PriceField::Close }
fn default_intraday_through() -> LookbackWindow { LookbackWindow::OneWeek }
fn default_chart_width() -> usize { 60 }
fn default_chart_height() -> usize { 12 }

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            default_symbol: default_symbol(),
            default_field: default_field(),
            default_window: LookbackWindow::default(),
            anchor: AnchorMode::default(),
            intraday_through: default_intraday_through(),
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
            lazy: false,
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = fs::read_to_string(path)?;
        let config: ViewerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| StockError::ConfigError(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(StockError::ConfigError("no symbols configured".to_string()));
        }

        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if symbol.ticker.trim().is_empty() {
                return Err(StockError::ConfigError("empty ticker".to_string()));
            }
            if !seen.insert(symbol.ticker.as_str()) {
                return Err(StockError::ConfigError(format!(
                    "duplicate ticker '{}'",
                    symbol.ticker
                )));
            }
        }

        if !seen.contains(self.view.default_symbol.as_str()) {
            return Err(StockError::ConfigError(format!(
                "default symbol '{}' is not configured",
                self.view.default_symbol
            )));
        }

        if self.view.chart_width == 0 || self.view.chart_height == 0 {
            return Err(StockError::ConfigError(
                "chart dimensions must be positive".to_string(),
            ));
        }

        if !self.data.delimiter.is_ascii() {
            return Err(StockError::ConfigError(format!(
                "delimiter '{}' is not a single-byte character",
                self.data.delimiter
            )));
        }

        Ok(())
    }

    /// Loader configuration derived from the data settings.
    pub fn data_config(&self) -> DataConfig {
        DataConfig {
            base_dir: self.data.base_dir.clone(),
            date_format: self.data.date_format.clone(),
            delimiter: self.data.delimiter as u8,
        }
    }

    /// Display name of a configured ticker.
    pub fn display_name(&self, ticker: &str) -> Option<&str> {
        self.symbols
            .iter()
            .find(|s| s.ticker == ticker)
            .map(|s| s.name.as_str())
    }

    /// Generate an example configuration file content.
    pub fn example() -> String {
        r#"# Stock viewer configuration

[data]
base_dir = "../data/"
# date_format = "%Y-%m-%d"
delimiter = ","

[view]
default_symbol = "AAPL"
default_field = "close"     # open, high, low, close
default_window = "1m"       # 1d, 1w, 1m, 3m, 1y, 5y, max
anchor = "latest"           # latest or first-stored
intraday_through = "1w"     # longest window drawn from intraday data
chart_width = 60
chart_height = 12
lazy = false

[[symbols]]
ticker = "AAPL"
name = "Apple"

[[symbols]]
ticker = "NVDA"
name = "Nvidia"

[[symbols]]
ticker = "TSLA"
name = "Tesla"

[[symbols]]
ticker = "IBM"
name = "IBM"
"#
        .to_string()
    }
}
