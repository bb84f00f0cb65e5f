//! Stockview - a terminal viewer for locally stored historical stock prices.
//!
//! # Overview
//!
//! Each configured symbol is backed by two CSV files, a daily series and an
//! intraday-extended series. The viewer loads them, trims the relevant series
//! to a lookback window anchored at its most recent date, and renders a line
//! chart of one price field together with the highest and lowest value.
//!
//! # Quick Start
//!
//! ```no_run
//! use stockview::{
//!     config::ViewerConfig,
//!     dashboard::{Dashboard, Selection},
//!     types::PriceField,
//!     window::LookbackWindow,
//! };
//!
//! let config = ViewerConfig::default();
//! let mut dashboard = Dashboard::open(&config).unwrap();
//!
//! let selection = Selection::new("AAPL", PriceField::Close, LookbackWindow::ThreeMonths);
//! let panel = dashboard.render(&selection).unwrap();
//! println!("{}", panel.to_text());
//! ```
//!
//! # Filtering a single series
//!
//! ```no_run
//! use stockview::data::{load_series, DataConfig};
//! use stockview::filter::{filter_time, AnchorMode};
//! use stockview::types::Granularity;
//!
//! let series = load_series(
//!     "../data/AAPL_TIME_SERIES_DAILY.csv",
//!     Granularity::Daily,
//!     &DataConfig::default(),
//! )
//! .unwrap();
//! let last_week = filter_time(&series, 7, AnchorMode::Latest).unwrap();
//! println!("{} records", last_week.len());
//! ```
//!
//! # Modules
//!
//! - [`types`]: Symbols, price records, granularities and price fields
//! - [`series`]: Price series kept in stored order
//! - [`data`]: CSV loading of the per-symbol files
//! - [`filter`]: Lookback window filtering
//! - [`window`]: Discrete lookback choices and the granularity rule
//! - [`stats`]: Highest/lowest and other window aggregates
//! - [`store`]: Eager and lazily memoized symbol stores
//! - [`viz`]: Terminal sparklines and line charts
//! - [`dashboard`]: Selection to rendered panel
//! - [`config`]: TOML configuration file support

pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod filter;
pub mod series;
pub mod stats;
pub mod store;
pub mod types;
pub mod viz;
pub mod window;

// Re-exports for convenience
pub use config::ViewerConfig;
pub use dashboard::{Dashboard, Panel, Selection};
pub use data::{file_checksum, load_series, series_path, DataConfig, StockDataLoader, SymbolData};
pub use error::{Result, StockError};
pub use filter::{anchor_date, filter_time, time_window, AnchorMode, FilteredView, TimeWindow};
pub use series::PriceSeries;
pub use stats::{format_usd, WindowSummary};
pub use store::{LazyStore, StockStore};
pub use types::{Granularity, PriceField, PriceRecord, Symbol};
pub use window::LookbackWindow;
