//! In-memory stores of loaded symbol data.
//!
//! [`StockStore`] loads every configured symbol up front and is read-only
//! afterwards. [`LazyStore`] loads a symbol on first access and memoizes it.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::data::{StockDataLoader, SymbolData};
use crate::error::{Result, StockError};
use crate::filter::{filter_time, AnchorMode, FilteredView};
use crate::types::Symbol;
use crate::window::LookbackWindow;

/// Filter a symbol's data for one lookback window.
///
/// [`LookbackWindow::Max`] returns the full series, sorted ascending.
pub fn select_view(
    data: &SymbolData,
    window: LookbackWindow,
    intraday_through: LookbackWindow,
    anchor: AnchorMode,
) -> Result<FilteredView> {
    let series = data.series(window.granularity(intraday_through));
    match window.days() {
        Some(days) => filter_time(series, days, anchor),
        None => Ok(FilteredView::unfiltered(series)),
    }
}

/// Eagerly loaded, immutable map of symbol data.
#[derive(Debug, Clone)]
pub struct StockStore {
    symbols: Vec<Symbol>,
    data: HashMap<String, SymbolData>,
}

impl StockStore {
    /// Load every configured symbol; the first failure aborts.
    pub fn load(config: &ViewerConfig) -> Result<Self> {
        let loader = StockDataLoader::new(config.data_config());
        let mut data = HashMap::with_capacity(config.symbols.len());

        for symbol in &config.symbols {
            let loaded = loader.load_symbol(&symbol.ticker)?;
            data.insert(symbol.ticker.clone(), loaded);
        }

        info!("Loaded {} symbols", data.len());
        Ok(Self {
            symbols: config.symbols.clone(),
            data,
        })
    }

    /// Build a store from already loaded data.
    pub fn from_data(entries: Vec<(Symbol, SymbolData)>) -> Self {
        let mut symbols = Vec::with_capacity(entries.len());
        let mut data = HashMap::with_capacity(entries.len());
        for (symbol, symbol_data) in entries {
            data.insert(symbol.ticker.clone(), symbol_data);
            symbols.push(symbol);
        }
        Self { symbols, data }
    }

    /// Configured symbols, in display order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn display_name(&self, ticker: &str) -> Option<&str> {
        self.symbols
            .iter()
            .find(|s| s.ticker == ticker)
            .map(|s| s.name.as_str())
    }

    pub fn get(&self, ticker: &str) -> Result<&SymbolData> {
        self.data
            .get(ticker)
            .ok_or_else(|| StockError::UnknownSymbol(ticker.to_string()))
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.data.contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Filtered view of a symbol for one lookback window.
    pub fn select(
        &self,
        ticker: &str,
        window: LookbackWindow,
        intraday_through: LookbackWindow,
        anchor: AnchorMode,
    ) -> Result<FilteredView> {
        select_view(self.get(ticker)?, window, intraday_through, anchor)
    }
}

/// Store that loads each symbol the first time it is requested.
#[derive(Debug)]
pub struct LazyStore {
    loader: StockDataLoader,
    symbols: Vec<Symbol>,
    cache: HashMap<String, SymbolData>,
}

impl LazyStore {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            loader: StockDataLoader::new(config.data_config()),
            symbols: config.symbols.clone(),
            cache: HashMap::new(),
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn display_name(&self, ticker: &str) -> Option<&str> {
        self.symbols
            .iter()
            .find(|s| s.ticker == ticker)
            .map(|s| s.name.as_str())
    }

    /// Whether a symbol has already been loaded.
    pub fn is_loaded(&self, ticker: &str) -> bool {
        self.cache.contains_key(ticker)
    }

    /// Data for a configured symbol, loading it on first access.
    pub fn get(&mut self, ticker: &str) -> Result<&SymbolData> {
        if !self.symbols.iter().any(|s| s.ticker == ticker) {
            return Err(StockError::UnknownSymbol(ticker.to_string()));
        }

        if !self.cache.contains_key(ticker) {
            let loaded = self.loader.load_symbol(ticker)?;
            self.cache.insert(ticker.to_string(), loaded);
        } else {
            debug!("Using cached data for {}", ticker);
        }

        self.cache
            .get(ticker)
            .ok_or_else(|| StockError::UnknownSymbol(ticker.to_string()))
    }

    pub fn select(
        &mut self,
        ticker: &str,
        window: LookbackWindow,
        intraday_through: LookbackWindow,
        anchor: AnchorMode,
    ) -> Result<FilteredView> {
        select_view(self.get(ticker)?, window, intraday_through, anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PriceSeries;
    use crate::types::{Granularity, PriceRecord};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn symbol_data() -> SymbolData {
        let day = |d| NaiveDate::from_ymd_opt(2021, 1, d).unwrap();
        let daily = (1..=20)
            .rev()
            .map(|d| PriceRecord::new(day(d).and_hms_opt(0, 0, 0).unwrap(), 1.0, 2.0, 0.5, d as f64))
            .collect();
        let intraday = (10..=16)
            .rev()
            .map(|h| PriceRecord::new(day(20).and_hms_opt(h, 0, 0).unwrap(), 1.0, 2.0, 0.5, h as f64))
            .collect();
        SymbolData {
            daily: PriceSeries::new(Granularity::Daily, daily),
            intraday: PriceSeries::new(Granularity::IntradayExtended, intraday),
        }
    }

    #[test]
    fn test_select_uses_window_granularity() {
        let store = StockStore::from_data(vec![(Symbol::new("AAPL", "Apple"), symbol_data())]);

        let view = store
            .select("AAPL", LookbackWindow::OneDay, LookbackWindow::OneWeek, AnchorMode::Latest)
            .unwrap();
        assert_eq!(view.granularity(), Granularity::IntradayExtended);
        assert_eq!(view.len(), 7);

        let view = store
            .select("AAPL", LookbackWindow::OneMonth, LookbackWindow::OneWeek, AnchorMode::Latest)
            .unwrap();
        assert_eq!(view.granularity(), Granularity::Daily);
        assert_eq!(view.len(), 20);
    }

    #[test]
    fn test_select_max_is_unfiltered() {
        let store = StockStore::from_data(vec![(Symbol::new("AAPL", "Apple"), symbol_data())]);
        let view = store
            .select("AAPL", LookbackWindow::Max, LookbackWindow::OneWeek, AnchorMode::Latest)
            .unwrap();
        assert!(view.window().is_none());
        assert_eq!(view.len(), 20);
        assert!(view.records()[0].timestamp < view.records()[19].timestamp);
    }

    #[test]
    fn test_unknown_symbol() {
        let store = StockStore::from_data(vec![(Symbol::new("AAPL", "Apple"), symbol_data())]);
        assert!(matches!(store.get("GME"), Err(StockError::UnknownSymbol(_))));
        assert_eq!(store.display_name("AAPL"), Some("Apple"));
        assert!(store.contains("AAPL"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_eager_load_fails_on_missing_files() {
        let dir = TempDir::new().unwrap();
        let mut config = ViewerConfig::default();
        config.data.base_dir = dir.path().to_path_buf();
        assert!(matches!(
            StockStore::load(&config),
            Err(StockError::DataNotFound { .. })
        ));
    }

    #[test]
    fn test_lazy_store_memoizes() {
        let dir = TempDir::new().unwrap();
        let daily = dir.path().join("IBM_TIME_SERIES_DAILY.csv");
        std::fs::write(&daily, "timestamp,open,high,low,close\n2021-10-29,1,2,0.5,1.5\n").unwrap();
        std::fs::write(
            dir.path().join("IBM_TIME_SERIES_INTRADAY_EXTENDED.csv"),
            "time,open,high,low,close\n2021-10-29 20:00:00,1,2,0.5,1.5\n",
        )
        .unwrap();

        let mut config = ViewerConfig::default();
        config.data.base_dir = dir.path().to_path_buf();
        let mut store = LazyStore::new(&config);

        assert!(!store.is_loaded("IBM"));
        assert_eq!(store.get("IBM").unwrap().daily.len(), 1);
        assert!(store.is_loaded("IBM"));

        // Served from memory even after the file disappears
        std::fs::remove_file(&daily).unwrap();
        assert_eq!(store.get("IBM").unwrap().daily.len(), 1);

        assert!(matches!(store.get("AAPL"), Err(StockError::DataNotFound { .. })));
        assert!(matches!(store.get("GME"), Err(StockError::UnknownSymbol(_))));
    }
}
