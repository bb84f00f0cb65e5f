//! Presentation glue: turns a user selection into a rendered panel.
//!
//! A [`Selection`] names a symbol, a price field and a lookback window. The
//! [`Dashboard`] picks the series granularity for the window, filters it, and
//! produces a [`Panel`] holding the chart and the highest/lowest labels.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

use crate::config::{ViewSettings, ViewerConfig};
use crate::error::{Result, StockError};
use crate::filter::{AnchorMode, FilteredView};
use crate::stats::{format_pct, format_usd, WindowSummary};
use crate::store::{LazyStore, StockStore};
use crate::types::{Granularity, PriceField, Symbol};
use crate::viz::{render_chart, sparkline};
use crate::window::LookbackWindow;

/// What the user asked to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub symbol: String,
    pub field: PriceField,
    pub window: LookbackWindow,
    /// Overrides the configured anchor mode.
    pub anchor: Option<AnchorMode>,
}

impl Selection {
    pub fn new(symbol: impl Into<String>, field: PriceField, window: LookbackWindow) -> Self {
        Self {
            symbol: symbol.into(),
            field,
            window,
            anchor: None,
        }
    }
}

/// Rendered output for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    pub symbol: Symbol,
    pub field: PriceField,
    pub window: LookbackWindow,
    pub granularity: Granularity,
    pub summary: Option<WindowSummary>,
    pub view: FilteredView,
    #[serde(skip)]
    pub chart: String,
}

impl Panel {
    /// Text form: chart, then the highest and lowest value labels.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.symbol.name.bold());
        let _ = writeln!(
            out,
            "{} · {} data",
            self.window.label(),
            self.granularity
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.chart);
        let _ = writeln!(out);

        match &self.summary {
            Some(summary) => {
                let _ = writeln!(
                    out,
                    "  Highest value: {}",
                    format_usd(summary.highest).green().bold()
                );
                let _ = writeln!(
                    out,
                    "  Lowest value:  {}",
                    format_usd(summary.lowest).red().bold()
                );
                if let Some(change) = summary.change_pct() {
                    let _ = writeln!(out, "  Change:        {}", format_pct(change));
                }
                let _ = write!(
                    out,
                    "  Records:       {}  {}",
                    summary.count,
                    sparkline(&self.view.values(self.field), 20)
                );
            }
            None => {
                let _ = write!(out, "  No records in the selected window");
            }
        }

        out
    }

    /// Pretty JSON of the panel (without the rendered chart).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Filtered records as CSV with a `Date` key column.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["Date", "open", "high", "low", "close"])?;
        for r in self.view.records() {
            writer.write_record([
                r.timestamp.to_string(),
                r.open.to_string(),
                r.high.to_string(),
                r.low.to_string(),
                r.close.to_string(),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StockError::IoError(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| StockError::InvalidInput(e.to_string()))
    }
}

#[derive(Debug)]
enum Backend {
    Eager(StockStore),
    Lazy(LazyStore),
}

/// Wires selections to the store, filter, statistics and chart rendering.
#[derive(Debug)]
pub struct Dashboard {
    backend: Backend,
    settings: ViewSettings,
}

impl Dashboard {
    /// Build from a configuration, loading eagerly unless `view.lazy` is set.
    pub fn open(config: &ViewerConfig) -> Result<Self> {
        config.validate()?;
        let backend = if config.view.lazy {
            Backend::Lazy(LazyStore::new(config))
        } else {
            Backend::Eager(StockStore::load(config)?)
        };
        Ok(Self {
            backend,
            settings: config.view.clone(),
        })
    }

    /// Build from an already loaded store.
    pub fn with_store(store: StockStore, settings: ViewSettings) -> Self {
        Self {
            backend: Backend::Eager(store),
            settings,
        }
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn symbols(&self) -> &[Symbol] {
        match &self.backend {
            Backend::Eager(store) => store.symbols(),
            Backend::Lazy(store) => store.symbols(),
        }
    }

    /// Selection built from the configured defaults.
    pub fn default_selection(&self) -> Selection {
        Selection::new(
            self.settings.default_symbol.clone(),
            self.settings.default_field,
            self.settings.default_window,
        )
    }

    /// Filtered view for a selection.
    pub fn view(&mut self, selection: &Selection) -> Result<FilteredView> {
        let anchor = selection.anchor.unwrap_or(self.settings.anchor);
        let through = self.settings.intraday_through;
        match &mut self.backend {
            Backend::Eager(store) => store.select(&selection.symbol, selection.window, through, anchor),
            Backend::Lazy(store) => store.select(&selection.symbol, selection.window, through, anchor),
        }
    }

    /// Render the panel for a selection.
    pub fn render(&mut self, selection: &Selection) -> Result<Panel> {
        let view = self.view(selection)?;

        let symbol = self
            .symbols()
            .iter()
            .find(|s| s.ticker == selection.symbol)
            .cloned()
            .ok_or_else(|| StockError::UnknownSymbol(selection.symbol.clone()))?;

        let chart = render_chart(
            &symbol.name,
            &view,
            selection.field,
            self.settings.chart_width,
            self.settings.chart_height,
        );

        Ok(Panel {
            summary: WindowSummary::from_view(&view, selection.field),
            granularity: view.granularity(),
            field: selection.field,
            window: selection.window,
            symbol,
            view,
            chart,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SymbolData;
    use crate::series::PriceSeries;
    use crate::types::PriceRecord;
    use chrono::NaiveDate;

    fn dashboard() -> Dashboard {
        let day = |d| NaiveDate::from_ymd_opt(2021, 10, d).unwrap();
        let daily = (1..=29)
            .rev()
            .map(|d| {
                let close = 140.0 + d as f64 * 0.5;
                PriceRecord::new(day(d).and_hms_opt(0, 0, 0).unwrap(), close, close + 1.0, close - 1.0, close)
            })
            .collect();
        let intraday = (4..=20)
            .rev()
            .map(|h| {
                let close = 149.0 + h as f64 * 0.1;
                PriceRecord::new(day(29).and_hms_opt(h, 0, 0).unwrap(), close, close, close, close)
            })
            .collect();
        let store = StockStore::from_data(vec![(
            Symbol::new("AAPL", "Apple"),
            SymbolData {
                daily: PriceSeries::new(Granularity::Daily, daily),
                intraday: PriceSeries::new(Granularity::IntradayExtended, intraday),
            },
        )]);
        Dashboard::with_store(store, ViewSettings::default())
    }

    #[test]
    fn test_render_daily_window() {
        let mut dash = dashboard();
        let panel = dash
            .render(&Selection::new("AAPL", PriceField::Close, LookbackWindow::OneMonth))
            .unwrap();

        assert_eq!(panel.granularity, Granularity::Daily);
        let summary = panel.summary.as_ref().unwrap();
        assert_eq!(summary.count, 29);
        assert_eq!(summary.highest, 154.5);
        assert_eq!(summary.lowest, 140.5);

        colored::control::set_override(false);
        let text = panel.to_text();
        assert!(text.contains("Highest value: 154.50 USD"));
        assert!(text.contains("Lowest value:  140.50 USD"));
        assert!(text.contains("Apple"));
    }

    #[test]
    fn test_render_intraday_window() {
        let mut dash = dashboard();
        let panel = dash
            .render(&Selection::new("AAPL", PriceField::High, LookbackWindow::OneDay))
            .unwrap();
        assert_eq!(panel.granularity, Granularity::IntradayExtended);
        assert_eq!(panel.view.len(), 17);
    }

    #[test]
    fn test_anchor_override() {
        let mut dash = dashboard();
        let mut selection = Selection::new("AAPL", PriceField::Close, LookbackWindow::OneWeek);
        selection.anchor = Some(AnchorMode::FirstStored);
        let view = dash.view(&selection).unwrap();
        assert_eq!(view.window().unwrap().end, NaiveDate::from_ymd_opt(2021, 10, 29).unwrap());
    }

    #[test]
    fn test_unknown_symbol() {
        let mut dash = dashboard();
        let err = dash
            .render(&Selection::new("GME", PriceField::Close, LookbackWindow::Max))
            .unwrap_err();
        assert!(matches!(err, StockError::UnknownSymbol(_)));
    }

    #[test]
    fn test_default_selection() {
        let dash = dashboard();
        let selection = dash.default_selection();
        assert_eq!(selection.symbol, "AAPL");
        assert_eq!(selection.field, PriceField::Close);
        assert_eq!(selection.window, LookbackWindow::OneMonth);
    }

    #[test]
    fn test_panel_exports() {
        let mut dash = dashboard();
        let panel = dash
            .render(&Selection::new("AAPL", PriceField::Open, LookbackWindow::OneDay))
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&panel.to_json().unwrap()).unwrap();
        assert_eq!(json["symbol"]["ticker"], "AAPL");
        assert_eq!(json["window"], "1d");
        assert!(json.get("chart").is_none());

        let csv = panel.to_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Date,open,high,low,close"));
        assert_eq!(lines.count(), 17);
    }
}
