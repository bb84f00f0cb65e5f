//! Command-line interface for the stock viewer.

use stockview::config::ViewerConfig;
use stockview::dashboard::Dashboard;
use stockview::data::{file_checksum, load_series, series_path};
use stockview::error::{Result, StockError};
use stockview::filter::AnchorMode;
use stockview::types::{Granularity, PriceField};
use stockview::window::LookbackWindow;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "stockview.toml";

/// Stockview - chart locally stored historical stock prices in the terminal.
#[derive(Parser)]
#[command(name = "stockview")]
#[command(version)]
#[command(about = "Chart locally stored historical stock prices in the terminal")]
#[command(long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chart a symbol and show its highest and lowest value
    Show {
        /// Ticker symbol (defaults to the configured default)
        #[arg(short, long)]
        symbol: Option<String>,

        /// Price field: open, high, low or close
        #[arg(short, long)]
        field: Option<PriceField>,

        /// Lookback window: 1d, 1w, 1m, 3m, 1y, 5y, max (or 0-6)
        #[arg(short, long)]
        window: Option<LookbackWindow>,

        /// Anchor mode: latest or first-stored
        #[arg(long)]
        anchor: Option<AnchorMode>,
    },

    /// List configured symbols
    Symbols,

    /// List lookback windows and the series each one reads
    Windows,

    /// Check that the data files of every (or one) symbol load
    Validate {
        /// Only validate this ticker
        #[arg(short, long)]
        symbol: Option<String>,
    },

    /// Generate an example configuration file
    Init {
        /// Output path for config file
        #[arg(short = 'p', long, default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl Cli {
    /// Initialize logging based on verbosity level.
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Failed to set tracing subscriber: {}", e);
        }
    }

    /// Resolve the configuration: explicit file, local file, or defaults.
    fn load_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                ViewerConfig::load(DEFAULT_CONFIG_FILE)?
            }
            None => {
                info!("No configuration file, using defaults");
                ViewerConfig::default()
            }
        };

        if let Some(dir) = &self.data_dir {
            config.data.base_dir = dir.clone();
        }
        Ok(config)
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging();

    match &cli.command {
        Commands::Show {
            symbol,
            field,
            window,
            anchor,
        } => {
            let config = cli.load_config()?;
            show(&config, symbol.as_deref(), *field, *window, *anchor, cli.output)
        }
        Commands::Symbols => list_symbols(&cli.load_config()?, cli.output),
        Commands::Windows => list_windows(&cli.load_config()?, cli.output),
        Commands::Validate { symbol } => validate_data(&cli.load_config()?, symbol.as_deref()),
        Commands::Init { path } => init_config(path),
    }
}

/// Configured ticker matching `symbol` ignoring case, or `symbol` unchanged.
fn resolve_ticker(config: &ViewerConfig, symbol: &str) -> String {
    config
        .symbols
        .iter()
        .find(|s| s.ticker.eq_ignore_ascii_case(symbol))
        .map_or_else(|| symbol.to_string(), |s| s.ticker.clone())
}

fn show(
    config: &ViewerConfig,
    symbol: Option<&str>,
    field: Option<PriceField>,
    window: Option<LookbackWindow>,
    anchor: Option<AnchorMode>,
    output: OutputFormat,
) -> Result<()> {
    let mut dashboard = Dashboard::open(config)?;

    let mut selection = dashboard.default_selection();
    if let Some(symbol) = symbol {
        selection.symbol = resolve_ticker(config, symbol);
    }
    if let Some(field) = field {
        selection.field = field;
    }
    if let Some(window) = window {
        selection.window = window;
    }
    selection.anchor = anchor;

    let panel = dashboard.render(&selection)?;

    match output {
        OutputFormat::Text => println!("{}", panel.to_text()),
        OutputFormat::Json => println!("{}", panel.to_json()?),
        OutputFormat::Csv => print!("{}", panel.to_csv()?),
    }

    Ok(())
}

fn list_symbols(config: &ViewerConfig, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config.symbols)?),
        OutputFormat::Csv => {
            println!("ticker,name");
            for s in &config.symbols {
                println!("{},{}", s.ticker, s.name);
            }
        }
        OutputFormat::Text => {
            let mut builder = Builder::new();
            builder.push_record(["Ticker", "Name", "Daily", "Intraday"]);
            for s in &config.symbols {
                let present = |g: Granularity| {
                    if series_path(&config.data.base_dir, &s.ticker, g).is_file() {
                        "yes".to_string()
                    } else {
                        "missing".to_string()
                    }
                };
                builder.push_record([
                    s.ticker.clone(),
                    s.name.clone(),
                    present(Granularity::Daily),
                    present(Granularity::IntradayExtended),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()).to_string());
            println!("Data directory: {}", config.data.base_dir.display());
        }
    }
    Ok(())
}

fn list_windows(config: &ViewerConfig, output: OutputFormat) -> Result<()> {
    let through = config.view.intraday_through;
    match output {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = LookbackWindow::ALL
                .iter()
                .map(|w| {
                    serde_json::json!({
                        "index": w.index(),
                        "code": w.code(),
                        "label": w.label(),
                        "days": w.days(),
                        "granularity": w.granularity(through),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Csv => {
            println!("index,code,label,days,granularity");
            for w in LookbackWindow::ALL {
                println!(
                    "{},{},{},{},{}",
                    w.index(),
                    w.code(),
                    w.label(),
                    w.days().map(|d| d.to_string()).unwrap_or_default(),
                    w.granularity(through)
                );
            }
        }
        OutputFormat::Text => {
            let mut builder = Builder::new();
            builder.push_record(["#", "Code", "Window", "Days", "Series"]);
            for w in LookbackWindow::ALL {
                builder.push_record([
                    w.index().to_string(),
                    w.code().to_string(),
                    w.label().to_string(),
                    w.days().map(|d| d.to_string()).unwrap_or_else(|| "all".to_string()),
                    w.granularity(through).to_string(),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()).to_string());
        }
    }
    Ok(())
}

fn validate_data(config: &ViewerConfig, only: Option<&str>) -> Result<()> {
    let data_config = config.data_config();
    let symbols: Vec<_> = config
        .symbols
        .iter()
        .filter(|s| only.map_or(true, |t| s.ticker.eq_ignore_ascii_case(t)))
        .collect();

    if symbols.is_empty() {
        return Err(StockError::UnknownSymbol(only.unwrap_or_default().to_string()));
    }

    println!("Validating data in: {}", data_config.base_dir.display());

    let mut builder = Builder::new();
    builder.push_record(["Ticker", "Series", "Rows", "Start", "End", "Order", "Checksum"]);
    let mut failures = 0;

    for symbol in symbols {
        for granularity in Granularity::ALL {
            let path = series_path(&data_config.base_dir, &symbol.ticker, granularity);
            match load_series(&path, granularity, &data_config) {
                Ok(series) => {
                    let (start, end) = series
                        .date_range()
                        .map(|(s, e)| (s.to_string(), e.to_string()))
                        .unwrap_or_default();
                    let order = if series.is_sorted() {
                        "ascending"
                    } else {
                        "as stored"
                    };
                    let checksum = file_checksum(&path)?;
                    builder.push_record([
                        symbol.ticker.clone(),
                        granularity.to_string(),
                        series.len().to_string(),
                        start,
                        end,
                        order.to_string(),
                        checksum[..12].to_string(),
                    ]);
                }
                Err(e) => {
                    warn!("{}", e);
                    failures += 1;
                    builder.push_record([
                        symbol.ticker.clone(),
                        granularity.to_string(),
                        "-".to_string(),
                        "-".to_string(),
                        "-".to_string(),
                        "-".to_string(),
                        e.to_string().red().to_string(),
                    ]);
                }
            }
        }
    }

    println!("{}", builder.build().with(Style::rounded()).to_string());

    if failures > 0 {
        return Err(StockError::InvalidInput(format!(
            "{} data file(s) failed validation",
            failures
        )));
    }

    println!("\nValidation: {}", "PASSED".green().bold());
    Ok(())
}

fn init_config(path: &PathBuf) -> Result<()> {
    if path.exists() {
        return Err(StockError::ConfigError(format!(
            "{} already exists",
            path.display()
        )));
    }
    std::fs::write(path, ViewerConfig::example())?;
    println!("Created example configuration: {}", path.display());
    Ok(())
}
