//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::adapters::csv_adapter::CsvPriceSource;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{analyze, Analysis, SignalRow};
use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::config::{AppConfig, Overrides};
use crate::domain::config_validation::validate_app_config;
use crate::domain::error::FxSignalError;
use crate::domain::metrics::TradeSummary;
use crate::domain::ohlcv::PriceBar;
use crate::domain::position::Position;
use crate::domain::signal::{Signal, SignalPolicy};
use crate::domain::sweep::{best_by_final_capital, run_sweep, SweepPoint};
use crate::ports::data_port::PriceSource;

#[derive(Parser, Debug)]
#[command(
    name = "fxsignal",
    about = "EMA/RSI signal generator and backtester for currency pairs"
)]
pub struct Cli {
    /// trace, debug, info, warn or error
    #[arg(long, global = true, default_value = "info")]
    pub log_level: Level,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    /// Directory holding the price CSV files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Currency pair, e.g. USD/JPY
    #[arg(long)]
    pub symbol: Option<String>,
    /// threshold, edge-momentum or strict-momentum
    #[arg(long)]
    pub policy: Option<SignalPolicy>,
    /// Validate and print the resolved settings without loading data
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            symbol: self.symbol.clone(),
            policy: self.policy,
            data_dir: self.data_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify the series and replay the signals against a simulated account
    Backtest(RunArgs),
    /// Print the latest signal and every Buy/Sell bar
    Signals(RunArgs),
    /// Backtest every point of the configured parameter grid
    Sweep(RunArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.log_level);

    let outcome = match cli.command {
        Command::Backtest(args) => run_command(&args, |source, config| {
            let report = run_backtest_pipeline(source, config)?;
            print_backtest_report(config, &report);
            Ok(())
        }),
        Command::Signals(args) => run_command(&args, |source, config| {
            let analysis = run_signals_pipeline(source, config)?;
            print_latest_signal(&analysis);
            print_signal_list(&analysis);
            Ok(())
        }),
        Command::Sweep(args) => run_command(&args, |source, config| {
            let points = run_sweep_pipeline(source, config)?;
            print_sweep(&points);
            Ok(())
        }),
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            (&e).into()
        }
    }
}

/// Installs the stderr subscriber. A second call keeps the first subscriber.
pub fn init_logging(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("logging already initialised");
    }
}

fn report_error(err: &FxSignalError) {
    match err {
        FxSignalError::DataUnavailable { .. } => {
            eprintln!("error: Failed to fetch data. {err}");
        }
        _ => eprintln!("error: {err}"),
    }
}

/// Loads the file, applies command-line overrides and validates the result.
pub fn load_config(path: &Path, overrides: &Overrides) -> Result<AppConfig, FxSignalError> {
    info!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    let mut config = AppConfig::from_port(&adapter)?;
    config.apply_overrides(overrides);
    validate_app_config(&config)?;
    Ok(config)
}

fn run_command<F>(args: &RunArgs, action: F) -> Result<(), FxSignalError>
where
    F: FnOnce(&dyn PriceSource, &AppConfig) -> Result<(), FxSignalError>,
{
    let config = load_config(&args.config, &args.overrides())?;
    if args.dry_run {
        print_resolved_config(&config);
        return Ok(());
    }
    let source = CsvPriceSource::new(config.data.data_dir.clone());
    action(&source, &config)
}

fn run_validate(path: &Path) -> Result<(), FxSignalError> {
    let config = load_config(path, &Overrides::default())?;
    println!("Config validated successfully");
    print_resolved_config(&config);
    Ok(())
}

/// Everything the backtest command reports.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub analysis: Analysis,
    pub result: BacktestResult,
    pub summary: TradeSummary,
}

pub fn fetch_series(
    source: &dyn PriceSource,
    config: &AppConfig,
) -> Result<Vec<PriceBar>, FxSignalError> {
    let symbol = &config.data.symbol;
    let interval = &config.data.interval;
    match source.fetch_series(symbol, interval) {
        Ok(bars) => {
            info!(symbol = %symbol, interval = %interval, bars = bars.len(), "fetched price series");
            Ok(bars)
        }
        Err(e) => {
            error!(symbol = %symbol, "failed to fetch data: {e}");
            Err(e)
        }
    }
}

pub fn run_signals_pipeline(
    source: &dyn PriceSource,
    config: &AppConfig,
) -> Result<Analysis, FxSignalError> {
    let bars = fetch_series(source, config)?;
    analyze(&bars, &config.indicators, &config.classifier)
}

pub fn run_backtest_pipeline(
    source: &dyn PriceSource,
    config: &AppConfig,
) -> Result<BacktestReport, FxSignalError> {
    let analysis = run_signals_pipeline(source, config)?;
    let result = run_backtest(&analysis.rows, &config.backtest)?;
    let summary = TradeSummary::compute(&result.account);
    Ok(BacktestReport {
        analysis,
        result,
        summary,
    })
}

pub fn run_sweep_pipeline(
    source: &dyn PriceSource,
    config: &AppConfig,
) -> Result<Vec<SweepPoint>, FxSignalError> {
    let analysis = run_signals_pipeline(source, config)?;
    run_sweep(&analysis.rows, &config.sweep, &config.backtest)
}

fn format_optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "-".to_string(),
    }
}

pub fn format_signal_row(row: &SignalRow) -> String {
    format!(
        "{}  {:<4}  {:>12.5}",
        row.timestamp.format("%Y-%m-%d %H:%M:%S"),
        row.signal.to_string(),
        row.close
    )
}

fn print_resolved_config(config: &AppConfig) {
    println!("Data:");
    println!("  symbol:   {}", config.data.symbol);
    println!("  interval: {}", config.data.interval);
    println!("  data_dir: {}", config.data.data_dir.display());
    println!("Indicators:");
    println!(
        "  EMA({}) / EMA({}) / RSI({})",
        config.indicators.fast_window, config.indicators.slow_window, config.indicators.rsi_window
    );
    println!("Signals:");
    println!("  policy:         {}", config.classifier.policy);
    println!(
        "  RSI limits:     buy < {}, sell > {}",
        config.classifier.rsi_buy_ceiling, config.classifier.rsi_sell_floor
    );
    println!("  daily throttle: {}", config.classifier.daily_throttle);
    println!("Backtest:");
    let b = &config.backtest;
    println!("  initial capital:   {:.2}", b.initial_capital);
    println!("  position size:     {:.2}%", b.position_size_pct * 100.0);
    println!(
        "  take profit / stop: {:.2}% / {:.2}%",
        b.take_profit_threshold * 100.0,
        b.stop_loss_threshold * 100.0
    );
    println!("  fee model:         {}", b.fee_model);
    println!("  one trade per day: {}", b.one_trade_per_day);
    println!("  end of data:       {}", b.end_of_data);
    println!("Sweep: {} configurations", config.sweep.size());
}

fn print_latest_signal(analysis: &Analysis) {
    match analysis.latest() {
        Some(row) => {
            println!("Latest signal: {} at {}", row.signal, row.timestamp);
            println!(
                "  close {:.5}  EMA fast {}  EMA slow {}  RSI {}",
                row.close,
                format_optional(row.ema_fast, 5),
                format_optional(row.ema_slow, 5),
                format_optional(row.rsi, 2)
            );
        }
        None => println!("No price bars available"),
    }
}

fn print_signal_list(analysis: &Analysis) {
    let actionable = analysis.actionable();
    println!(
        "\n{} signals ({} buy, {} sell) over {} bars",
        actionable.len(),
        analysis.count(Signal::Buy),
        analysis.count(Signal::Sell),
        analysis.len()
    );
    for row in actionable {
        println!("  {}", format_signal_row(row));
    }
}

fn print_backtest_report(config: &AppConfig, report: &BacktestReport) {
    print_latest_signal(&report.analysis);
    println!(
        "Signals: {} buy, {} sell",
        report.analysis.count(Signal::Buy),
        report.analysis.count(Signal::Sell)
    );

    let trades = report.result.trades();
    if trades.is_empty() {
        println!("\nNo trades were executed.");
    } else {
        println!("\n=== Trades ({}) ===", config.data.symbol);
        for t in trades {
            println!(
                "  {} -> {}  {:<5} {:>10.5} -> {:>10.5}  net {:>9.2}  {:>6.2}%  {}d  {}",
                t.entry_time.format("%Y-%m-%d %H:%M"),
                t.exit_time.format("%Y-%m-%d %H:%M"),
                t.direction.to_string(),
                t.entry_price,
                t.exit_price,
                t.net_pnl,
                t.pct_return,
                t.days_held(),
                t.exit_reason
            );
        }
    }

    if let Some(open) = &report.result.open_position {
        let last_close = report.analysis.latest().map(|r| r.close);
        println!("\n{}", format_open_position(open, last_close));
    }

    println!("\n=== Summary ===");
    for line in format_summary(&report.summary) {
        println!("{line}");
    }
}

/// One line for a position the data ran out on, valued at the last close.
pub fn format_open_position(open: &Position, last_close: Option<f64>) -> String {
    let mut line = format!(
        "Open position: {} since {} at {:.5} ({:.2} allocated)",
        open.direction,
        open.entry_time.format("%Y-%m-%d %H:%M"),
        open.entry_price,
        open.capital_allocated
    );
    if let Some(close) = last_close {
        line.push_str(&format!(
            ", unrealized {:.2} at {:.5}",
            open.unrealized_pnl(close),
            close
        ));
    }
    line
}

pub fn format_summary(s: &TradeSummary) -> Vec<String> {
    vec![
        format!("Trades:             {}", s.trade_count),
        format!(
            "Won / Lost / Even:  {} / {} / {}",
            s.trades_won, s.trades_lost, s.trades_breakeven
        ),
        format!("Win Rate:           {:.1}%", s.win_rate * 100.0),
        format!("Profit Factor:      {:.2}", s.profit_factor),
        format!("Avg Trade Return:   {:.2}%", s.avg_trade_return_pct),
        format!("Largest Win:        {:.2}", s.largest_win),
        format!("Largest Loss:       -{:.2}", s.largest_loss),
        format!("Avg Days Held:      {:.1}", s.avg_days_held),
        format!("Total Fees:         {:.2}", s.total_fees),
        format!("Total Net PnL:      {:.2}", s.total_net_pnl),
        format!(
            "Max Drawdown:       -{:.2}% over {} bars",
            s.max_drawdown * 100.0,
            s.max_drawdown_duration
        ),
        format!("Initial Capital:    {:.2}", s.initial_capital),
        format!("Final Capital:      {:.2}", s.final_capital),
        format!("Total Return:       {:.2}%", s.total_return_pct),
    ]
}

fn print_sweep(points: &[SweepPoint]) {
    println!(
        "{:>8} {:>8} {:>8} {:>7} {:>8} {:>14} {:>9}",
        "tp", "sl", "size", "trades", "win%", "final", "return%"
    );
    for p in points {
        println!(
            "{:>8.4} {:>8.4} {:>8.4} {:>7} {:>8.1} {:>14.2} {:>9.2}",
            p.config.take_profit_threshold,
            p.config.stop_loss_threshold,
            p.config.position_size_pct,
            p.summary.trade_count,
            p.summary.win_rate * 100.0,
            p.summary.final_capital,
            p.summary.total_return_pct
        );
    }
    if let Some(best) = best_by_final_capital(points) {
        println!(
            "\nBest: tp {} sl {} size {} -> {:.2}",
            best.config.take_profit_threshold,
            best.config.stop_loss_threshold,
            best.config.position_size_pct,
            best.summary.final_capital
        );
    }
}
