//! Backtest simulator: a single forward pass over the signalled series.
//!
//! The simulator is either Flat or holding one position. While flat, a Buy or
//! Sell opens a position at the bar's close. While in a position, every later
//! bar is checked against the take-profit and stop-loss thresholds and the
//! first bar that crosses either closes it. Signals that arrive while a
//! position is open are ignored, and no entry happens on the bar that closed
//! the previous position.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::account::AccountState;
use super::analysis::SignalRow;
use super::error::FxSignalError;
use super::execution::{close_position, open_position, FeeModel};
use super::position::{Direction, ExitReason, Position, Trade};

/// What to do with a position still open when the data runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndOfDataPolicy {
    /// Leave it open: no trade is recorded, the position is reported separately.
    #[default]
    Drop,
    /// Close it at the last bar's close.
    MarkToMarket,
}

impl fmt::Display for EndOfDataPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndOfDataPolicy::Drop => f.write_str("drop"),
            EndOfDataPolicy::MarkToMarket => f.write_str("mark-to-market"),
        }
    }
}

impl FromStr for EndOfDataPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(EndOfDataPolicy::Drop),
            "mark-to-market" | "mark_to_market" | "close" => Ok(EndOfDataPolicy::MarkToMarket),
            other => Err(format!(
                "unknown end-of-data policy '{other}' (expected drop or mark-to-market)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Fraction of current capital committed to each position.
    pub position_size_pct: f64,
    pub take_profit_threshold: f64,
    pub stop_loss_threshold: f64,
    pub fee_model: FeeModel,
    /// Skip entries on the calendar day of the most recent entry.
    pub one_trade_per_day: bool,
    pub end_of_data: EndOfDataPolicy,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 50_000.0,
            position_size_pct: 0.05,
            take_profit_threshold: 0.06,
            stop_loss_threshold: 0.02,
            fee_model: FeeModel::default(),
            one_trade_per_day: true,
            end_of_data: EndOfDataPolicy::Drop,
        }
    }
}

/// State threaded through the simulation, one step per bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorState {
    pub account: AccountState,
    pub open_position: Option<Position>,
    pub last_trade_date: Option<NaiveDate>,
}

impl SimulatorState {
    pub fn new(initial_capital: f64) -> Self {
        SimulatorState {
            account: AccountState::new(initial_capital),
            open_position: None,
            last_trade_date: None,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.open_position.is_none()
    }

    /// Advances one bar. Returns the trade closed on this bar, if any.
    pub fn step(&mut self, row: &SignalRow, config: &BacktestConfig) -> Option<&Trade> {
        let mut closed = false;

        match self.open_position.take() {
            Some(position) => {
                match position.exit_reason(
                    row.close,
                    config.take_profit_threshold,
                    config.stop_loss_threshold,
                ) {
                    Some(reason) => {
                        let trade = close_position(
                            position,
                            row.timestamp,
                            row.close,
                            reason,
                            &config.fee_model,
                        );
                        debug!(
                            exit_time = %trade.exit_time,
                            reason = %trade.exit_reason,
                            net_pnl = trade.net_pnl,
                            "closed {} position",
                            trade.direction
                        );
                        self.account.apply_trade(trade);
                        closed = true;
                    }
                    None => self.open_position = Some(position),
                }
            }
            None => {
                if let Some(direction) = Direction::from_signal(row.signal) {
                    self.try_enter(row, direction, config);
                }
            }
        }

        self.account.record_equity(row.timestamp);
        if closed {
            self.account.trades.last()
        } else {
            None
        }
    }

    fn try_enter(&mut self, row: &SignalRow, direction: Direction, config: &BacktestConfig) {
        let day = row.timestamp.date();
        if config.one_trade_per_day && self.last_trade_date == Some(day) {
            debug!(time = %row.timestamp, "entry skipped, already traded on {}", day);
            return;
        }

        let position = open_position(
            row.timestamp,
            row.close,
            direction,
            self.account.capital,
            config.position_size_pct,
        );
        debug!(
            time = %row.timestamp,
            price = row.close,
            allocated = position.capital_allocated,
            "opened {} position",
            direction
        );
        self.open_position = Some(position);
        self.last_trade_date = Some(day);
    }

    /// Applies the end-of-data policy after the last bar.
    pub fn finish(&mut self, last: Option<&SignalRow>, config: &BacktestConfig) {
        let (Some(row), EndOfDataPolicy::MarkToMarket) = (last, config.end_of_data) else {
            return;
        };
        let Some(position) = self.open_position.take() else {
            return;
        };
        // a position opened on the final bar has no later bar to exit on
        if row.timestamp <= position.entry_time {
            self.open_position = Some(position);
            return;
        }

        let trade = close_position(
            position,
            row.timestamp,
            row.close,
            ExitReason::EndOfData,
            &config.fee_model,
        );
        self.account.apply_trade(trade);
        self.account.restate_last_equity();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub account: AccountState,
    /// A position the data ran out on, left open under the drop policy.
    pub open_position: Option<Position>,
}

impl BacktestResult {
    pub fn trades(&self) -> &[Trade] {
        &self.account.trades
    }

    pub fn final_capital(&self) -> f64 {
        self.account.capital
    }
}

/// Runs the simulator over `rows`.
///
/// Every close is checked before the first step so an invalid price aborts
/// the run without producing a partial trade log.
pub fn run_backtest(
    rows: &[SignalRow],
    config: &BacktestConfig,
) -> Result<BacktestResult, FxSignalError> {
    if let Some(bad) = rows
        .iter()
        .find(|r| !r.close.is_finite() || r.close <= 0.0)
    {
        return Err(FxSignalError::InvalidPrice {
            timestamp: bad.timestamp,
            field: "close",
            value: bad.close,
        });
    }

    info!(
        bars = rows.len(),
        capital = config.initial_capital,
        fee_model = %config.fee_model,
        "running backtest"
    );

    let mut state = SimulatorState::new(config.initial_capital);
    for row in rows {
        state.step(row, config);
    }
    state.finish(rows.last(), config);

    if let Some(position) = &state.open_position {
        warn!(
            entry_time = %position.entry_time,
            "{} position still open at end of data",
            position.direction
        );
    }
    info!(
        trades = state.account.trade_count(),
        final_capital = state.account.capital,
        "backtest complete"
    );

    Ok(BacktestResult {
        account: state.account,
        open_position: state.open_position,
    })
}
