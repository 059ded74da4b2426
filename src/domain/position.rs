//! Open position state and closed trade records.

use chrono::NaiveDateTime;
use std::fmt;

use super::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Buy opens a long, Sell opens a short, Hold opens nothing.
    pub fn from_signal(signal: Signal) -> Option<Direction> {
        match signal {
            Signal::Buy => Some(Direction::Long),
            Signal::Sell => Some(Direction::Short),
            Signal::Hold => None,
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => f.write_str("Long"),
            Direction::Short => f.write_str("Short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    /// Force-closed at the last bar under the mark-to-market end-of-data policy.
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::TakeProfit => f.write_str("take-profit"),
            ExitReason::StopLoss => f.write_str("stop-loss"),
            ExitReason::EndOfData => f.write_str("end-of-data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub direction: Direction,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub capital_allocated: f64,
    pub unit_count: f64,
}

impl Position {
    /// Fractional price change from entry, positive when the move favours the position.
    pub fn change(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price * self.direction.sign()
    }

    /// Gross PnL the position would realise if closed at `price`.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.capital_allocated * self.change(price)
    }

    /// Take-profit is checked before stop-loss.
    pub fn exit_reason(
        &self,
        price: f64,
        take_profit_threshold: f64,
        stop_loss_threshold: f64,
    ) -> Option<ExitReason> {
        let change = self.change(price);
        if change >= take_profit_threshold {
            Some(ExitReason::TakeProfit)
        } else if change <= -stop_loss_threshold {
            Some(ExitReason::StopLoss)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    pub capital_allocated: f64,
    pub gross_pnl: f64,
    pub fee: f64,
    pub net_pnl: f64,
    /// Net return on the allocated capital, in percent.
    pub pct_return: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// Whole days between entry and exit.
    pub fn days_held(&self) -> i64 {
        (self.exit_time - self.entry_time).num_days()
    }

    pub fn is_win(&self) -> bool {
        self.net_pnl > 0.0
    }
}
