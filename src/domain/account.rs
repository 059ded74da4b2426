//! Simulated account: running capital, trade log and capital trajectory.

use chrono::NaiveDateTime;

use super::position::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub capital: f64,
}

/// Capital changes only when a trade closes, by exactly that trade's net PnL.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountState {
    pub capital: f64,
    pub initial_capital: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl AccountState {
    pub fn new(initial_capital: f64) -> Self {
        AccountState {
            capital: initial_capital,
            initial_capital,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn apply_trade(&mut self, trade: Trade) {
        self.capital += trade.net_pnl;
        self.trades.push(trade);
    }

    pub fn record_equity(&mut self, timestamp: NaiveDateTime) {
        self.equity_curve.push(EquityPoint {
            timestamp,
            capital: self.capital,
        });
    }

    /// Re-stamps the newest trajectory point with the current capital.
    pub fn restate_last_equity(&mut self) {
        let capital = self.capital;
        if let Some(last) = self.equity_curve.last_mut() {
            last.capital = capital;
        }
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    pub fn total_net_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.net_pnl).sum()
    }

    /// (capital - initial) / initial
    pub fn total_return(&self) -> f64 {
        if self.initial_capital > 0.0 {
            (self.capital - self.initial_capital) / self.initial_capital
        } else {
            0.0
        }
    }
}
