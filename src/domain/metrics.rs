//! Trade summary statistics over a finished backtest.

use super::account::{AccountState, EquityPoint};

#[derive(Debug, Clone, PartialEq)]
pub struct TradeSummary {
    pub trade_count: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    /// Fraction of trades with positive net PnL.
    pub win_rate: f64,
    /// Mean of the per-trade percentage returns.
    pub avg_trade_return_pct: f64,
    pub total_net_pnl: f64,
    pub total_fees: f64,
    pub initial_capital: f64,
    pub final_capital: f64,
    /// Percent.
    pub total_return_pct: f64,
    pub avg_days_held: f64,
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    /// Largest peak-to-trough fall of the capital trajectory, as a fraction of the peak.
    pub max_drawdown: f64,
    /// Bars spent in the longest drawdown.
    pub max_drawdown_duration: usize,
}

impl TradeSummary {
    pub fn compute(account: &AccountState) -> Self {
        let trades = &account.trades;

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_fees = 0.0_f64;
        let mut total_pct = 0.0_f64;
        let mut total_days = 0i64;

        for trade in trades {
            let pnl = trade.net_pnl;
            if trade.is_win() {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }
            total_fees += trade.fee;
            total_pct += trade.pct_return;
            total_days += trade.days_held();
        }

        let trade_count = trades.len();
        let per_trade = |total: f64| {
            if trade_count > 0 {
                total / trade_count as f64
            } else {
                0.0
            }
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&account.equity_curve);

        TradeSummary {
            trade_count,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate: per_trade(trades_won as f64),
            avg_trade_return_pct: per_trade(total_pct),
            total_net_pnl: account.total_net_pnl(),
            total_fees,
            initial_capital: account.initial_capital,
            final_capital: account.capital,
            total_return_pct: account.total_return() * 100.0,
            avg_days_held: per_trade(total_days as f64),
            profit_factor,
            largest_win,
            largest_loss,
            max_drawdown,
            max_drawdown_duration,
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.capital;
    let mut max_dd = 0.0_f64;
    let mut current_duration = 0usize;
    let mut max_duration = 0usize;

    for point in equity_curve {
        if point.capital >= peak {
            peak = point.capital;
            current_duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.capital) / peak);
            current_duration += 1;
            max_duration = max_duration.max(current_duration);
        }
    }

    (max_dd, max_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{Direction, ExitReason, Trade};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn make_curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                timestamp: at(1) + chrono::Duration::hours(i as i64),
                capital: v,
            })
            .collect()
    }

    fn make_trade(net_pnl: f64, days: i64) -> Trade {
        Trade {
            entry_time: at(1),
            exit_time: at(1) + chrono::Duration::days(days),
            direction: Direction::Long,
            entry_price: 150.0,
            exit_price: 151.0,
            capital_allocated: 1000.0,
            gross_pnl: net_pnl + 1.0,
            fee: 1.0,
            net_pnl,
            pct_return: net_pnl / 1000.0 * 100.0,
            exit_reason: ExitReason::TakeProfit,
        }
    }

    fn make_account(trades: Vec<Trade>) -> AccountState {
        let mut account = AccountState::new(10_000.0);
        for trade in trades {
            account.apply_trade(trade);
        }
        account
    }

    #[test]
    fn summary_of_empty_account() {
        let summary = TradeSummary::compute(&AccountState::new(50_000.0));
        assert_eq!(summary.trade_count, 0);
        assert!((summary.win_rate - 0.0).abs() < f64::EPSILON);
        assert!((summary.avg_trade_return_pct - 0.0).abs() < f64::EPSILON);
        assert!((summary.avg_days_held - 0.0).abs() < f64::EPSILON);
        assert!((summary.profit_factor - 0.0).abs() < f64::EPSILON);
        assert_eq!(summary.final_capital, 50_000.0);
        assert_eq!(summary.max_drawdown, 0.0);
    }

    #[test]
    fn wins_losses_and_breakeven() {
        let account = make_account(vec![
            make_trade(60.0, 1),
            make_trade(-20.0, 2),
            make_trade(0.0, 0),
            make_trade(20.0, 5),
        ]);
        let summary = TradeSummary::compute(&account);

        assert_eq!(summary.trade_count, 4);
        assert_eq!(summary.trades_won, 2);
        assert_eq!(summary.trades_lost, 1);
        assert_eq!(summary.trades_breakeven, 1);
        assert!((summary.win_rate - 0.5).abs() < f64::EPSILON);
        assert!((summary.profit_factor - 4.0).abs() < 1e-9);
        assert!((summary.largest_win - 60.0).abs() < 1e-9);
        assert!((summary.largest_loss - 20.0).abs() < 1e-9);
        assert!((summary.avg_days_held - 2.0).abs() < 1e-9);
        assert!((summary.total_fees - 4.0).abs() < 1e-9);
    }

    #[test]
    fn returns_and_capital() {
        let account = make_account(vec![make_trade(100.0, 1), make_trade(-50.0, 1)]);
        let summary = TradeSummary::compute(&account);

        // (10% + -5%) / 2
        assert!((summary.avg_trade_return_pct - 2.5).abs() < 1e-9);
        assert!((summary.total_net_pnl - 50.0).abs() < 1e-9);
        assert!((summary.final_capital - 10_050.0).abs() < 1e-9);
        assert!((summary.total_return_pct - 0.5).abs() < 1e-9);
    }

    #[test]
    fn profit_factor_without_losses_is_infinite() {
        let summary = TradeSummary::compute(&make_account(vec![make_trade(5.0, 0)]));
        assert!(summary.profit_factor.is_infinite());
    }

    #[test]
    fn max_drawdown() {
        let curve = make_curve(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]);
        let (dd, _) = compute_drawdown(&curve);
        assert!((dd - (110.0 - 80.0) / 110.0).abs() < 1e-9);
    }

    #[test]
    fn max_drawdown_duration() {
        let curve = make_curve(&[100.0, 110.0, 100.0, 90.0, 85.0, 95.0, 110.0, 105.0]);
        let (_, duration) = compute_drawdown(&curve);
        assert_eq!(duration, 4);
    }

    #[test]
    fn flat_curve_has_no_drawdown() {
        let curve = make_curve(&[100.0; 10]);
        assert_eq!(compute_drawdown(&curve), (0.0, 0));
    }
}
