//! Parameter sweep over take-profit, stop-loss and position-size grids.

use rayon::prelude::*;
use tracing::info;

use super::analysis::SignalRow;
use super::backtest::{run_backtest, BacktestConfig};
use super::error::FxSignalError;
use super::metrics::TradeSummary;

/// Values to try for each swept parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub take_profit_thresholds: Vec<f64>,
    pub stop_loss_thresholds: Vec<f64>,
    pub position_size_pcts: Vec<f64>,
}

impl ParamGrid {
    /// A one-point grid holding the base configuration's values.
    pub fn from_base(base: &BacktestConfig) -> Self {
        ParamGrid {
            take_profit_thresholds: vec![base.take_profit_threshold],
            stop_loss_thresholds: vec![base.stop_loss_threshold],
            position_size_pcts: vec![base.position_size_pct],
        }
    }

    pub fn size(&self) -> usize {
        self.take_profit_thresholds.len()
            * self.stop_loss_thresholds.len()
            * self.position_size_pcts.len()
    }

    /// Expands the grid in take-profit, stop-loss, size order.
    pub fn generate_configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &take_profit in &self.take_profit_thresholds {
            for &stop_loss in &self.stop_loss_thresholds {
                for &size in &self.position_size_pcts {
                    configs.push(BacktestConfig {
                        take_profit_threshold: take_profit,
                        stop_loss_threshold: stop_loss,
                        position_size_pct: size,
                        ..base.clone()
                    });
                }
            }
        }
        configs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub config: BacktestConfig,
    pub summary: TradeSummary,
}

/// Backtests every grid point against the same signalled series.
///
/// Runs are independent and evaluated in parallel; results keep grid order.
pub fn run_sweep(
    rows: &[SignalRow],
    grid: &ParamGrid,
    base: &BacktestConfig,
) -> Result<Vec<SweepPoint>, FxSignalError> {
    let configs = grid.generate_configs(base);
    info!(points = configs.len(), bars = rows.len(), "running parameter sweep");

    configs
        .into_par_iter()
        .map(|config| {
            let result = run_backtest(rows, &config)?;
            Ok::<_, FxSignalError>(SweepPoint {
                summary: TradeSummary::compute(&result.account),
                config,
            })
        })
        .collect()
}

/// The point with the highest final capital; earlier grid points win ties.
pub fn best_by_final_capital(points: &[SweepPoint]) -> Option<&SweepPoint> {
    points.iter().reduce(|best, p| {
        if p.summary.final_capital > best.summary.final_capital {
            p
        } else {
            best
        }
    })
}
