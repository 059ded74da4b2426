//! Position entry/exit and transaction fee models.
//!
//! Sizing is a fixed fraction of capital at entry; units may be fractional.
//! The fee is charged once, when the position closes.

use chrono::NaiveDateTime;
use std::fmt;

use super::position::{Direction, ExitReason, Position, Trade};

pub const DEFAULT_FEE_RATE: f64 = 0.001;

/// How the round-trip fee of a closed position is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeeModel {
    /// allocated × rate
    FractionOfAllocated { rate: f64 },
    /// (allocated + allocated × (1 + change)) × rate: entry notional plus exit notional
    /// expressed through the position's signed change.
    RoundTripNotional { rate: f64 },
    /// units × entry_price × rate + units × exit_price × rate
    PerLeg { rate: f64 },
}

impl Default for FeeModel {
    fn default() -> Self {
        FeeModel::FractionOfAllocated {
            rate: DEFAULT_FEE_RATE,
        }
    }
}

impl FeeModel {
    /// Builds a model from its configuration name and rate.
    pub fn from_name(name: &str, rate: f64) -> Result<Self, String> {
        match name.trim().to_lowercase().as_str() {
            "allocated" | "fraction_of_allocated" => Ok(FeeModel::FractionOfAllocated { rate }),
            "notional" | "round_trip_notional" => Ok(FeeModel::RoundTripNotional { rate }),
            "per_leg" | "per-leg" => Ok(FeeModel::PerLeg { rate }),
            other => Err(format!(
                "unknown fee model '{other}' (expected allocated, notional or per_leg)"
            )),
        }
    }

    pub fn rate(&self) -> f64 {
        match *self {
            FeeModel::FractionOfAllocated { rate }
            | FeeModel::RoundTripNotional { rate }
            | FeeModel::PerLeg { rate } => rate,
        }
    }

    pub fn fee(&self, position: &Position, exit_price: f64) -> f64 {
        match *self {
            FeeModel::FractionOfAllocated { rate } => position.capital_allocated * rate,
            FeeModel::RoundTripNotional { rate } => {
                let exit_notional = position.capital_allocated * (1.0 + position.change(exit_price));
                (position.capital_allocated + exit_notional) * rate
            }
            FeeModel::PerLeg { rate } => {
                position.unit_count * position.entry_price * rate
                    + position.unit_count * exit_price * rate
            }
        }
    }
}

impl fmt::Display for FeeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeModel::FractionOfAllocated { rate } => write!(f, "allocated({})", rate),
            FeeModel::RoundTripNotional { rate } => write!(f, "notional({})", rate),
            FeeModel::PerLeg { rate } => write!(f, "per_leg({})", rate),
        }
    }
}

/// Opens a position at the bar's close, sized as `capital × position_size_pct`.
pub fn open_position(
    bar_time: NaiveDateTime,
    close: f64,
    direction: Direction,
    capital: f64,
    position_size_pct: f64,
) -> Position {
    let capital_allocated = capital * position_size_pct;
    Position {
        direction,
        entry_price: close,
        entry_time: bar_time,
        capital_allocated,
        unit_count: capital_allocated / close,
    }
}

/// Closes `position` at `exit_price`, producing the trade record.
pub fn close_position(
    position: Position,
    exit_time: NaiveDateTime,
    exit_price: f64,
    exit_reason: ExitReason,
    fee_model: &FeeModel,
) -> Trade {
    let change = position.change(exit_price);
    let gross_pnl = position.capital_allocated * change;
    let fee = fee_model.fee(&position, exit_price);
    let net_pnl = gross_pnl - fee;
    let pct_return = net_pnl / position.capital_allocated * 100.0;

    Trade {
        entry_time: position.entry_time,
        exit_time,
        direction: position.direction,
        entry_price: position.entry_price,
        exit_price,
        capital_allocated: position.capital_allocated,
        gross_pnl,
        fee,
        net_pnl,
        pct_return,
        exit_reason,
    }
}
