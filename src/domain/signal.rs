//! Signal classification: indicator frames to Buy/Sell/Hold, plus the daily throttle.
//!
//! Two policies are supported. `Threshold` is level-based and re-evaluated on
//! every bar, so a condition can fire on many consecutive bars. `EdgeMomentum`
//! fires only on the bar where the fast EMA crosses the slow EMA, and
//! `StrictMomentum` additionally requires RSI inside a neutral band, RSI moving
//! with the signal, and the close on the signal's side of the fast EMA.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::domain::indicator::IndicatorFrame;
use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    /// Buy or Sell.
    pub fn is_actionable(self) -> bool {
        !matches!(self, Signal::Hold)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "Buy",
            Signal::Sell => "Sell",
            Signal::Hold => "Hold",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalPolicy {
    #[default]
    Threshold,
    EdgeMomentum,
    StrictMomentum,
}

impl fmt::Display for SignalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalPolicy::Threshold => "threshold",
            SignalPolicy::EdgeMomentum => "edge-momentum",
            SignalPolicy::StrictMomentum => "strict-momentum",
        };
        f.write_str(s)
    }
}

impl FromStr for SignalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "threshold" => Ok(SignalPolicy::Threshold),
            "edge-momentum" | "edge_momentum" | "crossover" => Ok(SignalPolicy::EdgeMomentum),
            "strict-momentum" | "strict_momentum" => Ok(SignalPolicy::StrictMomentum),
            other => Err(format!(
                "unknown signal policy '{other}' (expected threshold, edge-momentum or strict-momentum)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub policy: SignalPolicy,
    /// Buy requires RSI strictly below this.
    pub rsi_buy_ceiling: f64,
    /// Sell requires RSI strictly above this.
    pub rsi_sell_floor: f64,
    pub momentum_rsi_low: f64,
    pub momentum_rsi_high: f64,
    pub daily_throttle: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            policy: SignalPolicy::Threshold,
            rsi_buy_ceiling: 70.0,
            rsi_sell_floor: 30.0,
            momentum_rsi_low: 40.0,
            momentum_rsi_high: 60.0,
            daily_throttle: false,
        }
    }
}

/// Classifies a single bar. `previous` is the frame of the bar before, if any.
pub fn classify_bar(
    bar: &PriceBar,
    frame: &IndicatorFrame,
    previous: Option<&IndicatorFrame>,
    config: &ClassifierConfig,
) -> Signal {
    let Some((fast, slow, rsi)) = frame.values() else {
        return Signal::Hold;
    };

    if config.policy == SignalPolicy::Threshold {
        return if fast > slow && rsi < config.rsi_buy_ceiling {
            Signal::Buy
        } else if fast < slow && rsi > config.rsi_sell_floor {
            Signal::Sell
        } else {
            Signal::Hold
        };
    }

    let Some((prev_fast, prev_slow, prev_rsi)) = previous.and_then(IndicatorFrame::values) else {
        return Signal::Hold;
    };

    let crossed_up = prev_fast <= prev_slow && fast > slow;
    let crossed_down = prev_fast >= prev_slow && fast < slow;
    let strict = config.policy == SignalPolicy::StrictMomentum;
    let in_band = rsi > config.momentum_rsi_low && rsi < config.momentum_rsi_high;

    if crossed_up
        && rsi < config.rsi_buy_ceiling
        && (!strict || (in_band && rsi > prev_rsi && bar.close > fast))
    {
        Signal::Buy
    } else if crossed_down
        && rsi > config.rsi_sell_floor
        && (!strict || (in_band && rsi < prev_rsi && bar.close < fast))
    {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Classifies every bar, applying the daily throttle when configured.
///
/// `bars` and `frames` must be aligned; any excess on either side is ignored.
pub fn classify(
    bars: &[PriceBar],
    frames: &[IndicatorFrame],
    config: &ClassifierConfig,
) -> Vec<Signal> {
    let signals: Vec<Signal> = bars
        .iter()
        .zip(frames)
        .enumerate()
        .map(|(i, (bar, frame))| {
            let previous = i.checked_sub(1).map(|p| &frames[p]);
            classify_bar(bar, frame, previous, config)
        })
        .collect();

    if config.daily_throttle {
        throttle_daily(bars, &signals)
    } else {
        signals
    }
}

/// Keeps only the first Buy/Sell of each calendar day; later ones become Hold.
pub fn throttle_daily(bars: &[PriceBar], signals: &[Signal]) -> Vec<Signal> {
    let mut last_kept: Option<NaiveDate> = None;
    bars.iter()
        .zip(signals)
        .map(|(bar, &signal)| {
            if !signal.is_actionable() {
                return Signal::Hold;
            }
            let day = bar.date();
            if last_kept == Some(day) {
                Signal::Hold
            } else {
                last_kept = Some(day);
                signal
            }
        })
        .collect()
}
