//! Per-bar indicator bundle: fast EMA, slow EMA and RSI.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::error::FxSignalError;
use crate::domain::indicator::{calculate_ema, calculate_rsi};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_FAST_WINDOW: usize = 9;
pub const DEFAULT_SLOW_WINDOW: usize = 21;
pub const DEFAULT_RSI_WINDOW: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSettings {
    pub fast_window: usize,
    pub slow_window: usize,
    pub rsi_window: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        IndicatorSettings {
            fast_window: DEFAULT_FAST_WINDOW,
            slow_window: DEFAULT_SLOW_WINDOW,
            rsi_window: DEFAULT_RSI_WINDOW,
        }
    }
}

impl IndicatorSettings {
    /// Bars needed before every indicator of a frame is defined.
    pub fn minimum_bars(&self) -> usize {
        self.fast_window
            .max(self.slow_window)
            .max(self.rsi_window + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorFrame {
    pub timestamp: NaiveDateTime,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
}

impl IndicatorFrame {
    /// All three values, or `None` while any of them is still warming up.
    pub fn values(&self) -> Option<(f64, f64, f64)> {
        Some((self.ema_fast?, self.ema_slow?, self.rsi?))
    }

    pub fn is_complete(&self) -> bool {
        self.values().is_some()
    }
}

/// Computes the three aligned indicator series.
///
/// The series are independent of each other, so they are computed on the
/// rayon pool. Fails with `InsufficientData` only for an empty input; shorter
/// inputs just leave the warm-up frames undefined.
pub fn compute_indicators(
    bars: &[PriceBar],
    settings: &IndicatorSettings,
) -> Result<Vec<IndicatorFrame>, FxSignalError> {
    if bars.is_empty() {
        return Err(FxSignalError::InsufficientData {
            bars: 0,
            minimum: settings.minimum_bars(),
        });
    }

    let (fast, (slow, rsi)) = rayon::join(
        || calculate_ema(bars, settings.fast_window),
        || {
            rayon::join(
                || calculate_ema(bars, settings.slow_window),
                || calculate_rsi(bars, settings.rsi_window),
            )
        },
    );

    let frames: Vec<IndicatorFrame> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorFrame {
            timestamp: bar.timestamp,
            ema_fast: fast.value_at(i),
            ema_slow: slow.value_at(i),
            rsi: rsi.value_at(i),
        })
        .collect();

    debug!(
        bars = bars.len(),
        complete = frames.iter().filter(|f| f.is_complete()).count(),
        "computed {}, {} and {}",
        fast.indicator_type,
        slow.indicator_type,
        rsi.indicator_type
    );

    Ok(frames)
}
