//! Technical indicators over a price series.
//!
//! - `IndicatorPoint`: one bar's value, `None` while the window is warming up
//! - `IndicatorType`: indicator identity + window
//! - `IndicatorSeries`: a series aligned one-to-one with the input bars
//! - `IndicatorFrame`: the per-bar bundle consumed by the signal classifier

pub mod ema;
pub mod frame;
pub mod rsi;

pub use ema::calculate_ema;
pub use frame::{compute_indicators, IndicatorFrame, IndicatorSettings};
pub use rsi::calculate_rsi;

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

impl IndicatorPoint {
    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// A series of the same length as `bars` with nothing defined.
    pub(crate) fn undefined(indicator_type: IndicatorType, bars: &[PriceBar]) -> Self {
        IndicatorSeries {
            indicator_type,
            values: bars
                .iter()
                .map(|b| IndicatorPoint {
                    timestamp: b.timestamp,
                    value: None,
                })
                .collect(),
        }
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Non-finite arithmetic degrades the bar to undefined instead of poisoning later bars.
pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}
