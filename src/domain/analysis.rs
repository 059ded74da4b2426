//! Per-bar analysis: price, indicators and classified signal in one row.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use super::error::FxSignalError;
use super::indicator::{compute_indicators, IndicatorSettings};
use super::ohlcv::{validate_series, PriceBar};
use super::signal::{classify, ClassifierConfig, Signal};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRow {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub signal: Signal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub rows: Vec<SignalRow>,
}

impl Analysis {
    pub fn latest(&self) -> Option<&SignalRow> {
        self.rows.last()
    }

    /// The Buy/Sell rows only, in time order.
    pub fn actionable(&self) -> Vec<&SignalRow> {
        self.rows.iter().filter(|r| r.signal.is_actionable()).collect()
    }

    pub fn count(&self, signal: Signal) -> usize {
        self.rows.iter().filter(|r| r.signal == signal).count()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Validates the series, computes indicators and classifies every bar.
///
/// An invalid price or out-of-order timestamp aborts. An empty or short
/// series is not an error: it yields no rows or all-Hold rows.
pub fn analyze(
    bars: &[PriceBar],
    settings: &IndicatorSettings,
    classifier: &ClassifierConfig,
) -> Result<Analysis, FxSignalError> {
    validate_series(bars)?;

    let frames = match compute_indicators(bars, settings) {
        Ok(frames) => frames,
        Err(FxSignalError::InsufficientData { bars, minimum }) => {
            warn!(bars, minimum, "no price bars to analyse");
            return Ok(Analysis::default());
        }
        Err(e) => return Err(e),
    };

    if bars.len() < settings.minimum_bars() {
        warn!(
            bars = bars.len(),
            minimum = settings.minimum_bars(),
            "series shorter than the indicator warm-up, every bar will hold"
        );
    }

    let signals = classify(bars, &frames, classifier);

    let rows: Vec<SignalRow> = bars
        .iter()
        .zip(&frames)
        .zip(signals)
        .map(|((bar, frame), signal)| SignalRow {
            timestamp: bar.timestamp,
            close: bar.close,
            ema_fast: frame.ema_fast,
            ema_slow: frame.ema_slow,
            rsi: frame.rsi,
            signal,
        })
        .collect();

    let analysis = Analysis { rows };
    debug!(
        policy = %classifier.policy,
        buys = analysis.count(Signal::Buy),
        sells = analysis.count(Signal::Sell),
        "classified {} bars",
        analysis.len()
    );
    Ok(analysis)
}
