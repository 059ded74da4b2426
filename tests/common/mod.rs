#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use fxsignal::domain::error::FxSignalError;
pub use fxsignal::domain::ohlcv::PriceBar;
use fxsignal::ports::data_port::PriceSource;
use std::collections::HashMap;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_series(&self, symbol: &str, _interval: &str) -> Result<Vec<PriceBar>, FxSignalError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(FxSignalError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn make_bar(timestamp: NaiveDateTime, close: f64) -> PriceBar {
    PriceBar::new(timestamp, close, close * 1.001, close * 0.999, close)
}

/// Hourly bars starting at midnight on 2024-01-01.
pub fn hourly_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(start_time() + chrono::Duration::hours(i as i64), c))
        .collect()
}

/// Daily bars starting on 2024-01-01.
pub fn daily_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(start_time() + chrono::Duration::days(i as i64), c))
        .collect()
}

/// A zigzag down-trend followed by a zigzag up-trend, long enough to warm up
/// every default indicator and keep RSI between 30 and 70.
pub fn valley_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..40)
        .map(|i| 160.0 - 0.3 * i as f64 + if i % 2 == 1 { 1.0 } else { 0.0 })
        .collect();
    closes.extend((0..40).map(|i| 148.0 + 0.3 * i as f64 - if i % 2 == 1 { 1.0 } else { 0.0 }));
    closes
}

pub fn write_price_csv(dir: &std::path::Path, file_name: &str, bars: &[PriceBar]) {
    let mut content = String::from("datetime,open,high,low,close\n");
    for bar in bars.iter().rev() {
        content.push_str(&format!(
            "{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close
        ));
    }
    std::fs::write(dir.join(file_name), content).unwrap();
}
