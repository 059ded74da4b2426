//! OHLC price bar representation and input-contract checks.

use chrono::{NaiveDate, NaiveDateTime};

use super::error::FxSignalError;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(timestamp: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        PriceBar {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// Calendar day the bar belongs to.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Every price must be positive and finite.
    pub fn validate(&self) -> Result<(), FxSignalError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(FxSignalError::InvalidPrice {
                    timestamp: self.timestamp,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Checks the ingestion contract: valid prices and strictly increasing timestamps.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), FxSignalError> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate()?;
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(FxSignalError::UnorderedSeries {
                previous: bars[i - 1].timestamp,
                current: bar.timestamp,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample_bar() -> PriceBar {
        PriceBar::new(at(15, 9), 148.10, 148.55, 147.90, 148.32)
    }

    #[test]
    fn date_drops_time_of_day() {
        let bar = sample_bar();
        assert_eq!(bar.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn valid_bar_passes() {
        assert!(sample_bar().validate().is_ok());
    }

    #[test]
    fn zero_close_rejected() {
        let mut bar = sample_bar();
        bar.close = 0.0;
        let err = bar.validate().unwrap_err();
        assert!(matches!(err, FxSignalError::InvalidPrice { field: "close", .. }));
    }

    #[test]
    fn negative_low_rejected() {
        let mut bar = sample_bar();
        bar.low = -1.0;
        let err = bar.validate().unwrap_err();
        assert!(matches!(err, FxSignalError::InvalidPrice { field: "low", .. }));
    }

    #[test]
    fn nan_open_rejected() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.validate().is_err());
    }

    #[test]
    fn series_must_be_strictly_increasing() {
        let bars = vec![
            PriceBar::new(at(2, 10), 1.0, 1.0, 1.0, 1.0),
            PriceBar::new(at(2, 10), 1.0, 1.0, 1.0, 1.0),
        ];
        let err = validate_series(&bars).unwrap_err();
        assert!(matches!(err, FxSignalError::UnorderedSeries { .. }));
    }

    #[test]
    fn empty_series_is_valid() {
        assert!(validate_series(&[]).is_ok());
    }

    #[test]
    fn ordered_series_passes() {
        let bars: Vec<PriceBar> = (0..5)
            .map(|h| PriceBar::new(at(3, h), 150.0, 150.5, 149.5, 150.2))
            .collect();
        assert!(validate_series(&bars).is_ok());
    }
}
