//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for fxsignal.
#[derive(Debug, thiserror::Error)]
pub enum FxSignalError {
    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("invalid {field} price {value} at {timestamp}")]
    InvalidPrice {
        timestamp: NaiveDateTime,
        field: &'static str,
        value: f64,
    },

    #[error("timestamps out of order: {current} does not follow {previous}")]
    UnorderedSeries {
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FxSignalError {
    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        FxSignalError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// True for the configuration category (parse, missing or out-of-range values).
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            FxSignalError::ConfigParse { .. }
                | FxSignalError::ConfigMissing { .. }
                | FxSignalError::ConfigInvalid { .. }
        )
    }
}

impl From<&FxSignalError> for std::process::ExitCode {
    fn from(err: &FxSignalError) -> Self {
        let code: u8 = match err {
            FxSignalError::Io(_) => 1,
            FxSignalError::ConfigParse { .. }
            | FxSignalError::ConfigMissing { .. }
            | FxSignalError::ConfigInvalid { .. } => 2,
            FxSignalError::DataUnavailable { .. } => 3,
            FxSignalError::InvalidPrice { .. } | FxSignalError::UnorderedSeries { .. } => 4,
            FxSignalError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    #[test]
    fn invalid_price_message() {
        let err = FxSignalError::InvalidPrice {
            timestamp: ts(),
            field: "close",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "invalid close price 0 at 2024-03-01 14:00:00");
    }

    #[test]
    fn config_invalid_helper() {
        let err = FxSignalError::config_invalid("backtest", "fee_rate", "must be non-negative");
        assert!(err.is_config_error());
        assert_eq!(
            err.to_string(),
            "invalid config value [backtest] fee_rate: must be non-negative"
        );
    }

    #[test]
    fn data_errors_are_not_config_errors() {
        let err = FxSignalError::DataUnavailable {
            symbol: "USD/JPY".into(),
            reason: "no values".into(),
        };
        assert!(!err.is_config_error());
        assert_eq!(err.to_string(), "data unavailable for USD/JPY: no values");
    }

    #[test]
    fn exit_codes_by_category() {
        use std::process::ExitCode;
        let cases = [
            (
                FxSignalError::ConfigMissing {
                    section: "data".into(),
                    key: "symbol".into(),
                },
                ExitCode::from(2),
            ),
            (
                FxSignalError::DataUnavailable {
                    symbol: "EUR/USD".into(),
                    reason: "missing".into(),
                },
                ExitCode::from(3),
            ),
            (
                FxSignalError::UnorderedSeries {
                    previous: ts(),
                    current: ts(),
                },
                ExitCode::from(4),
            ),
            (
                FxSignalError::InsufficientData {
                    bars: 0,
                    minimum: 1,
                },
                ExitCode::from(5),
            ),
        ];
        for (err, expected) in &cases {
            assert_eq!(ExitCode::from(err), *expected, "{err}");
        }
    }
}
