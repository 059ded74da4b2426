//! Configuration validation.
//!
//! Validates every field before any data is fetched.

use crate::domain::backtest::BacktestConfig;
use crate::domain::config::AppConfig;
use crate::domain::error::FxSignalError;
use crate::domain::indicator::IndicatorSettings;
use crate::domain::signal::ClassifierConfig;
use crate::domain::sweep::ParamGrid;

pub fn validate_app_config(config: &AppConfig) -> Result<(), FxSignalError> {
    validate_data(config)?;
    validate_indicator_settings(&config.indicators)?;
    validate_classifier_config(&config.classifier)?;
    validate_backtest_config(&config.backtest)?;
    validate_sweep_grid(&config.sweep)?;
    Ok(())
}

fn validate_data(config: &AppConfig) -> Result<(), FxSignalError> {
    if config.data.symbol.trim().is_empty() {
        return Err(FxSignalError::ConfigMissing {
            section: "data".to_string(),
            key: "symbol".to_string(),
        });
    }
    if config.data.interval.trim().is_empty() {
        return Err(FxSignalError::ConfigMissing {
            section: "data".to_string(),
            key: "interval".to_string(),
        });
    }
    Ok(())
}

pub fn validate_indicator_settings(settings: &IndicatorSettings) -> Result<(), FxSignalError> {
    for (key, window) in [
        ("fast_window", settings.fast_window),
        ("slow_window", settings.slow_window),
        ("rsi_window", settings.rsi_window),
    ] {
        if window == 0 {
            return Err(FxSignalError::config_invalid(
                "indicators",
                key,
                format!("{key} must be at least 1"),
            ));
        }
    }
    if settings.fast_window >= settings.slow_window {
        return Err(FxSignalError::config_invalid(
            "indicators",
            "fast_window",
            "fast_window must be shorter than slow_window",
        ));
    }
    Ok(())
}

pub fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), FxSignalError> {
    if !config.rsi_sell_floor.is_finite() || config.rsi_sell_floor < 0.0 {
        return Err(FxSignalError::config_invalid(
            "signals",
            "rsi_sell_floor",
            "rsi_sell_floor must be non-negative",
        ));
    }
    if !config.rsi_buy_ceiling.is_finite() || config.rsi_buy_ceiling <= 0.0 {
        return Err(FxSignalError::config_invalid(
            "signals",
            "rsi_buy_ceiling",
            "rsi_buy_ceiling must be positive",
        ));
    }
    if !config.momentum_rsi_low.is_finite()
        || !config.momentum_rsi_high.is_finite()
        || config.momentum_rsi_low >= config.momentum_rsi_high
    {
        return Err(FxSignalError::config_invalid(
            "signals",
            "momentum_rsi_low",
            "momentum_rsi_low must be below momentum_rsi_high",
        ));
    }
    Ok(())
}

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<(), FxSignalError> {
    if !config.initial_capital.is_finite() || config.initial_capital <= 0.0 {
        return Err(FxSignalError::config_invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    validate_position_size("backtest", "position_size_pct", config.position_size_pct)?;
    validate_threshold(
        "backtest",
        "take_profit_threshold",
        config.take_profit_threshold,
    )?;
    validate_threshold("backtest", "stop_loss_threshold", config.stop_loss_threshold)?;

    let rate = config.fee_model.rate();
    if !rate.is_finite() || rate < 0.0 {
        return Err(FxSignalError::config_invalid(
            "backtest",
            "fee_rate",
            "fee_rate must be non-negative",
        ));
    }
    Ok(())
}

pub fn validate_sweep_grid(grid: &ParamGrid) -> Result<(), FxSignalError> {
    for &value in &grid.take_profit_thresholds {
        validate_threshold("sweep", "take_profit_grid", value)?;
    }
    for &value in &grid.stop_loss_thresholds {
        validate_threshold("sweep", "stop_loss_grid", value)?;
    }
    for &value in &grid.position_size_pcts {
        validate_position_size("sweep", "position_size_grid", value)?;
    }
    if grid.size() == 0 {
        return Err(FxSignalError::config_invalid(
            "sweep",
            "take_profit_grid",
            "every sweep grid needs at least one value",
        ));
    }
    Ok(())
}

fn validate_position_size(section: &str, key: &str, value: f64) -> Result<(), FxSignalError> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(FxSignalError::config_invalid(
            section,
            key,
            format!("{key} must be in (0, 1], got {value}"),
        ));
    }
    Ok(())
}

fn validate_threshold(section: &str, key: &str, value: f64) -> Result<(), FxSignalError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FxSignalError::config_invalid(
            section,
            key,
            format!("{key} must be positive, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use crate::domain::execution::FeeModel;

    fn make_config(content: &str) -> AppConfig {
        AppConfig::from_port(&FileConfigAdapter::from_string(content).unwrap()).unwrap()
    }

    fn invalid_key(err: FxSignalError) -> String {
        match err {
            FxSignalError::ConfigInvalid { key, .. } => key,
            other => panic!("expected ConfigInvalid, got {other}"),
        }
    }

    #[test]
    fn defaults_pass() {
        assert!(validate_app_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn valid_file_passes() {
        let config = make_config(
            r#"
[indicators]
fast_window = 12
slow_window = 26

[backtest]
initial_capital = 25000
position_size_pct = 1.0
fee_rate = 0

[sweep]
take_profit_grid = 0.02, 0.04
"#,
        );
        assert!(validate_app_config(&config).is_ok());
    }

    #[test]
    fn zero_window_fails() {
        let config = make_config("[indicators]\nrsi_window = 0\n");
        let err = validate_app_config(&config).unwrap_err();
        assert_eq!(invalid_key(err), "rsi_window");
    }

    #[test]
    fn fast_not_shorter_than_slow_fails() {
        let config = make_config("[indicators]\nfast_window = 21\nslow_window = 21\n");
        let err = validate_app_config(&config).unwrap_err();
        assert_eq!(invalid_key(err), "fast_window");
    }

    #[test]
    fn initial_capital_zero_fails() {
        let config = make_config("[backtest]\ninitial_capital = 0\n");
        let err = validate_app_config(&config).unwrap_err();
        assert_eq!(invalid_key(err), "initial_capital");
    }

    #[test]
    fn position_size_out_of_range_fails() {
        for value in ["0", "1.5", "-0.1"] {
            let config = make_config(&format!("[backtest]\nposition_size_pct = {value}\n"));
            let err = validate_backtest_config(&config.backtest).unwrap_err();
            assert_eq!(invalid_key(err), "position_size_pct");
        }
    }

    #[test]
    fn non_positive_thresholds_fail() {
        let config = make_config("[backtest]\ntake_profit_threshold = 0\n");
        assert_eq!(
            invalid_key(validate_app_config(&config).unwrap_err()),
            "take_profit_threshold"
        );
        let config = make_config("[backtest]\nstop_loss_threshold = -0.02\n");
        assert_eq!(
            invalid_key(validate_app_config(&config).unwrap_err()),
            "stop_loss_threshold"
        );
    }

    #[test]
    fn negative_fee_rate_fails() {
        let config = BacktestConfig {
            fee_model: FeeModel::PerLeg { rate: -0.001 },
            ..Default::default()
        };
        assert_eq!(
            invalid_key(validate_backtest_config(&config).unwrap_err()),
            "fee_rate"
        );
    }

    #[test]
    fn rsi_bounds() {
        let config = make_config("[signals]\nrsi_sell_floor = -1\n");
        assert_eq!(
            invalid_key(validate_app_config(&config).unwrap_err()),
            "rsi_sell_floor"
        );

        // a ceiling above 100 just disables the filter
        let config = make_config("[signals]\nrsi_buy_ceiling = 101\n");
        assert!(validate_app_config(&config).is_ok());

        let config = make_config("[signals]\nmomentum_rsi_low = 60\nmomentum_rsi_high = 40\n");
        assert_eq!(
            invalid_key(validate_app_config(&config).unwrap_err()),
            "momentum_rsi_low"
        );
    }

    #[test]
    fn sweep_values_are_checked() {
        let config = make_config("[sweep]\nposition_size_grid = 0.05, 2\n");
        assert_eq!(
            invalid_key(validate_app_config(&config).unwrap_err()),
            "position_size_grid"
        );
    }

    #[test]
    fn empty_sweep_axis_fails() {
        let grid = ParamGrid {
            stop_loss_thresholds: vec![],
            ..ParamGrid::from_base(&BacktestConfig::default())
        };
        assert!(validate_sweep_grid(&grid).is_err());
    }

    #[test]
    fn blank_symbol_is_missing() {
        let mut config = AppConfig::default();
        config.data.symbol = "  ".to_string();
        assert!(matches!(
            validate_app_config(&config).unwrap_err(),
            FxSignalError::ConfigMissing { .. }
        ));
    }
}
