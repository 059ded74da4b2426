//! Typed application configuration assembled from a [`ConfigPort`].

use std::path::PathBuf;

use super::backtest::{BacktestConfig, EndOfDataPolicy};
use super::error::FxSignalError;
use super::execution::{FeeModel, DEFAULT_FEE_RATE};
use super::indicator::IndicatorSettings;
use super::signal::{ClassifierConfig, SignalPolicy};
use super::sweep::ParamGrid;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SYMBOL: &str = "USD/JPY";
pub const DEFAULT_INTERVAL: &str = "1h";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub symbol: String,
    pub interval: String,
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            symbol: DEFAULT_SYMBOL.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data: DataConfig,
    pub indicators: IndicatorSettings,
    pub classifier: ClassifierConfig,
    pub backtest: BacktestConfig,
    pub sweep: ParamGrid,
}

impl Default for AppConfig {
    fn default() -> Self {
        let backtest = BacktestConfig::default();
        AppConfig {
            data: DataConfig::default(),
            indicators: IndicatorSettings::default(),
            classifier: ClassifierConfig::default(),
            sweep: ParamGrid::from_base(&backtest),
            backtest,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub symbol: Option<String>,
    pub policy: Option<SignalPolicy>,
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Reads every section, falling back to defaults for absent keys.
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, FxSignalError> {
        let defaults = AppConfig::default();

        let data = DataConfig {
            symbol: config
                .get_string("data", "symbol")
                .unwrap_or(defaults.data.symbol),
            interval: config
                .get_string("data", "interval")
                .unwrap_or(defaults.data.interval),
            data_dir: config
                .get_string("data", "data_dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.data.data_dir),
        };

        let indicators = IndicatorSettings {
            fast_window: get_window(config, "fast_window", defaults.indicators.fast_window)?,
            slow_window: get_window(config, "slow_window", defaults.indicators.slow_window)?,
            rsi_window: get_window(config, "rsi_window", defaults.indicators.rsi_window)?,
        };

        let c = &defaults.classifier;
        let classifier = ClassifierConfig {
            policy: get_policy(config)?.unwrap_or(c.policy),
            rsi_buy_ceiling: config.get_double("signals", "rsi_buy_ceiling", c.rsi_buy_ceiling)?,
            rsi_sell_floor: config.get_double("signals", "rsi_sell_floor", c.rsi_sell_floor)?,
            momentum_rsi_low: config.get_double("signals", "momentum_rsi_low", c.momentum_rsi_low)?,
            momentum_rsi_high: config.get_double(
                "signals",
                "momentum_rsi_high",
                c.momentum_rsi_high,
            )?,
            daily_throttle: config.get_bool("signals", "daily_throttle", c.daily_throttle)?,
        };

        let b = &defaults.backtest;
        let fee_rate = config.get_double("backtest", "fee_rate", DEFAULT_FEE_RATE)?;
        let fee_model = match config.get_string("backtest", "fee_model") {
            Some(name) => FeeModel::from_name(&name, fee_rate)
                .map_err(|reason| FxSignalError::config_invalid("backtest", "fee_model", reason))?,
            None => FeeModel::FractionOfAllocated { rate: fee_rate },
        };
        let end_of_data = match config.get_string("backtest", "end_of_data") {
            Some(raw) => raw
                .parse::<EndOfDataPolicy>()
                .map_err(|reason| FxSignalError::config_invalid("backtest", "end_of_data", reason))?,
            None => b.end_of_data,
        };
        let backtest = BacktestConfig {
            initial_capital: config.get_double("backtest", "initial_capital", b.initial_capital)?,
            position_size_pct: config.get_double(
                "backtest",
                "position_size_pct",
                b.position_size_pct,
            )?,
            take_profit_threshold: config.get_double(
                "backtest",
                "take_profit_threshold",
                b.take_profit_threshold,
            )?,
            stop_loss_threshold: config.get_double(
                "backtest",
                "stop_loss_threshold",
                b.stop_loss_threshold,
            )?,
            fee_model,
            one_trade_per_day: config.get_bool(
                "backtest",
                "one_trade_per_day",
                b.one_trade_per_day,
            )?,
            end_of_data,
        };

        // unset grid axes sweep only the backtest value
        let sweep = ParamGrid {
            take_profit_thresholds: config.get_double_list(
                "sweep",
                "take_profit_grid",
                &[backtest.take_profit_threshold],
            )?,
            stop_loss_thresholds: config.get_double_list(
                "sweep",
                "stop_loss_grid",
                &[backtest.stop_loss_threshold],
            )?,
            position_size_pcts: config.get_double_list(
                "sweep",
                "position_size_grid",
                &[backtest.position_size_pct],
            )?,
        };

        Ok(AppConfig {
            data,
            indicators,
            classifier,
            backtest,
            sweep,
        })
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(symbol) = &overrides.symbol {
            self.data.symbol = symbol.clone();
        }
        if let Some(policy) = overrides.policy {
            self.classifier.policy = policy;
        }
        if let Some(dir) = &overrides.data_dir {
            self.data.data_dir = dir.clone();
        }
    }
}

/// `signal_policy`, with the shorter `policy` accepted as an alias.
fn get_policy(config: &dyn ConfigPort) -> Result<Option<SignalPolicy>, FxSignalError> {
    for key in ["signal_policy", "policy"] {
        if let Some(raw) = config.get_string("signals", key) {
            return raw
                .parse()
                .map(Some)
                .map_err(|reason: String| FxSignalError::config_invalid("signals", key, reason));
        }
    }
    Ok(None)
}

fn get_window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, FxSignalError> {
    let value = config.get_int("indicators", key, default as i64)?;
    usize::try_from(value).map_err(|_| {
        FxSignalError::config_invalid("indicators", key, format!("{value} is not a valid window"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn load(content: &str) -> Result<AppConfig, FxSignalError> {
        AppConfig::from_port(&FileConfigAdapter::from_string(content).unwrap())
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = load("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.data.symbol, "USD/JPY");
        assert_eq!(config.data.interval, "1h");
        assert_eq!(config.indicators.fast_window, 9);
        assert_eq!(config.indicators.slow_window, 21);
        assert_eq!(config.indicators.rsi_window, 14);
        assert_eq!(config.sweep.size(), 1);
    }

    #[test]
    fn reads_every_section() {
        let config = load(
            r#"
[data]
symbol = EUR/USD
interval = 15min
data_dir = /srv/quotes

[indicators]
fast_window = 5
slow_window = 13
rsi_window = 7

[signals]
policy = strict-momentum
rsi_buy_ceiling = 65
rsi_sell_floor = 35
momentum_rsi_low = 45
momentum_rsi_high = 55
daily_throttle = true

[backtest]
initial_capital = 10000
position_size_pct = 0.1
take_profit_threshold = 0.03
stop_loss_threshold = 0.015
fee_model = notional
fee_rate = 0.0005
one_trade_per_day = false
end_of_data = mark-to-market

[sweep]
take_profit_grid = 0.02, 0.04
stop_loss_grid = 0.01
"#,
        )
        .unwrap();

        assert_eq!(config.data.symbol, "EUR/USD");
        assert_eq!(config.data.interval, "15min");
        assert_eq!(config.data.data_dir, PathBuf::from("/srv/quotes"));
        assert_eq!(config.indicators.fast_window, 5);
        assert_eq!(config.indicators.rsi_window, 7);
        assert_eq!(config.classifier.policy, SignalPolicy::StrictMomentum);
        assert_eq!(config.classifier.rsi_buy_ceiling, 65.0);
        assert_eq!(config.classifier.momentum_rsi_high, 55.0);
        assert!(config.classifier.daily_throttle);
        assert_eq!(config.backtest.initial_capital, 10_000.0);
        assert_eq!(
            config.backtest.fee_model,
            FeeModel::RoundTripNotional { rate: 0.0005 }
        );
        assert!(!config.backtest.one_trade_per_day);
        assert_eq!(config.backtest.end_of_data, EndOfDataPolicy::MarkToMarket);
        assert_eq!(config.sweep.take_profit_thresholds, vec![0.02, 0.04]);
        assert_eq!(config.sweep.stop_loss_thresholds, vec![0.01]);
        assert_eq!(config.sweep.position_size_pcts, vec![0.1]);
    }

    #[test]
    fn fee_rate_without_model_uses_allocated() {
        let config = load("[backtest]\nfee_rate = 0.002\n").unwrap();
        assert_eq!(
            config.backtest.fee_model,
            FeeModel::FractionOfAllocated { rate: 0.002 }
        );
    }

    #[test]
    fn unknown_policy_is_invalid() {
        let err = load("[signals]\npolicy = vibes\n").unwrap_err();
        assert!(matches!(err, FxSignalError::ConfigInvalid { ref key, .. } if key == "policy"));

        let err = load("[signals]\nsignal_policy = vibes\n").unwrap_err();
        assert!(
            matches!(err, FxSignalError::ConfigInvalid { ref key, .. } if key == "signal_policy")
        );
    }

    #[test]
    fn signal_policy_key_wins_over_alias() {
        let config = load("[signals]\nsignal_policy = edge-momentum\npolicy = threshold\n").unwrap();
        assert_eq!(config.classifier.policy, SignalPolicy::EdgeMomentum);

        let config = load("[signals]\nsignal_policy = threshold\n").unwrap();
        assert_eq!(config.classifier.policy, SignalPolicy::Threshold);
    }

    #[test]
    fn unknown_fee_model_is_invalid() {
        let err = load("[backtest]\nfee_model = flat\n").unwrap_err();
        assert!(matches!(err, FxSignalError::ConfigInvalid { ref key, .. } if key == "fee_model"));
    }

    #[test]
    fn negative_window_is_invalid() {
        let err = load("[indicators]\nfast_window = -3\n").unwrap_err();
        assert!(matches!(err, FxSignalError::ConfigInvalid { ref key, .. } if key == "fast_window"));
    }

    #[test]
    fn unparseable_number_is_not_defaulted() {
        assert!(load("[backtest]\ninitial_capital = lots\n").is_err());
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = load("[data]\nsymbol = EUR/USD\n").unwrap();
        config.apply_overrides(&Overrides {
            symbol: Some("GBP/JPY".to_string()),
            policy: Some(SignalPolicy::EdgeMomentum),
            data_dir: None,
        });
        assert_eq!(config.data.symbol, "GBP/JPY");
        assert_eq!(config.classifier.policy, SignalPolicy::EdgeMomentum);
        assert_eq!(config.data.data_dir, PathBuf::from("data"));
    }
}
