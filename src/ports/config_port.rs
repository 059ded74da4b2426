//! Configuration access port.
//!
//! A missing key yields the caller's default. A present but unparseable
//! value is an error.

use crate::domain::error::FxSignalError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, FxSignalError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, FxSignalError>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, FxSignalError>;

    /// Comma-separated list of numbers, e.g. `0.02, 0.04, 0.06`.
    fn get_double_list(
        &self,
        section: &str,
        key: &str,
        default: &[f64],
    ) -> Result<Vec<f64>, FxSignalError> {
        let Some(raw) = self.get_string(section, key) else {
            return Ok(default.to_vec());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                item.parse::<f64>().map_err(|_| {
                    FxSignalError::config_invalid(section, key, format!("'{item}' is not a number"))
                })
            })
            .collect()
    }
}
