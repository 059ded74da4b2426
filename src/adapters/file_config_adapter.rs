//! INI file configuration adapter.

use crate::domain::error::FxSignalError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FxSignalError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| FxSignalError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, FxSignalError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| FxSignalError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    fn parse_value<T: std::str::FromStr>(
        &self,
        section: &str,
        key: &str,
        default: T,
        expected: &str,
    ) -> Result<T, FxSignalError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| {
                FxSignalError::config_invalid(section, key, format!("'{raw}' is not {expected}"))
            }),
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, FxSignalError> {
        self.parse_value(section, key, default, "an integer")
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, FxSignalError> {
        self.parse_value(section, key, default, "a number")
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, FxSignalError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => Self::parse_bool(&raw).ok_or_else(|| {
                FxSignalError::config_invalid(section, key, format!("'{raw}' is not a boolean"))
            }),
        }
    }
}
