//! CSV file price source.
//!
//! One file per symbol and interval: `<data_dir>/USD_JPY_1h.csv` with header
//! `datetime,open,high,low,close`.

use crate::domain::error::FxSignalError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::PriceSource;
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvPriceSource {
    base_path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol.replace('/', "_"), interval))
    }
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn price_field(record: &StringRecord, index: usize, name: &str) -> Result<f64, String> {
    record
        .get(index)
        .ok_or_else(|| format!("missing {name} column"))?
        .trim()
        .parse()
        .map_err(|e| format!("invalid {name} value: {e}"))
}

fn parse_record(record: &StringRecord) -> Result<PriceBar, String> {
    let raw = record.get(0).ok_or("missing datetime column")?;
    let timestamp =
        parse_datetime(raw).ok_or_else(|| format!("invalid datetime format: '{raw}'"))?;
    Ok(PriceBar::new(
        timestamp,
        price_field(record, 1, "open")?,
        price_field(record, 2, "high")?,
        price_field(record, 3, "low")?,
        price_field(record, 4, "close")?,
    ))
}

impl PriceSource for CsvPriceSource {
    fn fetch_series(&self, symbol: &str, interval: &str) -> Result<Vec<PriceBar>, FxSignalError> {
        let unavailable = |reason: String| FxSignalError::DataUnavailable {
            symbol: symbol.to_string(),
            reason,
        };

        let path = self.csv_path(symbol, interval);
        let content = fs::read_to_string(&path)
            .map_err(|e| unavailable(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| unavailable(format!("CSV parse error: {e}")))?;
            let bar = parse_record(&record)
                .map_err(|reason| unavailable(format!("row {}: {}", line + 1, reason)))?;
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!(symbol, interval, bars = bars.len(), path = %path.display(), "loaded price series");
        Ok(bars)
    }
}
