//! Price data access port.

use crate::domain::error::FxSignalError;
use crate::domain::ohlcv::PriceBar;

pub trait PriceSource {
    /// Bars for `symbol` at `interval`, oldest first.
    ///
    /// Any retrieval failure is reported as `DataUnavailable`.
    fn fetch_series(&self, symbol: &str, interval: &str) -> Result<Vec<PriceBar>, FxSignalError>;
}
