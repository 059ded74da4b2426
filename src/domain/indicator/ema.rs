//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). The first (n-1) bars are undefined.

use crate::domain::indicator::{finite, IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_ema(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::undefined(IndicatorType::Ema(period), bars);
    }

    let mut values = Vec::with_capacity(bars.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < period - 1 {
            sum += bar.close;
        } else if i == period - 1 {
            sum += bar.close;
            ema = finite(sum / period as f64);
        } else {
            ema = ema.and_then(|prev| finite(bar.close * k + prev * (1.0 - k)));
        }
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value: ema,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}
