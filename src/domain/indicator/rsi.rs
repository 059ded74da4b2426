//! RSI (Relative Strength Index) with Wilder's smoothing.
//!
//! - First average: simple mean of gains/losses over the first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)), and 100 when avg_loss == 0.
//! The first n bars are undefined (n price changes are needed for the seed).

use crate::domain::indicator::{finite, IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() <= period {
        return IndicatorSeries::undefined(IndicatorType::Rsi(period), bars);
    }

    let mut values = Vec::with_capacity(bars.len());
    values.push(IndicatorPoint {
        timestamp: bars[0].timestamp,
        value: None,
    });

    let n = period as f64;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut averages: Option<(f64, f64)> = None;

    for (i, pair) in bars.windows(2).enumerate() {
        let change = pair[1].close - pair[0].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        let value = if i < period - 1 {
            gain_sum += gain;
            loss_sum += loss;
            None
        } else {
            let (avg_gain, avg_loss) = match averages {
                None => ((gain_sum + gain) / n, (loss_sum + loss) / n),
                Some((prev_gain, prev_loss)) => (
                    (prev_gain * (n - 1.0) + gain) / n,
                    (prev_loss * (n - 1.0) + loss) / n,
                ),
            };
            averages = Some((avg_gain, avg_loss));
            finite(rsi_value(avg_gain, avg_loss))
        };

        values.push(IndicatorPoint {
            timestamp: pair[1].timestamp,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
