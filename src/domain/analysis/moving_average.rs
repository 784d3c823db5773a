//! Simple and exponential moving averages.
//!
//! EMA: k = 2/(n+1), seeded with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k).

use crate::domain::command::MaType;

pub fn sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return values;
    }

    let mut sum: f64 = closes[..period].iter().sum();
    values[period - 1] = Some(sum / period as f64);
    for i in period..closes.len() {
        sum += closes[i] - closes[i - period];
        values[i] = Some(sum / period as f64);
    }
    values
}

pub fn ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return values;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = closes[..period].iter().sum::<f64>() / period as f64;
    values[period - 1] = Some(ema);
    for i in period..closes.len() {
        ema = closes[i] * k + ema * (1.0 - k);
        values[i] = Some(ema);
    }
    values
}

pub fn moving_average(closes: &[f64], period: usize, ma_type: MaType) -> Vec<Option<f64>> {
    match ma_type {
        MaType::Sma => sma(closes, period),
        MaType::Ema => ema(closes, period),
    }
}

/// Last defined value of a series.
pub fn last_value(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}
