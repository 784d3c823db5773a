//! Bollinger Bands.
//!
//! Middle: SMA over n closes. Upper/lower: middle ± 2σ, where σ is the
//! population standard deviation (divides by N) of the same window.

pub const STDDEV_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

pub fn bollinger_bands(closes: &[f64], period: usize) -> Vec<Option<BollingerPoint>> {
    let mut values = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return values;
    }

    for i in (period - 1)..closes.len() {
        let window = &closes[i + 1 - period..=i];
        let middle = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|c| {
                let diff = c - middle;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let stddev = variance.sqrt();

        values[i] = Some(BollingerPoint {
            upper: middle + STDDEV_MULTIPLIER * stddev,
            middle,
            lower: middle - STDDEV_MULTIPLIER * stddev,
        });
    }
    values
}
