//! Fibonacci retracement levels.

pub const FIBONACCI_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibonacciLevel {
    pub ratio: f64,
    pub price: f64,
}

pub type FibonacciLevels = [FibonacciLevel; 7];

/// `low + (high - low) * ratio` for each ratio. The endpoints are exact.
pub fn fibonacci_levels(low: f64, high: f64) -> FibonacciLevels {
    let diff = high - low;
    FIBONACCI_RATIOS.map(|ratio| {
        let price = if ratio == 0.0 {
            low
        } else if ratio == 1.0 {
            high
        } else {
            low + diff * ratio
        };
        FibonacciLevel { ratio, price }
    })
}
