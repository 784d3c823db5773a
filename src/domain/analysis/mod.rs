//! Technical analysis over closing-price series.
//!
//! Every series function returns one entry per input close; entries before the
//! warm-up window is full are `None`. A series shorter than the period (or a
//! zero period) yields all `None`.

pub mod bollinger;
pub mod fibonacci;
pub mod levels;
pub mod moving_average;

pub use bollinger::{BollingerPoint, bollinger_bands};
pub use fibonacci::{FIBONACCI_RATIOS, FibonacciLevel, FibonacciLevels, fibonacci_levels};
pub use levels::{KeyLevels, find_key_levels, generate_commands, resistance_levels, support_levels};
pub use moving_average::{ema, moving_average, sma};
