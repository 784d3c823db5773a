//! Price/time to pixel mapping.
//!
//! The plot occupies the middle 80% of the container height with a 10% margin
//! above and below. Simple lines and Fibonacci levels use the fixed
//! `[100, 300]` price range regardless of the symbol; indicator polylines use
//! scales derived from the data they draw.

pub const PLOT_FRACTION: f64 = 0.8;
pub const PLOT_MARGIN: f64 = 0.1;
pub const FIXED_PRICE_MIN: f64 = 100.0;
pub const FIXED_PRICE_MAX: f64 = 300.0;
/// Fixed-scale lines are kept this many pixels inside the container edges.
pub const LINE_INSET: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    pub min: f64,
    pub max: f64,
}

impl PriceScale {
    pub fn fixed() -> Self {
        Self {
            min: FIXED_PRICE_MIN,
            max: FIXED_PRICE_MAX,
        }
    }

    /// Range spanning every finite value, or `None` if there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut scale: Option<Self> = None;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            scale = Some(match scale {
                Some(s) => Self {
                    min: s.min.min(v),
                    max: s.max.max(v),
                },
                None => Self { min: v, max: v },
            });
        }
        scale
    }

    /// Fraction of the range below `price`; a zero-width range maps to the middle.
    pub fn fraction(&self, price: f64) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            0.5
        } else {
            (price - self.min) / range
        }
    }

    pub fn y(&self, price: f64, size: ContainerSize) -> f64 {
        size.height * (1.0 - self.fraction(price)) * PLOT_FRACTION + size.height * PLOT_MARGIN
    }

    /// `y` on this scale, clamped [`LINE_INSET`] pixels inside the container.
    pub fn clamped_y(&self, price: f64, size: ContainerSize) -> f64 {
        let inset = LINE_INSET.min(size.height / 2.0);
        self.y(price, size).clamp(inset, size.height - inset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub start: i64,
    pub end: i64,
}

impl TimeScale {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn x(&self, time: i64, size: ContainerSize) -> f64 {
        let range = (self.end - self.start) as f64;
        if range == 0.0 {
            return size.width / 2.0;
        }
        (time - self.start) as f64 / range * size.width
    }

    pub fn clamped_x(&self, time: i64, size: ContainerSize) -> f64 {
        self.x(time, size).clamp(0.0, size.width)
    }
}

/// Pixel points for `(time, price)` pairs, dropping any that fall outside the
/// container.
pub fn project_points(
    points: &[(i64, f64)],
    time: TimeScale,
    price: PriceScale,
    size: ContainerSize,
) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|&(t, p)| (time.x(t, size), price.y(p, size)))
        .filter(|&(x, y)| size.contains(x, y))
        .collect()
}
