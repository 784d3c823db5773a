//! Chart overlay manager.
//!
//! Owns every overlay drawn on the chart surface and the chart widget used for
//! symbol changes. Horizontal lines and Fibonacci levels are positioned on the
//! fixed `[100, 300]` price scale; moving averages and Bollinger Bands fetch
//! bars for the current symbol and derive their scales from the data.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::analysis::{bollinger_bands, fibonacci_levels, moving_average};
use crate::domain::bar::{Bar, BarRequest, SECONDS_PER_DAY, closes, unix_now, validate_series};
use crate::domain::command::MaType;
use crate::domain::coordinates::{PriceScale, TimeScale, project_points};
use crate::domain::error::TerminalError;
use crate::domain::overlay::{ElementGroup, Overlay, OverlayId, OverlayKind, remove_elements};
use crate::domain::symbol_change::{STRATEGIES, SymbolChangeStrategy, qualify};
use crate::ports::bar_port::BarPort;
use crate::ports::surface_port::{
    ChartSurface, LabelAnchor, LabelSpec, LineOrientation, LineSpec, PolylineSpec,
};
use crate::ports::widget_port::ChartWidget;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 90;

pub const FIBONACCI_COLORS: [&str; 7] = [
    "#FF0000", "#FF9900", "#FFFF00", "#00FF00", "#0099FF", "#9900FF", "#FF0000",
];

pub const BB_OUTER_COLOR: &str = "#0066CC";
pub const BB_MIDDLE_COLOR: &str = "#FF6600";

pub struct OverlayManager<S: ChartSurface> {
    surface: S,
    widget: Option<Box<dyn ChartWidget>>,
    bars: Arc<dyn BarPort>,
    overlays: Vec<Overlay>,
    next_id: u64,
    current_symbol: String,
    lookback_days: i64,
    clock: fn() -> i64,
}

impl<S: ChartSurface> OverlayManager<S> {
    pub fn new(surface: S, bars: Arc<dyn BarPort>, symbol: &str) -> Self {
        Self {
            surface,
            widget: None,
            bars,
            overlays: Vec::new(),
            next_id: 1,
            current_symbol: symbol.trim().to_uppercase(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            clock: unix_now,
        }
    }

    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn attach_widget(&mut self, widget: Box<dyn ChartWidget>) {
        self.widget = Some(widget);
    }

    pub fn is_ready(&self) -> bool {
        self.widget.is_some()
    }

    pub fn current_symbol(&self) -> &str {
        &self.current_symbol
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn bar_port(&self) -> &dyn BarPort {
        self.bars.as_ref()
    }

    pub fn now(&self) -> i64 {
        (self.clock)()
    }

    fn draw_overlay<F>(&mut self, kind: OverlayKind, draw: F) -> Result<OverlayId, TerminalError>
    where
        F: FnOnce(&mut ElementGroup, &mut S) -> Result<(), TerminalError>,
    {
        let mut group = ElementGroup::default();
        if let Err(e) = draw(&mut group, &mut self.surface) {
            warn!(overlay = %kind, drawn = group.len(), error = %e, "draw failed, rolling back");
            group.rollback(&mut self.surface);
            return Err(e);
        }

        let id = OverlayId(self.next_id);
        self.next_id += 1;
        let overlay = group.commit(id, kind);
        info!(id = id.0, overlay = %overlay.kind, elements = overlay.elements.len(), "overlay added");
        self.overlays.push(overlay);
        Ok(id)
    }

    pub fn add_horizontal_line(&mut self, price: f64, color: &str) -> Result<OverlayId, TerminalError> {
        let size = self.surface.container_size();
        let y = PriceScale::fixed().clamped_y(price, size);
        let kind = OverlayKind::HorizontalLine {
            price,
            color: color.to_string(),
        };
        self.draw_overlay(kind, |group, surface| {
            group.line(
                surface,
                LineSpec {
                    orientation: LineOrientation::Horizontal { y },
                    color: color.to_string(),
                    stroke_width: 2.0,
                    opacity: 1.0,
                },
            )?;
            group.label(
                surface,
                LabelSpec {
                    text: format!("${:.2}", price),
                    x: size.width - 5.0,
                    y: y - 12.0,
                    color: color.to_string(),
                    anchor: LabelAnchor::End,
                },
            )
        })
    }

    /// Vertical marker positioned within the lookback window ending now.
    pub fn add_vertical_line(&mut self, time: i64, color: &str) -> Result<OverlayId, TerminalError> {
        let size = self.surface.container_size();
        let now = self.now();
        let scale = TimeScale::new(now - self.lookback_days * SECONDS_PER_DAY, now);
        let x = scale.clamped_x(time, size);
        let kind = OverlayKind::VerticalLine {
            time,
            color: color.to_string(),
        };
        self.draw_overlay(kind, |group, surface| {
            group.line(
                surface,
                LineSpec {
                    orientation: LineOrientation::Vertical { x },
                    color: color.to_string(),
                    stroke_width: 2.0,
                    opacity: 1.0,
                },
            )
        })
    }

    /// Fetch the lookback window for the current symbol. `Ok(None)` when there
    /// are fewer than `minimum` bars.
    async fn fetch_series(&self, minimum: usize, what: &str) -> Result<Option<Vec<Bar>>, TerminalError> {
        let request = BarRequest::trailing_days(&self.current_symbol, self.lookback_days, self.now());
        debug!(symbol = %request.symbol, from = request.from, to = request.to, what, "fetching bars");
        let bars = self.bars.fetch_bars(&request).await?.into_bars();
        validate_series(&bars)?;
        if minimum == 0 || bars.len() < minimum {
            warn!(
                symbol = %self.current_symbol,
                bars = bars.len(),
                minimum,
                what,
                "insufficient data, nothing drawn"
            );
            return Ok(None);
        }
        debug!(symbol = %self.current_symbol, bars = bars.len(), what, "bars fetched");
        Ok(Some(bars))
    }

    pub async fn add_moving_average(
        &mut self,
        period: usize,
        ma_type: MaType,
        color: Option<&str>,
    ) -> Result<Option<OverlayId>, TerminalError> {
        let what = format!("{}({})", ma_type, period);
        let Some(bars) = self.fetch_series(period, &what).await? else {
            return Ok(None);
        };

        let values = moving_average(&closes(&bars), period, ma_type);
        let points: Vec<(i64, f64)> = bars
            .iter()
            .zip(&values)
            .filter_map(|(bar, v)| v.map(|v| (bar.time, v)))
            .collect();

        let size = self.surface.container_size();
        let time = TimeScale::new(bars[0].time, bars[bars.len() - 1].time);
        let price = PriceScale::from_values(
            bars.iter().map(|b| b.close).chain(points.iter().map(|p| p.1)),
        )
        .unwrap_or_else(PriceScale::fixed);
        let pixels = project_points(&points, time, price, size);

        let color = color.unwrap_or(ma_type.default_color()).to_string();
        let stacked = self.overlays.iter().filter(|o| o.kind.is_moving_average()).count();
        let kind = OverlayKind::MovingAverage {
            period,
            ma_type,
            points,
        };
        let id = self.draw_overlay(kind, |group, surface| {
            group.polyline(
                surface,
                PolylineSpec {
                    points: pixels,
                    color: color.clone(),
                    stroke_width: 2.0,
                    opacity: 0.8,
                },
            )?;
            group.label(
                surface,
                LabelSpec {
                    text: what.clone(),
                    x: 20.0,
                    y: 20.0 + 30.0 * stacked as f64,
                    color: color.clone(),
                    anchor: LabelAnchor::Start,
                },
            )
        })?;
        Ok(Some(id))
    }

    /// Seven retracement lines between the two prices, tracked as one overlay.
    pub fn add_fibonacci_retracement(
        &mut self,
        start_price: f64,
        end_price: f64,
    ) -> Result<OverlayId, TerminalError> {
        let levels = fibonacci_levels(start_price.min(end_price), start_price.max(end_price));
        let size = self.surface.container_size();
        let scale = PriceScale::fixed();
        self.draw_overlay(OverlayKind::Fibonacci { levels }, |group, surface| {
            for (level, color) in levels.iter().zip(FIBONACCI_COLORS) {
                let y = scale.clamped_y(level.price, size);
                group.line(
                    surface,
                    LineSpec {
                        orientation: LineOrientation::Horizontal { y },
                        color: color.to_string(),
                        stroke_width: 1.0,
                        opacity: 0.7,
                    },
                )?;
                group.label(
                    surface,
                    LabelSpec {
                        text: format!("{:.1}% (${:.2})", level.ratio * 100.0, level.price),
                        x: size.width - 5.0,
                        y: y - 8.0,
                        color: color.to_string(),
                        anchor: LabelAnchor::End,
                    },
                )?;
            }
            Ok(())
        })
    }

    pub async fn add_bollinger_bands(&mut self, period: usize) -> Result<Option<OverlayId>, TerminalError> {
        let what = format!("BB({})", period);
        let Some(bars) = self.fetch_series(period, &what).await? else {
            return Ok(None);
        };

        let bands = bollinger_bands(&closes(&bars), period);
        let mut upper = Vec::new();
        let mut middle = Vec::new();
        let mut lower = Vec::new();
        for (bar, point) in bars.iter().zip(&bands) {
            if let Some(p) = point {
                upper.push((bar.time, p.upper));
                middle.push((bar.time, p.middle));
                lower.push((bar.time, p.lower));
            }
        }

        let size = self.surface.container_size();
        let time = TimeScale::new(bars[0].time, bars[bars.len() - 1].time);
        let price = PriceScale::from_values(
            bars.iter()
                .map(|b| b.close)
                .chain(upper.iter().map(|p| p.1))
                .chain(lower.iter().map(|p| p.1)),
        )
        .unwrap_or_else(PriceScale::fixed);

        let band_specs = [
            ("upper", BB_OUTER_COLOR, project_points(&upper, time, price, size), 20.0),
            ("middle", BB_MIDDLE_COLOR, project_points(&middle, time, price, size), size.height * 0.5),
            ("lower", BB_OUTER_COLOR, project_points(&lower, time, price, size), size.height * 0.9),
        ];
        let kind = OverlayKind::BollingerBands {
            period,
            upper,
            middle,
            lower,
        };
        let id = self.draw_overlay(kind, |group, surface| {
            for (band, color, pixels, _) in &band_specs {
                group.polyline(
                    surface,
                    PolylineSpec {
                        points: pixels.clone(),
                        color: color.to_string(),
                        stroke_width: 1.5,
                        opacity: 0.6,
                    },
                )?;
                debug!(band, points = pixels.len(), "bollinger band drawn");
            }
            for (band, color, _, label_y) in &band_specs {
                group.label(
                    surface,
                    LabelSpec {
                        text: format!("BB {}({})", band, period),
                        x: 10.0,
                        y: *label_y,
                        color: color.to_string(),
                        anchor: LabelAnchor::Start,
                    },
                )?;
            }
            Ok(())
        })?;
        Ok(Some(id))
    }

    /// Remove one overlay and every element it drew. Returns `false` for an
    /// unknown id.
    pub fn remove_overlay(&mut self, id: OverlayId) -> bool {
        let Some(index) = self.overlays.iter().position(|o| o.id == id) else {
            return false;
        };
        let overlay = self.overlays.remove(index);
        remove_elements(&mut self.surface, &overlay);
        info!(id = id.0, overlay = %overlay.kind, "overlay removed");
        true
    }

    /// Remove every overlay. Element removal failures are logged and skipped.
    pub fn clear_all_shapes(&mut self) -> usize {
        let overlays = std::mem::take(&mut self.overlays);
        let mut failures = 0;
        for overlay in &overlays {
            failures += remove_elements(&mut self.surface, overlay);
        }
        info!(cleared = overlays.len(), failures, "cleared all overlays");
        overlays.len()
    }

    /// Switch the widget to `symbol`, escalating through [`STRATEGIES`].
    pub fn change_symbol(&mut self, symbol: &str) -> Result<SymbolChangeStrategy, TerminalError> {
        let widget = self
            .widget
            .as_deref_mut()
            .ok_or(TerminalError::WidgetNotInitialized)?;
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(TerminalError::EmptySymbol);
        }

        let qualified = qualify(&symbol);
        for strategy in STRATEGIES {
            debug!(%strategy, symbol = %qualified, "trying symbol change");
            match strategy.apply(widget, &qualified) {
                Ok(()) => {
                    info!(%strategy, symbol = %qualified, "symbol changed");
                    self.current_symbol = symbol;
                    return Ok(strategy);
                }
                Err(e) => warn!(%strategy, symbol = %qualified, error = %e, "symbol change strategy failed"),
            }
        }
        Err(TerminalError::SymbolChangeFailed { symbol })
    }
}
