//! Overlays tracked by the overlay manager.
//!
//! An overlay is a group of surface elements drawn for one command. Elements
//! are collected in an [`ElementGroup`] while drawing; the group is either
//! committed into an [`Overlay`] or rolled back so that no element outlives a
//! failed draw.

use std::fmt;

use tracing::warn;

use crate::domain::analysis::FibonacciLevels;
use crate::domain::command::MaType;
use crate::domain::error::TerminalError;
use crate::ports::surface_port::{ChartSurface, ElementId, LabelSpec, LineSpec, PolylineSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayKind {
    HorizontalLine {
        price: f64,
        color: String,
    },
    VerticalLine {
        time: i64,
        color: String,
    },
    MovingAverage {
        period: usize,
        ma_type: MaType,
        /// `(time, value)` pairs that were drawn.
        points: Vec<(i64, f64)>,
    },
    Fibonacci {
        levels: FibonacciLevels,
    },
    BollingerBands {
        period: usize,
        upper: Vec<(i64, f64)>,
        middle: Vec<(i64, f64)>,
        lower: Vec<(i64, f64)>,
    },
}

impl OverlayKind {
    pub fn is_moving_average(&self) -> bool {
        matches!(self, OverlayKind::MovingAverage { .. })
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayKind::HorizontalLine { price, .. } => write!(f, "horizontal line ${:.2}", price),
            OverlayKind::VerticalLine { time, .. } => write!(f, "vertical line @{}", time),
            OverlayKind::MovingAverage {
                period, ma_type, ..
            } => write!(f, "{}({})", ma_type, period),
            OverlayKind::Fibonacci { levels } => write!(
                f,
                "fibonacci ${:.2} - ${:.2}",
                levels[0].price, levels[6].price
            ),
            OverlayKind::BollingerBands { period, .. } => write!(f, "BB({})", period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub id: OverlayId,
    pub kind: OverlayKind,
    pub elements: Vec<ElementId>,
}

/// Elements drawn so far for an overlay that is not yet tracked.
#[derive(Debug, Default)]
pub struct ElementGroup {
    elements: Vec<ElementId>,
}

impl ElementGroup {
    pub fn line<S: ChartSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        spec: LineSpec,
    ) -> Result<(), TerminalError> {
        self.elements.push(surface.draw_line(spec)?);
        Ok(())
    }

    pub fn polyline<S: ChartSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        spec: PolylineSpec,
    ) -> Result<(), TerminalError> {
        self.elements.push(surface.draw_polyline(spec)?);
        Ok(())
    }

    pub fn label<S: ChartSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        spec: LabelSpec,
    ) -> Result<(), TerminalError> {
        self.elements.push(surface.draw_label(spec)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn commit(self, id: OverlayId, kind: OverlayKind) -> Overlay {
        Overlay {
            id,
            kind,
            elements: self.elements,
        }
    }

    /// Remove everything drawn so far, newest first.
    pub fn rollback<S: ChartSurface + ?Sized>(self, surface: &mut S) {
        for element in self.elements.into_iter().rev() {
            if let Err(e) = surface.remove_element(element) {
                warn!(element = element.0, error = %e, "failed to roll back element");
            }
        }
    }
}

/// Remove every element of `overlay`, returning how many removals failed.
pub fn remove_elements<S: ChartSurface + ?Sized>(surface: &mut S, overlay: &Overlay) -> usize {
    let mut failures = 0;
    for &element in &overlay.elements {
        if let Err(e) = surface.remove_element(element) {
            warn!(
                overlay = overlay.id.0,
                element = element.0,
                error = %e,
                "failed to remove overlay element"
            );
            failures += 1;
        }
    }
    failures
}
