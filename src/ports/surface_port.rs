//! Rendering surface port.
//!
//! Overlays are drawn as primitive elements on a surface layered over the
//! chart widget. The surface hands back an [`ElementId`] per element so the
//! owner can remove exactly what it drew.

use crate::domain::coordinates::ContainerSize;
use crate::domain::error::TerminalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineOrientation {
    /// Spans the full width at pixel row `y`.
    Horizontal { y: f64 },
    /// Spans the full height at pixel column `x`.
    Vertical { x: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub orientation: LineOrientation,
    pub color: String,
    pub stroke_width: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolylineSpec {
    pub points: Vec<(f64, f64)>,
    pub color: String,
    pub stroke_width: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAnchor {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub anchor: LabelAnchor,
}

pub trait ChartSurface {
    fn container_size(&self) -> ContainerSize;
    fn draw_line(&mut self, line: LineSpec) -> Result<ElementId, TerminalError>;
    fn draw_polyline(&mut self, polyline: PolylineSpec) -> Result<ElementId, TerminalError>;
    fn draw_label(&mut self, label: LabelSpec) -> Result<ElementId, TerminalError>;
    fn remove_element(&mut self, id: ElementId) -> Result<(), TerminalError>;
}
