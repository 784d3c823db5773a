//! SVG chart surface.
//!
//! Keeps the elements currently drawn and renders them as a standalone SVG
//! document, one element per tag in draw order.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::domain::coordinates::ContainerSize;
use crate::domain::error::TerminalError;
use crate::ports::surface_port::{
    ChartSurface, ElementId, LabelAnchor, LabelSpec, LineOrientation, LineSpec, PolylineSpec,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SvgElement {
    Line(LineSpec),
    Polyline(PolylineSpec),
    Label(LabelSpec),
}

pub struct SvgSurface {
    size: ContainerSize,
    elements: BTreeMap<ElementId, SvgElement>,
    next_id: u64,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: ContainerSize::new(width, height),
            elements: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: ElementId) -> Option<&SvgElement> {
        self.elements.get(&id)
    }

    fn insert(&mut self, element: SvgElement) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, element);
        id
    }

    pub fn render(&self, title: &str) -> String {
        let (w, h) = (self.size.width, self.size.height);
        let mut svg = format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">
  <rect width="100%" height="100%" fill="#131722"/>
  <text x="10" y="{:.1}" fill="#D1D4DC" font-family="monospace" font-size="12">{}</text>
"##,
            h - 10.0,
            escape(title)
        );
        for element in self.elements.values() {
            svg.push_str(&self.element_tag(element));
        }
        svg.push_str("</svg>\n");
        svg
    }

    fn element_tag(&self, element: &SvgElement) -> String {
        let (w, h) = (self.size.width, self.size.height);
        match element {
            SvgElement::Line(line) => {
                let (x1, y1, x2, y2) = match line.orientation {
                    LineOrientation::Horizontal { y } => (0.0, y, w, y),
                    LineOrientation::Vertical { x } => (x, 0.0, x, h),
                };
                format!(
                    "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"{}\" opacity=\"{}\"/>\n",
                    x1,
                    y1,
                    x2,
                    y2,
                    escape(&line.color),
                    line.stroke_width,
                    line.opacity
                )
            }
            SvgElement::Polyline(polyline) => {
                let points: Vec<String> = polyline
                    .points
                    .iter()
                    .map(|(x, y)| format!("{:.1},{:.1}", x, y))
                    .collect();
                format!(
                    "  <polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" opacity=\"{}\"/>\n",
                    points.join(" "),
                    escape(&polyline.color),
                    polyline.stroke_width,
                    polyline.opacity
                )
            }
            SvgElement::Label(label) => {
                let anchor = match label.anchor {
                    LabelAnchor::Start => "start",
                    LabelAnchor::End => "end",
                };
                format!(
                    "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"{}\" text-anchor=\"{}\" font-family=\"monospace\" font-size=\"11\">{}</text>\n",
                    label.x,
                    label.y,
                    escape(&label.color),
                    anchor,
                    escape(&label.text)
                )
            }
        }
    }

    /// Render to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path, title: &str) -> Result<(), TerminalError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render(title))?;
        Ok(())
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

impl ChartSurface for SvgSurface {
    fn container_size(&self) -> ContainerSize {
        self.size
    }

    fn draw_line(&mut self, line: LineSpec) -> Result<ElementId, TerminalError> {
        Ok(self.insert(SvgElement::Line(line)))
    }

    fn draw_polyline(&mut self, polyline: PolylineSpec) -> Result<ElementId, TerminalError> {
        Ok(self.insert(SvgElement::Polyline(polyline)))
    }

    fn draw_label(&mut self, label: LabelSpec) -> Result<ElementId, TerminalError> {
        Ok(self.insert(SvgElement::Label(label)))
    }

    fn remove_element(&mut self, id: ElementId) -> Result<(), TerminalError> {
        self.elements
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| TerminalError::Render {
                reason: format!("no element {}", id.0),
            })
    }
}
