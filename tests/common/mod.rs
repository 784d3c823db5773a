#![allow(dead_code)]

use async_trait::async_trait;
use chartterm::adapters::csv_preference_adapter::InMemoryPreferences;
use chartterm::domain::assistant::Assistant;
pub use chartterm::domain::bar::Bar;
use chartterm::domain::bar::{BarFetch, BarRequest, SECONDS_PER_DAY};
use chartterm::domain::coordinates::ContainerSize;
use chartterm::domain::error::{TerminalError, WidgetError};
use chartterm::domain::overlay_manager::OverlayManager;
use chartterm::domain::session::Session;
use chartterm::ports::bar_port::BarPort;
use chartterm::ports::llm_port::LanguageModelPort;
use chartterm::ports::surface_port::{
    ChartSurface, ElementId, LabelSpec, LineSpec, PolylineSpec,
};
use chartterm::ports::widget_port::ChartWidget;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// 2024-03-01T00:00:00Z
pub const NOW: i64 = 1_709_251_200;

pub fn fixed_now() -> i64 {
    NOW
}

pub fn make_bar(time: i64, close: f64) -> Bar {
    Bar {
        time,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000,
    }
}

/// Daily bars ending the day before [`NOW`], one per close.
pub fn daily_bars(closes: &[f64]) -> Vec<Bar> {
    let start = NOW - closes.len() as i64 * SECONDS_PER_DAY;
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(start + i as i64 * SECONDS_PER_DAY, c))
        .collect()
}

pub fn trending_bars(n: usize, start_price: f64, step: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..n).map(|i| start_price + step * i as f64).collect();
    daily_bars(&closes)
}

// ---------------------------------------------------------------------------
// Bar data
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockBarPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
    pub requests: Mutex<Vec<BarRequest>>,
}

impl MockBarPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl BarPort for MockBarPort {
    async fn fetch_bars(&self, request: &BarRequest) -> Result<BarFetch, TerminalError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(reason) = self.errors.get(&request.symbol) {
            return Err(TerminalError::Fetch {
                symbol: request.symbol.clone(),
                reason: reason.clone(),
            });
        }
        Ok(match self.data.get(&request.symbol) {
            Some(bars) if !bars.is_empty() => BarFetch::Bars(bars.clone()),
            _ => BarFetch::NoData,
        })
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Drawn {
    Line(LineSpec),
    Polyline(PolylineSpec),
    Label(LabelSpec),
}

/// Surface that keeps drawn elements in memory and can be told to fail.
#[derive(Debug)]
pub struct RecordingSurface {
    pub size: ContainerSize,
    pub elements: BTreeMap<ElementId, Drawn>,
    next_id: u64,
    draws: usize,
    /// Draw calls succeed until this many have been made.
    pub fail_draw_after: Option<usize>,
    pub fail_removal_of: HashSet<ElementId>,
    pub removals: usize,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: ContainerSize::new(width, height),
            elements: BTreeMap::new(),
            next_id: 1,
            draws: 0,
            fail_draw_after: None,
            fail_removal_of: HashSet::new(),
            removals: 0,
        }
    }

    fn insert(&mut self, drawn: Drawn) -> Result<ElementId, TerminalError> {
        if self.fail_draw_after.is_some_and(|limit| self.draws >= limit) {
            return Err(TerminalError::Render {
                reason: "surface refused to draw".into(),
            });
        }
        self.draws += 1;
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, drawn);
        Ok(id)
    }

    pub fn labels(&self) -> Vec<&LabelSpec> {
        self.elements
            .values()
            .filter_map(|e| match e {
                Drawn::Label(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<&LineSpec> {
        self.elements
            .values()
            .filter_map(|e| match e {
                Drawn::Line(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    pub fn polylines(&self) -> Vec<&PolylineSpec> {
        self.elements
            .values()
            .filter_map(|e| match e {
                Drawn::Polyline(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

impl ChartSurface for RecordingSurface {
    fn container_size(&self) -> ContainerSize {
        self.size
    }

    fn draw_line(&mut self, line: LineSpec) -> Result<ElementId, TerminalError> {
        self.insert(Drawn::Line(line))
    }

    fn draw_polyline(&mut self, polyline: PolylineSpec) -> Result<ElementId, TerminalError> {
        self.insert(Drawn::Polyline(polyline))
    }

    fn draw_label(&mut self, label: LabelSpec) -> Result<ElementId, TerminalError> {
        self.insert(Drawn::Label(label))
    }

    fn remove_element(&mut self, id: ElementId) -> Result<(), TerminalError> {
        if self.fail_removal_of.contains(&id) {
            return Err(TerminalError::Render {
                reason: format!("element {} is locked", id.0),
            });
        }
        self.elements
            .remove(&id)
            .map(|_| self.removals += 1)
            .ok_or_else(|| TerminalError::Render {
                reason: format!("no element {}", id.0),
            })
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// Widget whose entry points can be individually disabled. Calls are
/// recorded as `method:symbol` in a shared log.
#[derive(Default)]
pub struct ScriptedWidget {
    pub fail_set_symbol: bool,
    pub fail_chart_set_symbol: bool,
    pub fail_recreate: bool,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedWidget {
    pub fn working() -> Self {
        Self::default()
    }

    pub fn failing_all() -> Self {
        Self {
            fail_set_symbol: true,
            fail_chart_set_symbol: true,
            fail_recreate: true,
            ..Self::default()
        }
    }

    fn record(&self, method: &str, symbol: &str, fail: bool) -> Result<(), WidgetError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", method, symbol));
        if fail {
            Err(WidgetError::Unsupported)
        } else {
            Ok(())
        }
    }
}

impl ChartWidget for ScriptedWidget {
    fn set_symbol(&mut self, symbol: &str, _interval: &str) -> Result<(), WidgetError> {
        self.record("set_symbol", symbol, self.fail_set_symbol)
    }

    fn chart_set_symbol(&mut self, symbol: &str) -> Result<(), WidgetError> {
        self.record("chart_set_symbol", symbol, self.fail_chart_set_symbol)
    }

    fn recreate(&mut self, symbol: &str) -> Result<(), WidgetError> {
        self.record("recreate", symbol, self.fail_recreate)
    }
}

// ---------------------------------------------------------------------------
// Language model
// ---------------------------------------------------------------------------

pub struct ScriptedModel {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModelPort for ScriptedModel {
    async fn complete(&self, _api_key: &str, prompt: &str) -> Result<String, TerminalError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(|reason| TerminalError::Assistant { reason })
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn manager_with(
    bars: MockBarPort,
    widget: ScriptedWidget,
    symbol: &str,
) -> OverlayManager<RecordingSurface> {
    let mut manager = OverlayManager::new(RecordingSurface::new(800.0, 600.0), Arc::new(bars), symbol)
        .with_clock(fixed_now);
    manager.attach_widget(Box::new(widget));
    manager
}

pub fn manager(bars: MockBarPort) -> OverlayManager<RecordingSurface> {
    manager_with(bars, ScriptedWidget::working(), "AAPL")
}

pub fn session(bars: MockBarPort) -> Session<RecordingSurface> {
    Session::new(
        manager(bars),
        Assistant::local_only(),
        Box::new(InMemoryPreferences::new()),
    )
}
