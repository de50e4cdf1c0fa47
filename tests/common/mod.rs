//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use slint::{Color, SharedString};

use flownet_canvas::{
    CanvasConfig, CanvasController, CanvasObserver, EdgeAttributes, EdgeId, EdgePrimitives,
    FlowGraph, GraphKind, NodeId, PrimitiveHandle, Renderer,
};

/// What kind of primitive a recorded handle represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    NodeGroup,
    EdgeLines,
    EdgeBoxes,
    EdgeArrows,
    Label,
}

/// Everything the canvas has pushed into one primitive so far.
#[derive(Debug, Clone)]
pub struct PrimitiveState {
    pub kind: Primitive,
    pub removed: bool,
    pub positions: Vec<(f32, f32)>,
    pub colors: Vec<Color>,
    pub segments: Vec<((f32, f32), (f32, f32))>,
    pub widths: Vec<f32>,
    pub position: (f32, f32),
    pub text: String,
    pub font_size: f32,
    pub rotation: f32,
    /// Number of mutations through the handle since creation.
    pub mutations: usize,
}

impl PrimitiveState {
    fn new(kind: Primitive) -> Self {
        Self {
            kind,
            removed: false,
            positions: Vec::new(),
            colors: Vec::new(),
            segments: Vec::new(),
            widths: Vec::new(),
            position: (0.0, 0.0),
            text: String::new(),
            font_size: 0.0,
            rotation: 0.0,
            mutations: 0,
        }
    }
}

#[derive(Default)]
struct Ledger {
    next_id: usize,
    primitives: HashMap<usize, PrimitiveState>,
    view: Option<((f32, f32), (f32, f32))>,
    redraws: usize,
    draw_calls: usize,
}

/// A handle into the recording ledger.
#[derive(Clone)]
pub struct RecordedHandle {
    id: usize,
    ledger: Rc<RefCell<Ledger>>,
}

impl RecordedHandle {
    fn mutate(&self, f: impl FnOnce(&mut PrimitiveState)) {
        let mut ledger = self.ledger.borrow_mut();
        let state = ledger.primitives.get_mut(&self.id).expect("handle outlived ledger");
        assert!(!state.removed, "mutated a removed primitive");
        state.mutations += 1;
        f(state);
    }
}

impl PrimitiveHandle for RecordedHandle {
    fn remove(self) {
        let mut ledger = self.ledger.borrow_mut();
        let state = ledger.primitives.get_mut(&self.id).expect("handle outlived ledger");
        assert!(!state.removed, "primitive removed twice");
        state.removed = true;
    }

    fn set_colors(&self, colors: &[Color]) {
        self.mutate(|s| s.colors = colors.to_vec());
    }

    fn set_segments(&self, segments: &[((f32, f32), (f32, f32))]) {
        self.mutate(|s| s.segments = segments.to_vec());
    }

    fn set_line_widths(&self, widths: &[f32]) {
        self.mutate(|s| s.widths = widths.to_vec());
    }

    fn set_position(&self, position: (f32, f32)) {
        self.mutate(|s| s.position = position);
    }

    fn set_text(&self, text: &SharedString) {
        self.mutate(|s| s.text = text.to_string());
    }

    fn set_font_size(&self, size: f32) {
        self.mutate(|s| s.font_size = size);
    }

    fn set_rotation(&self, degrees: f32) {
        self.mutate(|s| s.rotation = degrees);
    }
}

/// A [`Renderer`] that records every draw call and handle mutation instead
/// of drawing. Create one with [`recording_renderer`] and inspect the shared
/// [`RenderProbe`] from the test.
pub struct RecordingRenderer {
    ledger: Rc<RefCell<Ledger>>,
}

impl RecordingRenderer {
    fn create(&mut self, state: PrimitiveState) -> RecordedHandle {
        let mut ledger = self.ledger.borrow_mut();
        let id = ledger.next_id;
        ledger.next_id += 1;
        ledger.primitives.insert(id, state);
        RecordedHandle { id, ledger: Rc::clone(&self.ledger) }
    }
}

impl Renderer for RecordingRenderer {
    type Handle = RecordedHandle;

    fn draw_nodes(
        &mut self,
        positions: &[(f32, f32)],
        colors: &[Color],
        _size: f32,
    ) -> RecordedHandle {
        self.ledger.borrow_mut().draw_calls += 1;
        let mut state = PrimitiveState::new(Primitive::NodeGroup);
        state.positions = positions.to_vec();
        state.colors = colors.to_vec();
        self.create(state)
    }

    fn draw_edges(
        &mut self,
        segments: &[((f32, f32), (f32, f32))],
        colors: &[Color],
        widths: &[f32],
        arrows_enabled: bool,
    ) -> EdgePrimitives<RecordedHandle> {
        self.ledger.borrow_mut().draw_calls += 1;
        let mut lines = PrimitiveState::new(Primitive::EdgeLines);
        lines.segments = segments.to_vec();
        lines.colors = colors.to_vec();
        lines.widths = widths.to_vec();
        let mut boxes = PrimitiveState::new(Primitive::EdgeBoxes);
        boxes.segments = segments.to_vec();
        boxes.colors = colors.to_vec();
        let mut arrows = PrimitiveState::new(Primitive::EdgeArrows);
        arrows.segments = segments.to_vec();
        EdgePrimitives {
            lines: self.create(lines),
            boxes: self.create(boxes),
            arrows: arrows_enabled.then(|| self.create(arrows)),
        }
    }

    fn draw_label(
        &mut self,
        position: (f32, f32),
        text: &SharedString,
        size: f32,
        rotation: f32,
    ) -> RecordedHandle {
        self.ledger.borrow_mut().draw_calls += 1;
        let mut state = PrimitiveState::new(Primitive::Label);
        state.position = position;
        state.text = text.to_string();
        state.font_size = size;
        state.rotation = rotation;
        self.create(state)
    }

    fn set_view(&mut self, x_bounds: (f32, f32), y_bounds: (f32, f32)) {
        self.ledger.borrow_mut().view = Some((x_bounds, y_bounds));
    }

    fn request_redraw(&mut self) {
        self.ledger.borrow_mut().redraws += 1;
    }
}

/// Read-only view into a [`RecordingRenderer`]'s ledger.
#[derive(Clone)]
pub struct RenderProbe {
    ledger: Rc<RefCell<Ledger>>,
}

impl RenderProbe {
    pub fn redraws(&self) -> usize {
        self.ledger.borrow().redraws
    }

    pub fn draw_calls(&self) -> usize {
        self.ledger.borrow().draw_calls
    }

    pub fn view(&self) -> ((f32, f32), (f32, f32)) {
        self.ledger.borrow().view.expect("no view set")
    }

    /// Live (not removed) primitives of one kind, in creation order.
    pub fn live(&self, kind: Primitive) -> Vec<PrimitiveState> {
        let ledger = self.ledger.borrow();
        let mut ids: Vec<&usize> = ledger
            .primitives
            .iter()
            .filter(|(_, s)| s.kind == kind && !s.removed)
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids.into_iter().map(|id| ledger.primitives[id].clone()).collect()
    }

    /// The single live primitive of one kind; panics if there are several.
    pub fn only(&self, kind: Primitive) -> PrimitiveState {
        let mut live = self.live(kind);
        assert_eq!(live.len(), 1, "expected exactly one live {kind:?}");
        live.pop().unwrap()
    }

    /// Texts of all live labels, in creation order.
    pub fn label_texts(&self) -> Vec<String> {
        self.live(Primitive::Label).into_iter().map(|s| s.text).collect()
    }
}

/// Create a renderer plus its probe.
pub fn recording_renderer() -> (RecordingRenderer, RenderProbe) {
    let ledger = Rc::new(RefCell::new(Ledger::default()));
    (
        RecordingRenderer { ledger: Rc::clone(&ledger) },
        RenderProbe { ledger },
    )
}

/// Records observer notifications for testing.
///
/// Each field records calls to the corresponding callback with their
/// arguments.
#[derive(Default, Clone)]
pub struct ObserverTracker {
    pub nodes_registered: Rc<RefCell<Vec<NodeId>>>,
    pub edges_registered: Rc<RefCell<Vec<EdgeId>>>,
    /// (node id or None) per notification
    pub node_selection: Rc<RefCell<Vec<Option<NodeId>>>>,
    /// (edge id or None) per notification
    pub edge_selection: Rc<RefCell<Vec<Option<EdgeId>>>>,
}

impl ObserverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all recorded notifications.
    pub fn clear(&self) {
        self.nodes_registered.borrow_mut().clear();
        self.edges_registered.borrow_mut().clear();
        self.node_selection.borrow_mut().clear();
        self.edge_selection.borrow_mut().clear();
    }
}

impl CanvasObserver for ObserverTracker {
    fn on_node_registered(&mut self, id: &NodeId) {
        self.nodes_registered.borrow_mut().push(id.clone());
    }

    fn on_edge_registered(&mut self, id: &EdgeId) {
        self.edges_registered.borrow_mut().push(id.clone());
    }

    fn on_node_selection_changed(&mut self, id: Option<&NodeId>) {
        self.node_selection.borrow_mut().push(id.cloned());
    }

    fn on_edge_selection_changed(&mut self, id: Option<&EdgeId>) {
        self.edge_selection.borrow_mut().push(id.cloned());
    }
}

/// A graph with `s` at (-50, 0) and `t` at (50, 0), no edges.
pub fn two_node_graph() -> FlowGraph {
    let mut graph = FlowGraph::new();
    graph.add_node("s".into(), (-50.0, 0.0), "s");
    graph.add_node("t".into(), (50.0, 0.0), "t");
    graph
}

/// `two_node_graph` plus the edge `(s, t)` with default attributes.
pub fn line_graph(config: &CanvasConfig) -> FlowGraph {
    let mut graph = two_node_graph();
    graph.add_edge("s".into(), "t".into(), EdgeAttributes::defaults(config));
    graph
}

/// A full-view general canvas over `two_node_graph`.
pub fn two_node_canvas() -> (CanvasController<RecordingRenderer>, RenderProbe) {
    let (renderer, probe) = recording_renderer();
    let config = CanvasConfig::new(GraphKind::General, false);
    (
        CanvasController::new(config, two_node_graph(), renderer),
        probe,
    )
}

/// A full-view general canvas over `line_graph`.
pub fn line_canvas() -> (CanvasController<RecordingRenderer>, RenderProbe) {
    let (renderer, probe) = recording_renderer();
    let config = CanvasConfig::new(GraphKind::General, false);
    let graph = line_graph(&config);
    (CanvasController::new(config, graph, renderer), probe)
}

/// `line_canvas` with an observer tracker attached.
pub fn tracked_line_canvas() -> (
    CanvasController<RecordingRenderer, ObserverTracker>,
    RenderProbe,
    ObserverTracker,
) {
    let (renderer, probe) = recording_renderer();
    let config = CanvasConfig::new(GraphKind::General, false);
    let graph = line_graph(&config);
    let tracker = ObserverTracker::new();
    (
        CanvasController::with_observer(config, graph, renderer, tracker.clone()),
        probe,
        tracker,
    )
}
