//! The interaction state machine.
//!
//! [`CanvasController`] owns the graph, the viewport, the focus and the
//! primitive bindings, and exposes one entry point per pointer event. Events
//! carry `Option` coordinates; an event with no coordinates never reaches
//! hit-testing, though a button release still ends its gesture so nothing
//! stays stuck when the pointer leaves the drawable area mid-drag.
//!
//! Every event that changes observable state ends with exactly one
//! [`Renderer::request_redraw`] call.

use crate::focus::Focus;
use crate::graph::{
    CanvasConfig, EdgeAttributes, EdgeId, FlowGraph, NodeId,
};
use crate::hit_test::{find_edge_at, find_node_at, NodeHit};
use crate::render::Renderer;
use crate::render_sync::{ChangeSet, RenderSync};
use crate::viewport::Viewport;

/// Base scroll zoom rate: one wheel notch out multiplies the visible area by
/// 1/0.9, one notch in by 0.9.
const ZOOM_BASE_RATE: f32 = 0.9;

/// Scroll wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    In,
    Out,
}

/// The drag gesture in progress, if any. At most one is active; starting a
/// new gesture while another runs is impossible because each gesture is
/// bound to the button that started it.
#[derive(Debug, Clone, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Primary button held on a node; release on another node draws an edge.
    Connect { from: NodeId },
    /// Secondary button held; pointer motion pans the view.
    Pan { anchor: (f32, f32) },
    /// Tertiary button held on a node; pointer motion moves it.
    MoveNode { node: NodeId },
}

/// Callbacks into the embedding application. All methods default to no-ops;
/// implement only what the application needs. `()` is the null observer.
pub trait CanvasObserver {
    /// A node was added to the graph (clicked into existence).
    fn on_node_registered(&mut self, _id: &NodeId) {}

    /// An edge was drawn between two nodes.
    fn on_edge_registered(&mut self, _id: &EdgeId) {}

    /// The focused node changed (possibly to none).
    fn on_node_selection_changed(&mut self, _id: Option<&NodeId>) {}

    /// The focused edge changed (possibly to none).
    fn on_edge_selection_changed(&mut self, _id: Option<&EdgeId>) {}
}

impl CanvasObserver for () {}

/// Owns all canvas state and routes pointer events through hit-testing,
/// graph mutation and incremental redraw.
pub struct CanvasController<R: Renderer, O: CanvasObserver = ()> {
    graph: FlowGraph,
    config: CanvasConfig,
    viewport: Viewport,
    focus: Focus,
    gesture: Gesture,
    render: RenderSync<R>,
    observer: O,
}

impl<R: Renderer> CanvasController<R, ()> {
    /// Controller without an observer.
    pub fn new(config: CanvasConfig, graph: FlowGraph, renderer: R) -> Self {
        Self::with_observer(config, graph, renderer, ())
    }
}

impl<R: Renderer, O: CanvasObserver> CanvasController<R, O> {
    /// Controller with an observer. The initial graph is drawn immediately.
    pub fn with_observer(config: CanvasConfig, graph: FlowGraph, renderer: R, observer: O) -> Self {
        let viewport = Viewport::new(config.stretch_factor());
        let mut render = RenderSync::new(renderer);
        render.rebuild(&graph, &config, &viewport, &Focus::None);
        Self {
            graph,
            config,
            viewport,
            focus: Focus::None,
            gesture: Gesture::Idle,
            render,
            observer,
        }
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The focused node, if any.
    pub fn focused_node(&self) -> Option<&NodeId> {
        self.focus.node()
    }

    /// The focused edge, if any.
    pub fn focused_edge(&self) -> Option<&EdgeId> {
        self.focus.edge()
    }

    // ------------------------------------------------------------------
    // Primary button: focus, node creation, edge drawing
    // ------------------------------------------------------------------

    /// Primary press: focus the edge under the pointer, or the node under
    /// the pointer (creating one on empty space), and arm the connect
    /// gesture from that node. Presses in the dead zone change nothing.
    pub fn primary_pressed(&mut self, position: Option<(f32, f32)>) {
        let position = match position {
            Some(position) => position,
            None => return,
        };

        let edge_hit = find_edge_at(&self.graph, position);
        let node_hit = find_node_at(&mut self.graph, position, edge_hit.is_some());

        match node_hit {
            Some(hit) => {
                let mut changes = ChangeSet::default();
                if hit.was_created() {
                    changes.nodes_added.push(hit.id().clone());
                    self.observer.on_node_registered(hit.id());
                }
                self.focus = Focus::Node(hit.id().clone());
                self.gesture = Gesture::Connect { from: hit.id().clone() };
                changes.nodes_recolored = true;
                changes.edges_recolored = true;
                self.observer.on_node_selection_changed(Some(hit.id()));
                self.observer.on_edge_selection_changed(None);
                self.commit(changes);
            }
            None => match edge_hit {
                Some(edge) => {
                    self.focus = Focus::Edge(edge.clone());
                    let mut changes = ChangeSet::default();
                    changes.nodes_recolored = true;
                    changes.edges_recolored = true;
                    self.observer.on_node_selection_changed(None);
                    self.observer.on_edge_selection_changed(Some(&edge));
                    self.commit(changes);
                }
                // Dead zone: no hit, no creation, no redraw.
                None => {}
            },
        }
    }

    /// Primary release: if the connect gesture ends on a different node, draw
    /// an edge from the armed node to it (skipped when that exact edge
    /// already exists). Releasing on empty space far from everything creates
    /// a node there, and a pending connect then targets the created node.
    /// The gesture always ends.
    pub fn primary_released(&mut self, position: Option<(f32, f32)>) {
        let from = match std::mem::take(&mut self.gesture) {
            Gesture::Connect { from } => Some(from),
            other => {
                self.gesture = other;
                None
            }
        };
        let position = match position {
            Some(position) => position,
            None => return,
        };

        let edge_hit = find_edge_at(&self.graph, position);
        let node_hit = find_node_at(&mut self.graph, position, edge_hit.is_some());

        let mut changes = ChangeSet::default();
        if let Some(hit) = node_hit {
            if hit.was_created() {
                changes.nodes_added.push(hit.id().clone());
                self.observer.on_node_registered(hit.id());
                self.focus = Focus::None;
            }
            let mut connected = false;
            if let Some(from) = from {
                let to = hit.id().clone();
                if from != to && !self.graph.has_edge(&from, &to) {
                    let attrs = EdgeAttributes::defaults(&self.config);
                    self.graph.add_edge(from.clone(), to.clone(), attrs);
                    let edge: EdgeId = (from, to);
                    self.focus = Focus::Edge(edge.clone());
                    changes.edges_added.push(edge.clone());
                    changes.edges_recolored = true;
                    self.observer.on_edge_registered(&edge);
                    self.observer.on_edge_selection_changed(Some(&edge));
                    connected = true;
                }
            }
            if hit.was_created() || connected {
                self.observer.on_node_selection_changed(None);
            }
        }

        changes.nodes_recolored = true;
        self.commit(changes);
    }

    // ------------------------------------------------------------------
    // Secondary button: panning
    // ------------------------------------------------------------------

    /// Secondary press anchors a pan gesture. No redraw.
    pub fn secondary_pressed(&mut self, position: Option<(f32, f32)>) {
        if let Some(anchor) = position {
            self.gesture = Gesture::Pan { anchor };
        }
    }

    /// Secondary release ends the pan gesture, with or without coordinates.
    pub fn secondary_released(&mut self, _position: Option<(f32, f32)>) {
        if matches!(self.gesture, Gesture::Pan { .. }) {
            self.gesture = Gesture::Idle;
        }
    }

    // ------------------------------------------------------------------
    // Tertiary button: node moving
    // ------------------------------------------------------------------

    /// Tertiary press on an existing node focuses it and starts a move
    /// gesture. Empty space never creates a node here.
    pub fn tertiary_pressed(&mut self, position: Option<(f32, f32)>) {
        let position = match position {
            Some(position) => position,
            None => return,
        };
        // Passing edge_was_hit suppresses synthesis regardless of distance.
        let hit = match find_node_at(&mut self.graph, position, true) {
            Some(NodeHit::Existing(id)) => id,
            _ => return,
        };

        self.focus = Focus::Node(hit.clone());
        self.gesture = Gesture::MoveNode { node: hit.clone() };
        let mut changes = ChangeSet::default();
        changes.nodes_recolored = true;
        changes.edges_recolored = true;
        self.observer.on_node_selection_changed(Some(&hit));
        self.observer.on_edge_selection_changed(None);
        self.commit(changes);
    }

    /// Tertiary release ends the move gesture, with or without coordinates,
    /// and gives the node colors a final refresh like a primary release.
    pub fn tertiary_released(&mut self, position: Option<(f32, f32)>) {
        if !matches!(self.gesture, Gesture::MoveNode { .. }) {
            return;
        }
        self.gesture = Gesture::Idle;
        if position.is_none() {
            return;
        }
        let mut changes = ChangeSet::default();
        changes.nodes_recolored = true;
        self.commit(changes);
    }

    // ------------------------------------------------------------------
    // Motion and scrolling
    // ------------------------------------------------------------------

    /// Pointer motion drives the active gesture: pan shifts the view against
    /// the pointer delta, move drags the focused node and its incident
    /// edges. Motion with no active gesture or no coordinates does nothing.
    pub fn pointer_moved(&mut self, position: Option<(f32, f32)>) {
        let position = match position {
            Some(position) => position,
            None => return,
        };

        match self.gesture.clone() {
            Gesture::Pan { anchor } => {
                // The scene follows the pointer, so the bounds move the
                // opposite way.
                let dx = position.0 - anchor.0;
                let dy = position.1 - anchor.1;
                self.viewport.pan(-dx, -dy);
                self.render.apply_pan(&self.viewport);
                self.render.renderer_mut().request_redraw();
            }
            Gesture::MoveNode { node } => {
                self.graph.move_node(&node, position);
                let mut changes = ChangeSet::default();
                changes.nodes_moved.push(node.clone());
                changes.nodes_recolored = true;
                changes.edges_moved = self.graph.edges_incident_to(&node);
                self.observer.on_node_selection_changed(Some(&node));
                self.commit(changes);
            }
            Gesture::Idle | Gesture::Connect { .. } => {}
        }
    }

    /// Wheel scroll zooms about the logical origin at the base rate.
    pub fn scrolled(&mut self, direction: ScrollDirection, position: Option<(f32, f32)>) {
        if position.is_none() {
            return;
        }
        let factor = match direction {
            ScrollDirection::In => 1.0 / ZOOM_BASE_RATE,
            ScrollDirection::Out => ZOOM_BASE_RATE,
        };
        self.viewport.zoom(factor);
        self.render.apply_zoom(&self.viewport, &self.focus);
        self.render.renderer_mut().request_redraw();
    }

    // ------------------------------------------------------------------
    // Programmatic editing
    // ------------------------------------------------------------------

    /// Remove a node and its incident edges. Focus is cleared if it pointed
    /// at the node or one of those edges. Returns whether the node existed.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let removed_edges = match self.graph.remove_node(id) {
            Some(edges) => edges,
            None => return false,
        };

        let mut changes = ChangeSet::default();
        if self.focus.is_node(id) || removed_edges.iter().any(|e| self.focus.is_edge(e)) {
            let was_node = self.focus.node().is_some();
            self.focus.clear();
            if was_node {
                self.observer.on_node_selection_changed(None);
            } else {
                self.observer.on_edge_selection_changed(None);
            }
            changes.nodes_recolored = true;
            changes.edges_recolored = true;
        }
        changes.edges_removed = removed_edges;
        changes.nodes_removed.push(id.to_string());
        self.commit(changes);
        true
    }

    /// Remove one edge. Focus is cleared if it pointed at the edge. Returns
    /// whether the edge existed.
    pub fn remove_edge(&mut self, id: &EdgeId) -> bool {
        if !self.graph.remove_edge(&id.0, &id.1) {
            return false;
        }

        let mut changes = ChangeSet::default();
        if self.focus.is_edge(id) {
            self.focus.clear();
            self.observer.on_edge_selection_changed(None);
            changes.nodes_recolored = true;
            changes.edges_recolored = true;
        }
        changes.edges_removed.push(id.clone());
        self.commit(changes);
        true
    }

    /// Rename a node's display label. Returns whether the node existed.
    pub fn set_node_label(&mut self, id: &str, label: impl Into<String>) -> bool {
        if !self.graph.set_node_label(id, label) {
            return false;
        }
        let mut changes = ChangeSet::default();
        changes.nodes_recolored = true;
        self.commit(changes);
        true
    }

    /// Edit an edge's attributes in place, then refresh its color and label.
    /// Returns whether the edge existed.
    pub fn update_edge_attributes(
        &mut self,
        id: &EdgeId,
        update: impl FnOnce(&mut EdgeAttributes),
    ) -> bool {
        match self.graph.edge_attributes_mut(&id.0, &id.1) {
            Some(attrs) => update(attrs),
            None => return false,
        }
        let mut changes = ChangeSet::default();
        changes.edges_recolored = true;
        self.commit(changes);
        true
    }

    /// Throw away all primitive bindings and redraw the whole graph.
    pub fn rebuild(&mut self) {
        self.render
            .rebuild(&self.graph, &self.config, &self.viewport, &self.focus);
        self.render.renderer_mut().request_redraw();
    }

    /// Apply a non-empty change set and request exactly one redraw.
    fn commit(&mut self, changes: ChangeSet) {
        if changes.is_empty() {
            return;
        }
        self.render.apply(
            &changes,
            &self.graph,
            &self.config,
            &self.viewport,
            &self.focus,
        );
        self.render.renderer_mut().request_redraw();
    }
}
