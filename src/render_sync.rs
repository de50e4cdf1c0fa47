//! Incremental synchronization between the graph and renderer primitives.
//!
//! [`RenderSync`] owns every primitive handle and a binding table from
//! element ids to the group holding them. The controller describes what an
//! event changed in a [`ChangeSet`]; [`apply`](RenderSync::apply) touches
//! only the bindings those changes name and leaves every other primitive
//! alone.
//!
//! Operating on an id with no binding is a programming error and panics;
//! event handling itself is infallible.

use std::collections::HashMap;
use std::hash::Hash;

use slint::SharedString;

use crate::focus::Focus;
use crate::geometry::edge_label_rotation;
use crate::graph::{CanvasConfig, EdgeId, FlowGraph, NodeId};
use crate::labels::edge_label_text;
use crate::render::{
    box_outline_width, edge_color, edge_line_width, node_color, EdgePrimitives, PrimitiveHandle,
    Renderer,
};
use crate::viewport::Viewport;

/// What one event changed, by element id. The controller fills this in and
/// [`RenderSync::apply`] consumes it; fields it leaves empty cost nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub nodes_added: Vec<NodeId>,
    pub nodes_removed: Vec<NodeId>,
    pub nodes_moved: Vec<NodeId>,
    /// Re-push colors to every node group (focus changes).
    pub nodes_recolored: bool,
    pub edges_added: Vec<EdgeId>,
    pub edges_removed: Vec<EdgeId>,
    /// Edges whose endpoints moved; their segments and labels follow.
    pub edges_moved: Vec<EdgeId>,
    /// Re-push colors and widths to every edge group (focus or attribute
    /// changes).
    pub edges_recolored: bool,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.nodes_added.is_empty()
            && self.nodes_removed.is_empty()
            && self.nodes_moved.is_empty()
            && !self.nodes_recolored
            && self.edges_added.is_empty()
            && self.edges_removed.is_empty()
            && self.edges_moved.is_empty()
            && !self.edges_recolored
    }

    fn touches_edges(&self) -> bool {
        !self.edges_added.is_empty()
            || !self.edges_removed.is_empty()
            || !self.edges_moved.is_empty()
            || self.edges_recolored
    }

    fn touches_nodes(&self) -> bool {
        !self.nodes_added.is_empty()
            || !self.nodes_removed.is_empty()
            || !self.nodes_moved.is_empty()
            || self.nodes_recolored
    }
}

/// Groups of bound elements stored in slots, with a reverse index from
/// element id to slot. Detaching an id never shifts other groups' slots.
struct GroupArena<K, G> {
    slots: Vec<Option<(Vec<K>, G)>>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone, G> GroupArena<K, G> {
    fn new() -> Self {
        Self { slots: Vec::new(), index: HashMap::new() }
    }

    /// Bind `keys` to a new group, reusing a vacant slot if one exists.
    fn insert(&mut self, keys: Vec<K>, group: G) -> usize {
        let slot = match self.slots.iter().position(Option::is_none) {
            Some(vacant) => vacant,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };
        for key in &keys {
            self.index.insert(key.clone(), slot);
        }
        self.slots[slot] = Some((keys, group));
        slot
    }

    fn slot_of(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn get(&self, slot: usize) -> Option<&(Vec<K>, G)> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Remove a whole group, unbinding its keys.
    fn take(&mut self, slot: usize) -> Option<(Vec<K>, G)> {
        let taken = self.slots.get_mut(slot)?.take()?;
        for key in &taken.0 {
            self.index.remove(key);
        }
        Some(taken)
    }

    /// Replace a group's payload in place, keeping keys and slot.
    fn replace_group(&mut self, slot: usize, group: G) -> Option<G> {
        match self.slots.get_mut(slot)?.as_mut() {
            Some(entry) => Some(std::mem::replace(&mut entry.1, group)),
            None => None,
        }
    }

    fn occupied(&self) -> impl Iterator<Item = (usize, &(Vec<K>, G))> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|e| (slot, e)))
    }

    #[cfg(test)]
    fn occupied_slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|_| slot))
            .collect()
    }

    fn drain(&mut self) -> Vec<G> {
        self.index.clear();
        self.slots
            .drain(..)
            .flatten()
            .map(|(_, group)| group)
            .collect()
    }

    #[cfg(test)]
    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    #[cfg(test)]
    fn group_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

/// A bound label primitive plus the text it currently shows, for diffing.
struct Label<H> {
    handle: H,
    text: SharedString,
}

/// Owns all primitive bindings and applies change descriptors to them.
pub struct RenderSync<R: Renderer> {
    renderer: R,
    node_groups: GroupArena<NodeId, R::Handle>,
    edge_groups: GroupArena<EdgeId, EdgePrimitives<R::Handle>>,
    node_labels: HashMap<NodeId, Label<R::Handle>>,
    edge_labels: HashMap<EdgeId, Label<R::Handle>>,
}

impl<R: Renderer> RenderSync<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            node_groups: GroupArena::new(),
            edge_groups: GroupArena::new(),
            node_labels: HashMap::new(),
            edge_labels: HashMap::new(),
        }
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Drop every binding and redraw the whole graph from scratch: one group
    /// of all nodes, one group of all edges, one label per element.
    pub fn rebuild(
        &mut self,
        graph: &FlowGraph,
        config: &CanvasConfig,
        viewport: &Viewport,
        focus: &Focus,
    ) {
        for handle in self.node_groups.drain() {
            handle.remove();
        }
        for primitives in self.edge_groups.drain() {
            remove_edge_primitives(primitives);
        }
        for (_, label) in self.node_labels.drain() {
            label.handle.remove();
        }
        for (_, label) in self.edge_labels.drain() {
            label.handle.remove();
        }

        if graph.node_count() > 0 {
            let ids: Vec<NodeId> = graph.nodes().iter().map(|n| n.id.clone()).collect();
            self.draw_node_group(ids, graph, viewport, focus);
        }
        if graph.edge_count() > 0 {
            let ids: Vec<EdgeId> = graph.edges().iter().map(|e| e.id()).collect();
            self.draw_edge_group(ids, graph, config, viewport, focus);
        }
        for node in graph.nodes() {
            self.draw_node_label(node.id.clone(), graph, viewport);
        }
        for edge in graph.edges() {
            self.draw_edge_label(edge.id(), graph, config, viewport);
        }

        self.renderer.set_view(viewport.x_bounds(), viewport.y_bounds());
    }

    /// Apply one change descriptor. Removals run before additions so a slot
    /// freed by a removal can be reused in the same application.
    pub fn apply(
        &mut self,
        changes: &ChangeSet,
        graph: &FlowGraph,
        config: &CanvasConfig,
        viewport: &Viewport,
        focus: &Focus,
    ) {
        for id in &changes.edges_removed {
            self.unbind_edge(id, graph, config, viewport, focus);
        }
        for id in &changes.nodes_removed {
            self.unbind_node(id, graph, viewport, focus);
        }

        if !changes.nodes_added.is_empty() {
            self.draw_node_group(changes.nodes_added.clone(), graph, viewport, focus);
            for id in &changes.nodes_added {
                self.draw_node_label(id.clone(), graph, viewport);
            }
        }
        if !changes.edges_added.is_empty() {
            self.draw_edge_group(changes.edges_added.clone(), graph, config, viewport, focus);
            for id in &changes.edges_added {
                self.draw_edge_label(id.clone(), graph, config, viewport);
            }
        }

        self.move_nodes(&changes.nodes_moved, graph, viewport, focus);
        self.move_edges(&changes.edges_moved, graph);

        if changes.nodes_recolored {
            self.recolor_nodes(focus);
        }
        if changes.edges_recolored {
            self.recolor_edges(graph, config, viewport, focus);
        }

        if changes.touches_nodes() {
            self.refresh_node_labels(&changes.nodes_moved, graph);
        }
        if changes.touches_edges() || !changes.nodes_moved.is_empty() {
            self.refresh_edge_labels(&changes.edges_moved, graph, config, viewport);
        }
    }

    /// Push the zoom-scaled edge widths and font sizes to every binding and
    /// update the visible rectangle.
    pub fn apply_zoom(&mut self, viewport: &Viewport, focus: &Focus) {
        for (_, (ids, primitives)) in self.edge_groups.occupied() {
            let widths: Vec<f32> = ids
                .iter()
                .map(|id| edge_line_width(viewport.edge_width(), focus.is_edge(id)))
                .collect();
            primitives.lines.set_line_widths(&widths);
        }
        for label in self.node_labels.values() {
            label.handle.set_font_size(viewport.node_label_size());
        }
        for label in self.edge_labels.values() {
            label.handle.set_font_size(viewport.edge_label_size());
        }
        self.renderer.set_view(viewport.x_bounds(), viewport.y_bounds());
    }

    /// Update the visible rectangle without touching any binding.
    pub fn apply_pan(&mut self, viewport: &Viewport) {
        self.renderer.set_view(viewport.x_bounds(), viewport.y_bounds());
    }

    // ------------------------------------------------------------------
    // Group construction
    // ------------------------------------------------------------------

    fn draw_node_group(
        &mut self,
        ids: Vec<NodeId>,
        graph: &FlowGraph,
        viewport: &Viewport,
        focus: &Focus,
    ) {
        let positions: Vec<(f32, f32)> = ids
            .iter()
            .map(|id| self.node_position(graph, id))
            .collect();
        let colors: Vec<_> = ids.iter().map(|id| node_color(focus, id)).collect();
        let handle = self
            .renderer
            .draw_nodes(&positions, &colors, viewport.node_size());
        self.node_groups.insert(ids, handle);
    }

    fn draw_edge_group(
        &mut self,
        ids: Vec<EdgeId>,
        graph: &FlowGraph,
        config: &CanvasConfig,
        viewport: &Viewport,
        focus: &Focus,
    ) {
        let segments: Vec<_> = ids.iter().map(|id| self.edge_segment(graph, id)).collect();
        let colors: Vec<_> = ids
            .iter()
            .map(|id| edge_color(config, focus, id, self.edge_attrs(graph, id)))
            .collect();
        let widths: Vec<f32> = ids
            .iter()
            .map(|id| edge_line_width(viewport.edge_width(), focus.is_edge(id)))
            .collect();
        let primitives =
            self.renderer
                .draw_edges(&segments, &colors, &widths, config.show_arrows());
        self.edge_groups.insert(ids, primitives);
    }

    fn draw_node_label(&mut self, id: NodeId, graph: &FlowGraph, viewport: &Viewport) {
        let node = match graph.node(&id) {
            Some(node) => node,
            None => panic!("no node {id} to label"),
        };
        let text: SharedString = node.label.as_str().into();
        let handle =
            self.renderer
                .draw_label(node.position, &text, viewport.node_label_size(), 0.0);
        self.node_labels.insert(id, Label { handle, text });
    }

    fn draw_edge_label(
        &mut self,
        id: EdgeId,
        graph: &FlowGraph,
        config: &CanvasConfig,
        viewport: &Viewport,
    ) {
        let text = edge_label_text(config, self.edge_attrs(graph, &id));
        let (start, end) = self.edge_segment(graph, &id);
        let position = midpoint(start, end);
        let rotation =
            edge_label_rotation(viewport.x_bounds(), viewport.y_bounds(), start, end);
        let handle =
            self.renderer
                .draw_label(position, &text, viewport.edge_label_size(), rotation);
        self.edge_labels.insert(id, Label { handle, text });
    }

    // ------------------------------------------------------------------
    // Removal: detach the id, redraw the remainder of its group
    // ------------------------------------------------------------------

    fn unbind_node(
        &mut self,
        id: &NodeId,
        graph: &FlowGraph,
        viewport: &Viewport,
        focus: &Focus,
    ) {
        let slot = match self.node_groups.slot_of(id) {
            Some(slot) => slot,
            None => panic!("no primitive bound to node {id}"),
        };
        let (ids, handle) = self.node_groups.take(slot).unwrap_or_else(|| {
            panic!("no primitive bound to node {id}")
        });
        handle.remove();
        let remainder: Vec<NodeId> = ids.into_iter().filter(|n| n != id).collect();
        if !remainder.is_empty() {
            self.draw_node_group(remainder, graph, viewport, focus);
        }
        if let Some(label) = self.node_labels.remove(id) {
            label.handle.remove();
        }
    }

    fn unbind_edge(
        &mut self,
        id: &EdgeId,
        graph: &FlowGraph,
        config: &CanvasConfig,
        viewport: &Viewport,
        focus: &Focus,
    ) {
        let slot = match self.edge_groups.slot_of(id) {
            Some(slot) => slot,
            None => panic!("no primitive bound to edge ({}, {})", id.0, id.1),
        };
        let (ids, primitives) = self.edge_groups.take(slot).unwrap_or_else(|| {
            panic!("no primitive bound to edge ({}, {})", id.0, id.1)
        });
        remove_edge_primitives(primitives);
        let remainder: Vec<EdgeId> = ids.into_iter().filter(|e| e != id).collect();
        if !remainder.is_empty() {
            self.draw_edge_group(remainder, graph, config, viewport, focus);
        }
        if let Some(label) = self.edge_labels.remove(id) {
            label.handle.remove();
        }
    }

    // ------------------------------------------------------------------
    // Moves
    // ------------------------------------------------------------------

    /// A moved node's marker group is redrawn in place with the same member
    /// set; groups without a moved node are untouched.
    fn move_nodes(
        &mut self,
        moved: &[NodeId],
        graph: &FlowGraph,
        viewport: &Viewport,
        focus: &Focus,
    ) {
        let mut slots: Vec<usize> = Vec::new();
        for id in moved {
            let slot = match self.node_groups.slot_of(id) {
                Some(slot) => slot,
                None => panic!("no primitive bound to node {id}"),
            };
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        for slot in slots {
            let (ids, _) = self.node_groups.get(slot).unwrap();
            let ids = ids.clone();
            let positions: Vec<(f32, f32)> = ids
                .iter()
                .map(|id| self.node_position(graph, id))
                .collect();
            let colors: Vec<_> = ids.iter().map(|id| node_color(focus, id)).collect();
            let handle = self
                .renderer
                .draw_nodes(&positions, &colors, viewport.node_size());
            if let Some(old) = self.node_groups.replace_group(slot, handle) {
                old.remove();
            }
        }
    }

    /// Edge groups containing a moved edge get their full segment array
    /// pushed again; box and arrow decorations follow the same segments.
    fn move_edges(&mut self, moved: &[EdgeId], graph: &FlowGraph) {
        let mut slots: Vec<usize> = Vec::new();
        for id in moved {
            let slot = match self.edge_groups.slot_of(id) {
                Some(slot) => slot,
                None => panic!("no primitive bound to edge ({}, {})", id.0, id.1),
            };
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        for slot in slots {
            let (ids, primitives) = self.edge_groups.get(slot).unwrap();
            let segments: Vec<_> = ids.iter().map(|id| self.edge_segment(graph, id)).collect();
            primitives.lines.set_segments(&segments);
            primitives.boxes.set_segments(&segments);
            if let Some(arrows) = &primitives.arrows {
                arrows.set_segments(&segments);
            }
        }
    }

    // ------------------------------------------------------------------
    // Recoloring
    // ------------------------------------------------------------------

    fn recolor_nodes(&mut self, focus: &Focus) {
        for (_, (ids, handle)) in self.node_groups.occupied() {
            let colors: Vec<_> = ids.iter().map(|id| node_color(focus, id)).collect();
            handle.set_colors(&colors);
        }
    }

    fn recolor_edges(
        &mut self,
        graph: &FlowGraph,
        config: &CanvasConfig,
        viewport: &Viewport,
        focus: &Focus,
    ) {
        for (_, (ids, primitives)) in self.edge_groups.occupied() {
            let colors: Vec<_> = ids
                .iter()
                .map(|id| edge_color(config, focus, id, self.edge_attrs(graph, id)))
                .collect();
            let widths: Vec<f32> = ids
                .iter()
                .map(|id| edge_line_width(viewport.edge_width(), focus.is_edge(id)))
                .collect();
            let outlines: Vec<f32> = ids
                .iter()
                .map(|id| box_outline_width(focus.is_edge(id)))
                .collect();
            primitives.lines.set_colors(&colors);
            primitives.lines.set_line_widths(&widths);
            primitives.boxes.set_colors(&colors);
            primitives.boxes.set_line_widths(&outlines);
            if let Some(arrows) = &primitives.arrows {
                arrows.set_colors(&colors);
            }
        }
    }

    // ------------------------------------------------------------------
    // Label refresh
    // ------------------------------------------------------------------

    fn refresh_node_labels(&mut self, moved: &[NodeId], graph: &FlowGraph) {
        for node in graph.nodes() {
            let label = match self.node_labels.get_mut(&node.id) {
                Some(label) => label,
                None => panic!("no label bound to node {}", node.id),
            };
            if label.text != node.label.as_str() {
                label.text = node.label.as_str().into();
                label.handle.set_text(&label.text);
            }
            if moved.contains(&node.id) {
                label.handle.set_position(node.position);
            }
        }
    }

    /// Text is diffed for every bound edge; position and rotation are only
    /// recomputed for edges whose endpoints moved.
    fn refresh_edge_labels(
        &mut self,
        moved: &[EdgeId],
        graph: &FlowGraph,
        config: &CanvasConfig,
        viewport: &Viewport,
    ) {
        for edge in graph.edges() {
            let id = edge.id();
            let label = match self.edge_labels.get_mut(&id) {
                Some(label) => label,
                None => panic!("no label bound to edge ({}, {})", id.0, id.1),
            };
            let text = edge_label_text(config, &edge.attributes);
            if label.text != text {
                label.text = text;
                label.handle.set_text(&label.text);
            }
            if moved.contains(&id) {
                let start = graph.node_position(&edge.tail);
                let end = graph.node_position(&edge.head);
                if let (Some(start), Some(end)) = (start, end) {
                    label.handle.set_position(midpoint(start, end));
                    label.handle.set_rotation(edge_label_rotation(
                        viewport.x_bounds(),
                        viewport.y_bounds(),
                        start,
                        end,
                    ));
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Graph lookups that are invariants here, not fallible paths
    // ------------------------------------------------------------------

    fn node_position(&self, graph: &FlowGraph, id: &str) -> (f32, f32) {
        match graph.node_position(id) {
            Some(position) => position,
            None => panic!("binding references unknown node {id}"),
        }
    }

    fn edge_segment(&self, graph: &FlowGraph, id: &EdgeId) -> ((f32, f32), (f32, f32)) {
        (
            self.node_position(graph, &id.0),
            self.node_position(graph, &id.1),
        )
    }

    fn edge_attrs<'g>(&self, graph: &'g FlowGraph, id: &EdgeId) -> &'g crate::graph::EdgeAttributes {
        match graph.edge_attributes(&id.0, &id.1) {
            Some(attrs) => attrs,
            None => panic!("binding references unknown edge ({}, {})", id.0, id.1),
        }
    }
}

fn remove_edge_primitives<H: PrimitiveHandle>(primitives: EdgePrimitives<H>) {
    primitives.lines.remove();
    primitives.boxes.remove();
    if let Some(arrows) = primitives.arrows {
        arrows.remove();
    }
}

fn midpoint(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}
