//! The mutable node/edge graph and the canvas configuration.
//!
//! [`FlowGraph`] owns all nodes and edges; everything else refers to
//! elements by id. Nodes and edges are stored in insertion order and all
//! iteration happens in that order. Hit-testing tie-breaks rely on this
//! order being stable.

use std::fmt;

/// Opaque node identifier. Minted ids are stringified counter values, but
/// callers may insert nodes under any unique string (e.g. `"s"`, `"t"`).
pub type NodeId = String;

/// Edge identity: the ordered `(tail, head)` pair. At most one edge exists
/// per ordered pair; the reversed pair is a distinct edge.
pub type EdgeId = (NodeId, NodeId);

/// The two supported flow-network flavors. They differ in which edge
/// attributes exist and which are shown in labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    /// Capacity/transit-time networks.
    General,
    /// Networks with spillback semantics (storage and inflow bounds).
    Spillback,
}

/// Displayable edge attributes, used to select label contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeAttribute {
    InCapacity,
    OutCapacity,
    TransitTime,
    Storage,
    /// Lives in the mode-flag group; only available on restricted-view
    /// spillback canvases.
    InflowBound,
}

impl fmt::Display for EdgeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InCapacity => "in-capacity",
            Self::OutCapacity => "out-capacity",
            Self::TransitTime => "transit-time",
            Self::Storage => "storage",
            Self::InflowBound => "inflow-bound",
        };
        f.write_str(name)
    }
}

/// Configuration errors raised once at construction. Fatal to canvas
/// setup; never raised per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested label attribute does not exist for this graph kind and
    /// restricted-view combination.
    AttributeUnavailable {
        attribute: EdgeAttribute,
        kind: GraphKind,
        restricted_view: bool,
    },
    /// An empty label attribute selection was requested.
    NoLabelAttributes,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeUnavailable { attribute, kind, restricted_view } => write!(
                f,
                "attribute {} is not available on a {:?} canvas (restricted view: {})",
                attribute, kind, restricted_view
            ),
            Self::NoLabelAttributes => write!(f, "edge labels need at least one attribute"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable per-canvas settings, fixed for the lifetime of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    kind: GraphKind,
    restricted_view: bool,
    show_arrows: bool,
    stretch_factor: f32,
    label_attributes: Vec<EdgeAttribute>,
}

impl CanvasConfig {
    /// Create a configuration with the default label attribute selection for
    /// the given kind and restricted-view flag.
    pub fn new(kind: GraphKind, restricted_view: bool) -> Self {
        Self {
            kind,
            restricted_view,
            show_arrows: true,
            stretch_factor: crate::viewport::DEFAULT_STRETCH_FACTOR,
            label_attributes: Self::default_label_attributes(kind, restricted_view),
        }
    }

    fn default_label_attributes(kind: GraphKind, restricted_view: bool) -> Vec<EdgeAttribute> {
        use EdgeAttribute::*;
        match (kind, restricted_view) {
            (GraphKind::General, false) => vec![OutCapacity, TransitTime],
            (GraphKind::General, true) => vec![OutCapacity],
            (GraphKind::Spillback, false) => vec![InCapacity, OutCapacity, Storage, TransitTime],
            (GraphKind::Spillback, true) => vec![OutCapacity, InflowBound],
        }
    }

    /// Disable or enable arrow-head decorations on edges.
    pub fn with_show_arrows(mut self, show_arrows: bool) -> Self {
        self.show_arrows = show_arrows;
        self
    }

    /// Override the horizontal stretch of the initial viewport.
    pub fn with_stretch_factor(mut self, stretch_factor: f32) -> Self {
        self.stretch_factor = stretch_factor;
        self
    }

    /// Replace the label attribute selection.
    ///
    /// Fails if an attribute is not representable on this kind/view
    /// combination, e.g. [`EdgeAttribute::InflowBound`] outside a
    /// restricted-view spillback canvas.
    pub fn with_label_attributes(
        mut self,
        attributes: Vec<EdgeAttribute>,
    ) -> Result<Self, ConfigError> {
        if attributes.is_empty() {
            return Err(ConfigError::NoLabelAttributes);
        }
        for attribute in &attributes {
            if !self.attribute_available(*attribute) {
                return Err(ConfigError::AttributeUnavailable {
                    attribute: *attribute,
                    kind: self.kind,
                    restricted_view: self.restricted_view,
                });
            }
        }
        self.label_attributes = attributes;
        Ok(self)
    }

    fn attribute_available(&self, attribute: EdgeAttribute) -> bool {
        match attribute {
            EdgeAttribute::InflowBound => {
                self.kind == GraphKind::Spillback && self.restricted_view
            }
            _ => true,
        }
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn restricted_view(&self) -> bool {
        self.restricted_view
    }

    pub fn show_arrows(&self) -> bool {
        self.show_arrows
    }

    pub fn stretch_factor(&self) -> f32 {
        self.stretch_factor
    }

    /// Attributes shown in edge labels, in display order.
    pub fn label_attributes(&self) -> &[EdgeAttribute] {
        &self.label_attributes
    }
}

/// Mode-flag group carried by edges on restricted-view canvases.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowControl {
    pub resetting_enabled: bool,
    pub active: bool,
    /// Present on spillback canvases only.
    pub inflow_bound: Option<f32>,
}

/// Numeric edge attributes. Capacities and storage may be infinite.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeAttributes {
    pub transit_time: f32,
    pub in_capacity: f32,
    pub out_capacity: f32,
    pub storage: f32,
    /// `Some` iff the canvas is in restricted view.
    pub flow_control: Option<FlowControl>,
}

impl EdgeAttributes {
    /// Defaults for a newly drawn edge: transit time 1, out-capacity 1,
    /// in-capacity ∞, storage ∞. In restricted view the mode flags start as
    /// resetting disabled and active; on spillback canvases the inflow bound
    /// starts at 1.
    pub fn defaults(config: &CanvasConfig) -> Self {
        let flow_control = config.restricted_view().then(|| FlowControl {
            resetting_enabled: false,
            active: true,
            inflow_bound: (config.kind() == GraphKind::Spillback).then_some(1.0),
        });
        Self {
            transit_time: 1.0,
            in_capacity: f32::INFINITY,
            out_capacity: 1.0,
            storage: f32::INFINITY,
            flow_control,
        }
    }
}

/// A graph node: opaque id, logical position and a display label that is
/// independent of the id.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: (f32, f32),
    pub label: String,
}

/// A directed edge between two existing nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub tail: NodeId,
    pub head: NodeId,
    pub attributes: EdgeAttributes,
}

impl Edge {
    pub fn id(&self) -> EdgeId {
        (self.tail.clone(), self.head.clone())
    }
}

/// The mutable graph store with a monotonically increasing id counter.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    last_id: u64,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh node id from the counter. Each call returns a previously
    /// unused id.
    pub fn mint_id(&mut self) -> NodeId {
        let id = self.last_id.to_string();
        self.last_id += 1;
        id
    }

    /// Current value of the id counter.
    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Insert a node. The id must be unique within the graph.
    pub fn add_node(&mut self, id: NodeId, position: (f32, f32), label: impl Into<String>) {
        debug_assert!(!self.contains_node(&id), "duplicate node id {id}");
        log::debug!("adding node {id} at {position:?}");
        self.nodes.push(Node { id, position, label: label.into() });
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn node_position(&self, id: &str) -> Option<(f32, f32)> {
        self.node(id).map(|n| n.position)
    }

    /// Write a new position into a node. Returns false if the node does not
    /// exist.
    pub fn move_node(&mut self, id: &str, position: (f32, f32)) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Update a node's display label. Returns false if the node does not
    /// exist.
    pub fn set_node_label(&mut self, id: &str, label: impl Into<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.label = label.into();
                true
            }
            None => false,
        }
    }

    /// Insert an edge from `tail` to `head`. Adding an edge that already
    /// exists in that exact direction is a silent no-op; the reverse
    /// direction is a distinct edge and is permitted. Returns whether the
    /// edge was inserted.
    pub fn add_edge(&mut self, tail: NodeId, head: NodeId, attributes: EdgeAttributes) -> bool {
        debug_assert!(self.contains_node(&tail) && self.contains_node(&head));
        debug_assert!(tail != head, "self-loops are not supported");
        if self.has_edge(&tail, &head) {
            log::debug!("edge ({tail}, {head}) already exists, skipping");
            return false;
        }
        log::debug!("adding edge ({tail}, {head})");
        self.edges.push(Edge { tail, head, attributes });
        true
    }

    pub fn has_edge(&self, tail: &str, head: &str) -> bool {
        self.edges.iter().any(|e| e.tail == tail && e.head == head)
    }

    pub fn edge_attributes(&self, tail: &str, head: &str) -> Option<&EdgeAttributes> {
        self.edges
            .iter()
            .find(|e| e.tail == tail && e.head == head)
            .map(|e| &e.attributes)
    }

    pub fn edge_attributes_mut(&mut self, tail: &str, head: &str) -> Option<&mut EdgeAttributes> {
        self.edges
            .iter_mut()
            .find(|e| e.tail == tail && e.head == head)
            .map(|e| &mut e.attributes)
    }

    /// Remove the edge `(tail, head)`. Returns whether it existed.
    pub fn remove_edge(&mut self, tail: &str, head: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| !(e.tail == tail && e.head == head));
        let removed = self.edges.len() < before;
        if removed {
            log::debug!("removed edge ({tail}, {head})");
        }
        removed
    }

    /// Remove a node and every edge incident to it. Returns the ids of the
    /// removed edges, or `None` if the node does not exist.
    pub fn remove_node(&mut self, id: &str) -> Option<Vec<EdgeId>> {
        if !self.contains_node(id) {
            return None;
        }
        let incident = self.edges_incident_to(id);
        self.edges.retain(|e| e.tail != id && e.head != id);
        self.nodes.retain(|n| n.id != id);
        log::debug!("removed node {id} and {} incident edge(s)", incident.len());
        Some(incident)
    }

    /// Ids of every edge with `id` as tail or head, in insertion order.
    pub fn edges_incident_to(&self, id: &str) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|e| e.tail == id || e.head == id)
            .map(Edge::id)
            .collect()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
