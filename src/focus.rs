//! The single focused element, if any.

use crate::graph::{EdgeId, NodeId};

/// At most one element is focused at a time; a node and an edge can never be
/// focused together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    None,
    Node(NodeId),
    Edge(EdgeId),
}

impl Focus {
    /// The focused node id, if a node is focused.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            Self::Node(id) => Some(id),
            _ => None,
        }
    }

    /// The focused edge id, if an edge is focused.
    pub fn edge(&self) -> Option<&EdgeId> {
        match self {
            Self::Edge(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_node(&self, id: &str) -> bool {
        matches!(self, Self::Node(n) if n == id)
    }

    pub fn is_edge(&self, id: &EdgeId) -> bool {
        matches!(self, Self::Edge(e) if e == id)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn clear(&mut self) {
        *self = Self::None;
    }
}
