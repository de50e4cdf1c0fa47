//! The renderer seam and the element color policy.
//!
//! The canvas never draws pixels itself. A [`Renderer`] implementation turns
//! draw calls into backend primitives and hands back [`PrimitiveHandle`]s;
//! the canvas later mutates or removes primitives through those handles
//! only. Handle methods a backend's primitive kind cannot honor (rotation on
//! a marker group, say) are free to be no-ops.

use slint::{Color, SharedString};

use crate::focus::Focus;
use crate::graph::{CanvasConfig, EdgeAttributes, EdgeId};

/// A primitive created by a [`Renderer`]. Mutations take effect on the next
/// redraw request.
pub trait PrimitiveHandle {
    /// Detach the primitive from the scene, consuming the handle.
    fn remove(self);

    /// Per-element colors for a group primitive (one entry per element).
    fn set_colors(&self, colors: &[Color]);

    /// Per-element line segments for an edge group, `(start, end)` pairs in
    /// logical coordinates.
    fn set_segments(&self, segments: &[((f32, f32), (f32, f32))]);

    /// Per-element line widths for an edge group.
    fn set_line_widths(&self, widths: &[f32]);

    /// Anchor position of a label primitive.
    fn set_position(&self, position: (f32, f32));

    /// Text of a label primitive.
    fn set_text(&self, text: &SharedString);

    /// Font size of a label primitive.
    fn set_font_size(&self, size: f32);

    /// Rotation of a label primitive, degrees counter-clockwise.
    fn set_rotation(&self, degrees: f32);
}

/// The line, box and optional arrow-head primitives backing one edge group.
pub struct EdgePrimitives<H: PrimitiveHandle> {
    pub lines: H,
    pub boxes: H,
    /// `None` when arrows are disabled in the canvas configuration.
    pub arrows: Option<H>,
}

/// Backend drawing interface. One call per element *group*; labels are drawn
/// one handle per element.
pub trait Renderer {
    type Handle: PrimitiveHandle;

    /// Draw a group of node markers. `size` is the marker area.
    fn draw_nodes(
        &mut self,
        positions: &[(f32, f32)],
        colors: &[Color],
        size: f32,
    ) -> Self::Handle;

    /// Draw a group of edges as lines plus their box decorations and, when
    /// `arrows_enabled`, arrow heads derived from the segments.
    fn draw_edges(
        &mut self,
        segments: &[((f32, f32), (f32, f32))],
        colors: &[Color],
        widths: &[f32],
        arrows_enabled: bool,
    ) -> EdgePrimitives<Self::Handle>;

    /// Draw a single text label.
    fn draw_label(
        &mut self,
        position: (f32, f32),
        text: &SharedString,
        size: f32,
        rotation: f32,
    ) -> Self::Handle;

    /// Update the visible logical rectangle.
    fn set_view(&mut self, x_bounds: (f32, f32), y_bounds: (f32, f32));

    /// Schedule one repaint reflecting all mutations since the last request.
    fn request_redraw(&mut self);
}

// ============================================================================
// Color policy
// ============================================================================

pub(crate) fn focused_color() -> Color {
    Color::from_rgb_u8(0, 0, 255)
}

fn node_default_color() -> Color {
    Color::from_rgb_u8(255, 0, 0)
}

fn edge_default_color() -> Color {
    Color::from_rgb_u8(0, 0, 0)
}

fn edge_inactive_color() -> Color {
    Color::from_rgb_u8(128, 128, 128)
}

fn edge_resetting_color() -> Color {
    Color::from_rgb_u8(255, 0, 0)
}

/// Color for one node: blue when focused, red otherwise.
pub fn node_color(focus: &Focus, id: &str) -> Color {
    if focus.is_node(id) {
        focused_color()
    } else {
        node_default_color()
    }
}

/// Color for one edge. Focus wins; in restricted view inactive edges render
/// gray and resetting-enabled edges red; everything else is black.
pub fn edge_color(
    config: &CanvasConfig,
    focus: &Focus,
    id: &EdgeId,
    attrs: &EdgeAttributes,
) -> Color {
    if focus.is_edge(id) {
        return focused_color();
    }
    if config.restricted_view() {
        if let Some(fc) = &attrs.flow_control {
            if !fc.active {
                return edge_inactive_color();
            }
            if fc.resetting_enabled {
                return edge_resetting_color();
            }
        }
    }
    edge_default_color()
}

/// Line width for one edge: the focused edge renders one unit wider.
pub fn edge_line_width(base: f32, focused: bool) -> f32 {
    if focused {
        base + 1.0
    } else {
        base
    }
}

/// Outline width of an edge's box decoration.
pub fn box_outline_width(focused: bool) -> f32 {
    if focused {
        2.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FlowControl, GraphKind};

    fn restricted_attrs(active: bool, resetting: bool) -> EdgeAttributes {
        EdgeAttributes {
            transit_time: 1.0,
            in_capacity: f32::INFINITY,
            out_capacity: 1.0,
            storage: f32::INFINITY,
            flow_control: Some(FlowControl {
                resetting_enabled: resetting,
                active,
                inflow_bound: None,
            }),
        }
    }

    // ========================================================================
    // Node colors
    // ========================================================================

    #[test]
    fn test_focused_node_is_blue() {
        let focus = Focus::Node("a".into());
        assert_eq!(node_color(&focus, "a"), Color::from_rgb_u8(0, 0, 255));
        assert_eq!(node_color(&focus, "b"), Color::from_rgb_u8(255, 0, 0));
    }

    // ========================================================================
    // Edge colors
    // ========================================================================

    #[test]
    fn test_focused_edge_is_blue_even_when_inactive() {
        let config = CanvasConfig::new(GraphKind::General, true);
        let id: EdgeId = ("a".into(), "b".into());
        let focus = Focus::Edge(id.clone());
        let attrs = restricted_attrs(false, false);

        assert_eq!(
            edge_color(&config, &focus, &id, &attrs),
            Color::from_rgb_u8(0, 0, 255)
        );
    }

    #[test]
    fn test_inactive_edge_is_gray_in_restricted_view() {
        let config = CanvasConfig::new(GraphKind::General, true);
        let id: EdgeId = ("a".into(), "b".into());

        assert_eq!(
            edge_color(&config, &Focus::None, &id, &restricted_attrs(false, true)),
            Color::from_rgb_u8(128, 128, 128)
        );
    }

    #[test]
    fn test_resetting_edge_is_red_in_restricted_view() {
        let config = CanvasConfig::new(GraphKind::General, true);
        let id: EdgeId = ("a".into(), "b".into());

        assert_eq!(
            edge_color(&config, &Focus::None, &id, &restricted_attrs(true, true)),
            Color::from_rgb_u8(255, 0, 0)
        );
    }

    #[test]
    fn test_plain_edge_is_black() {
        let config = CanvasConfig::new(GraphKind::General, false);
        let id: EdgeId = ("a".into(), "b".into());
        let attrs = EdgeAttributes::defaults(&config);

        assert_eq!(
            edge_color(&config, &Focus::None, &id, &attrs),
            Color::from_rgb_u8(0, 0, 0)
        );
    }

    // ========================================================================
    // Emphasis widths
    // ========================================================================

    #[test]
    fn test_focused_edge_is_one_unit_wider() {
        assert_eq!(edge_line_width(4.0, false), 4.0);
        assert_eq!(edge_line_width(4.0, true), 5.0);
        assert_eq!(box_outline_width(false), 1.0);
        assert_eq!(box_outline_width(true), 2.0);
    }
}
