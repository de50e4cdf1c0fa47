//! Viewport state: the visible logical rectangle and the zoom-scaled sizes
//! of edges and labels.
//!
//! Pan translates the bounds; zoom scales the bounds about the logical
//! origin and counter-scales the line width and font sizes so elements
//! shrink when more area becomes visible and grow when less does.

/// Default horizontal stretch of the visible rectangle (wider than tall).
pub const DEFAULT_STRETCH_FACTOR: f32 = 1.57;

/// Half-extent of the initially visible square, in logical units.
const HALF_EXTENT: f32 = 120.0;

const DEFAULT_EDGE_WIDTH: f32 = 4.0;
const DEFAULT_NODE_LABEL_SIZE: f32 = 9.0;
const DEFAULT_EDGE_LABEL_SIZE: f32 = 7.0;

/// Marker area used when drawing node primitives. Not affected by zoom.
const NODE_SIZE: f32 = 24.0 * 24.0;

/// The visible logical rectangle plus the current per-unit scaling used for
/// line widths and font sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    x_bounds: (f32, f32),
    y_bounds: (f32, f32),
    edge_width: f32,
    node_label_size: f32,
    edge_label_size: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_STRETCH_FACTOR)
    }
}

impl Viewport {
    /// Create a viewport showing `[-stretch_factor * 120, stretch_factor * 120]`
    /// horizontally and `[-120, 120]` vertically.
    pub fn new(stretch_factor: f32) -> Self {
        Self {
            x_bounds: (stretch_factor * -HALF_EXTENT, stretch_factor * HALF_EXTENT),
            y_bounds: (-HALF_EXTENT, HALF_EXTENT),
            edge_width: DEFAULT_EDGE_WIDTH,
            node_label_size: DEFAULT_NODE_LABEL_SIZE,
            edge_label_size: DEFAULT_EDGE_LABEL_SIZE,
        }
    }

    /// Visible x range, `(lo, hi)`.
    pub fn x_bounds(&self) -> (f32, f32) {
        self.x_bounds
    }

    /// Visible y range, `(lo, hi)`.
    pub fn y_bounds(&self) -> (f32, f32) {
        self.y_bounds
    }

    /// Current edge line width.
    pub fn edge_width(&self) -> f32 {
        self.edge_width
    }

    /// Current node label font size.
    pub fn node_label_size(&self) -> f32 {
        self.node_label_size
    }

    /// Current edge label font size.
    pub fn edge_label_size(&self) -> f32 {
        self.edge_label_size
    }

    /// Marker area for node primitives.
    pub fn node_size(&self) -> f32 {
        NODE_SIZE
    }

    /// Zoom by `factor`. A factor above 1 zooms in: the bounds shrink by the
    /// reciprocal and the edge width and font sizes grow by the factor.
    /// `zoom(f)` followed by `zoom(1/f)` restores the previous state up to
    /// floating error. No clamping is applied here.
    pub fn zoom(&mut self, factor: f32) {
        debug_assert!(factor > 0.0, "zoom factor must be positive");
        let inv = 1.0 / factor;
        self.x_bounds = (self.x_bounds.0 * inv, self.x_bounds.1 * inv);
        self.y_bounds = (self.y_bounds.0 * inv, self.y_bounds.1 * inv);
        self.edge_width *= factor;
        self.node_label_size *= factor;
        self.edge_label_size *= factor;
    }

    /// Translate both bound pairs by `(dx, dy)`. Nothing else changes.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.x_bounds = (self.x_bounds.0 + dx, self.x_bounds.1 + dx);
        self.y_bounds = (self.y_bounds.0 + dy, self.y_bounds.1 + dy);
    }
}
