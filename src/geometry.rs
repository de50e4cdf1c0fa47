//! Pure geometry helpers for hit-testing and label placement.
//!
//! All functions operate on logical (graph-space) coordinates and carry no
//! state. Points are `(x, y)` tuples of `f32`.

/// Distance between a click position and its perpendicular projection onto
/// the line segment `[start, end]`.
///
/// Returns `None` when the projection falls outside the segment (scalar
/// projection coefficient below 0 or above 1), i.e. the click is "beside"
/// the segment rather than alongside it.
///
/// A zero-length segment is undefined input; callers must guarantee distinct
/// endpoints (every edge in the graph has them).
pub fn segment_projection_distance(
    click: (f32, f32),
    start: (f32, f32),
    end: (f32, f32),
) -> Option<f32> {
    // Work with vectors relative to the segment start.
    let mu = (click.0 - start.0, click.1 - start.1);
    let b = (end.0 - start.0, end.1 - start.1);

    let len_sq = b.0 * b.0 + b.1 * b.1;
    debug_assert!(len_sq > 0.0, "segment endpoints must be distinct");

    let t = (mu.0 * b.0 + mu.1 * b.1) / len_sq;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let proj = (t * b.0, t * b.1);
    Some(((mu.0 - proj.0).powi(2) + (mu.1 - proj.1).powi(2)).sqrt())
}

/// Euclidean distance between two points.
pub fn euclidean_distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Rotation angle in degrees for a label drawn along the segment
/// `[start, end]`, with the endpoints mapped through the current axis bounds
/// so the on-screen slope is honored when the visible rectangle is not
/// square.
///
/// The result is normalized into `(-90, 90]` so label text never renders
/// upside down.
pub fn edge_label_rotation(
    x_bounds: (f32, f32),
    y_bounds: (f32, f32),
    start: (f32, f32),
    end: (f32, f32),
) -> f32 {
    let span_x = x_bounds.1 - x_bounds.0;
    let span_y = y_bounds.1 - y_bounds.0;
    debug_assert!(span_x != 0.0 && span_y != 0.0, "axis bounds must span a non-empty range");

    let dx = (end.0 - start.0) / span_x;
    let dy = (end.1 - start.1) / span_y;

    let mut angle = dy.atan2(dx).to_degrees();
    if angle > 90.0 {
        angle -= 180.0;
    }
    if angle <= -90.0 {
        angle += 180.0;
    }
    angle
}
