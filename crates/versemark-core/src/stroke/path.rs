//! Stroke geometry: path construction and gap filling.

use kurbo::{BezPath, Point};

use super::InputKind;

/// Default maximum gap between interpolated points.
pub const DEFAULT_INTERPOLATE_DISTANCE: f64 = 3.0;

/// Build the centerline path of a stroke.
///
/// Touch strokes are smoothed with quadratic curves through segment
/// midpoints; mouse strokes keep straight segments. The overlay preview,
/// the commit and every repaint go through this function so all three draw
/// the same shape.
pub fn stroke_path(points: &[Point], input_kind: InputKind) -> BezPath {
    let mut path = BezPath::new();
    let Some(first) = points.first() else {
        return path;
    };

    path.move_to(*first);
    if points.len() == 1 {
        return path;
    }

    match input_kind {
        InputKind::Touch => {
            for i in 1..points.len() - 1 {
                let mid = points[i].midpoint(points[i + 1]);
                path.quad_to(points[i], mid);
            }
            path.line_to(points[points.len() - 1]);
        }
        InputKind::Mouse => {
            for point in &points[1..] {
                path.line_to(*point);
            }
        }
    }
    path
}

/// Points strictly between `from` and `to`, spaced at most `max_distance`
/// apart. Empty when the two points are already close enough.
pub fn interpolate(from: Point, to: Point, max_distance: f64) -> Vec<Point> {
    let distance = from.distance(to);
    if max_distance <= 0.0 || distance <= max_distance {
        return Vec::new();
    }
    let steps = (distance / max_distance).floor() as usize;
    (1..steps)
        .map(|i| from.lerp(to, i as f64 / steps as f64))
        .collect()
}
