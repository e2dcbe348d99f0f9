use crate::error::GeometryError;

use super::{Point3, Vector3, TOLERANCE};

/// Computes the unit normal of a polygon using Newell's method.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] if the polygon has fewer than three
/// vertices or its area vector is below tolerance (collinear points).
pub fn newell_normal(points: &[Point3]) -> Result<Vector3, GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::Degenerate(
            "polygon needs at least 3 vertices".into(),
        ));
    }

    let n = points.len();
    let mut normal = Vector3::new(0.0, 0.0, 0.0);
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    let len = normal.norm();
    if len < TOLERANCE {
        return Err(GeometryError::Degenerate(
            "polygon has no well-defined normal".into(),
        ));
    }
    Ok(normal / len)
}

/// Arithmetic mean of the polygon's vertices.
///
/// Matches the median-center convention used for orientation reference
/// vectors; not the area centroid.
#[must_use]
pub fn vertex_centroid(points: &[Point3]) -> Point3 {
    let mut acc = Vector3::new(0.0, 0.0, 0.0);
    for p in points {
        acc += p.coords;
    }
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / points.len() as f64;
    Point3::from(acc * inv)
}
