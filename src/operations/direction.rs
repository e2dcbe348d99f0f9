use std::collections::HashSet;

use slotmap::SecondaryMap;

use crate::error::ExtrusionError;
use crate::math::{Vector3, TOLERANCE};
use crate::topology::{FaceId, TopologyStore, VertexId};

/// Strategy for the per-vertex extrusion length coefficient.
///
/// The default is uniform 1.0; the seam exists so a curvature-aware scaling
/// can be plugged in without touching the extrusion itself.
pub trait LengthScaling {
    /// Length coefficient for one front vertex.
    fn coefficient(&self, store: &TopologyStore, vertex: VertexId) -> f64;
}

/// Uniform length coefficient for every vertex.
#[derive(Debug, Clone, Copy)]
pub struct UniformScaling(pub f64);

impl LengthScaling for UniformScaling {
    fn coefficient(&self, _store: &TopologyStore, _vertex: VertexId) -> f64 {
        self.0
    }
}

/// Per-vertex extrusion directions and length coefficients.
///
/// One field is computed fresh per layer; the caster also emits one keyed by
/// the new vertex ids, which the next layer may use as fixed prior directions.
#[derive(Debug, Clone, Default)]
pub struct DirectionField {
    directions: SecondaryMap<VertexId, Vector3>,
    coefficients: SecondaryMap<VertexId, f64>,
}

impl DirectionField {
    /// Creates an empty field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit extrusion direction for a vertex, if present.
    #[must_use]
    pub fn direction(&self, vertex: VertexId) -> Option<Vector3> {
        self.directions.get(vertex).copied()
    }

    /// Length coefficient for a vertex, if present.
    #[must_use]
    pub fn coefficient(&self, vertex: VertexId) -> Option<f64> {
        self.coefficients.get(vertex).copied()
    }

    /// Records the direction and coefficient for a vertex.
    pub fn set(&mut self, vertex: VertexId, direction: Vector3, coefficient: f64) {
        self.directions.insert(vertex, direction);
        self.coefficients.insert(vertex, coefficient);
    }

    /// Number of vertices with a recorded direction.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    /// `true` if no vertex has a recorded direction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }
}

/// Computes the extrusion direction field for a set of front vertices.
///
/// Each vertex direction is the normalized mean of the unit normals of its
/// incident faces, counting only faces that are not deleted and have no
/// neighbour cell yet (still-free boundary faces). With
/// `ignore_unselected`, faces outside the front set are excluded as well.
///
/// # Errors
///
/// Returns [`ExtrusionError::DegenerateDirection`] if a vertex has no
/// qualifying incident face, or the accumulated normals cancel out.
pub fn compute_direction_field(
    store: &TopologyStore,
    vertices: &[VertexId],
    front: &HashSet<FaceId>,
    ignore_unselected: bool,
    scaling: &dyn LengthScaling,
) -> crate::Result<DirectionField> {
    let mut field = DirectionField::new();

    for &v in vertices {
        let mut acc = Vector3::new(0.0, 0.0, 0.0);
        let mut count = 0u32;
        for &f in store.faces_of_vertex(v)? {
            let face = store.face(f)?;
            if face.deleted {
                continue;
            }
            if face.neighbour.is_some() {
                continue;
            }
            if ignore_unselected && !front.contains(&f) {
                continue;
            }
            acc += store.face_normal(f)?;
            count += 1;
        }
        if count == 0 {
            return Err(ExtrusionError::DegenerateDirection(v).into());
        }
        let mean = acc / f64::from(count);
        if mean.norm() < TOLERANCE {
            return Err(ExtrusionError::DegenerateDirection(v).into());
        }
        field.set(v, mean.normalize(), scaling.coefficient(store, v));
    }

    Ok(field)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// One unit quad in the z=0 plane, wound counter-clockwise from +z.
    fn flat_quad(store: &mut TopologyStore) -> (Vec<VertexId>, FaceId) {
        let v = vec![
            store.add_vertex(p(0.0, 0.0, 0.0)),
            store.add_vertex(p(1.0, 0.0, 0.0)),
            store.add_vertex(p(1.0, 1.0, 0.0)),
            store.add_vertex(p(0.0, 1.0, 0.0)),
        ];
        let f = store.add_face(v.clone()).unwrap();
        (v, f)
    }

    #[test]
    fn flat_front_extrudes_along_plus_z() {
        let mut store = TopologyStore::new();
        let (v, f) = flat_quad(&mut store);
        let front: HashSet<FaceId> = [f].into();

        let field =
            compute_direction_field(&store, &v, &front, false, &UniformScaling(1.0)).unwrap();

        for &vid in &v {
            let dir = field.direction(vid).unwrap();
            assert_relative_eq!(dir.z, 1.0, epsilon = 1e-12);
            assert_relative_eq!(field.coefficient(vid).unwrap(), 1.0);
        }
    }

    #[test]
    fn recomputation_is_identical() {
        let mut store = TopologyStore::new();
        let (v, f) = flat_quad(&mut store);
        let front: HashSet<FaceId> = [f].into();

        let a = compute_direction_field(&store, &v, &front, false, &UniformScaling(1.0)).unwrap();
        let b = compute_direction_field(&store, &v, &front, false, &UniformScaling(1.0)).unwrap();
        for &vid in &v {
            assert_eq!(a.direction(vid), b.direction(vid));
        }
    }

    #[test]
    fn unselected_face_contributes_unless_ignored() {
        let mut store = TopologyStore::new();
        // Selected quad in z=0, plus an unselected quad folded up 90 degrees
        // along the shared x-axis edge (its normal is -y).
        let shared0 = store.add_vertex(p(0.0, 0.0, 0.0));
        let shared1 = store.add_vertex(p(1.0, 0.0, 0.0));
        let v2 = store.add_vertex(p(1.0, 1.0, 0.0));
        let v3 = store.add_vertex(p(0.0, 1.0, 0.0));
        let up0 = store.add_vertex(p(0.0, 0.0, 1.0));
        let up1 = store.add_vertex(p(1.0, 0.0, 1.0));

        let selected = store.add_face(vec![shared0, shared1, v2, v3]).unwrap();
        let folded = store.add_face(vec![shared1, shared0, up0, up1]).unwrap();
        let front: HashSet<FaceId> = [selected].into();

        let ignoring = compute_direction_field(
            &store,
            &[shared0],
            &front,
            true,
            &UniformScaling(1.0),
        )
        .unwrap();
        let dir = ignoring.direction(shared0).unwrap();
        assert_relative_eq!(dir.z, 1.0, epsilon = 1e-12);

        let blended = compute_direction_field(
            &store,
            &[shared0],
            &front,
            false,
            &UniformScaling(1.0),
        )
        .unwrap();
        let dir = blended.direction(shared0).unwrap();
        let folded_normal = store.face_normal(folded).unwrap();
        assert_relative_eq!(folded_normal.y, -1.0, epsilon = 1e-12);
        // Mean of (0,0,1) and (0,-1,0), normalized.
        let expected = 1.0 / f64::sqrt(2.0);
        assert_relative_eq!(dir.y, -expected, epsilon = 1e-12);
        assert_relative_eq!(dir.z, expected, epsilon = 1e-12);
    }

    #[test]
    fn vertex_with_no_free_face_is_degenerate() {
        let mut store = TopologyStore::new();
        let (v, f) = flat_quad(&mut store);
        let cell = store.add_cell();
        store.face_mut(f).unwrap().neighbour = Some(cell);
        let front: HashSet<FaceId> = [f].into();

        let result = compute_direction_field(&store, &v, &front, false, &UniformScaling(1.0));
        assert!(matches!(
            result,
            Err(crate::PrismeshError::Extrusion(
                ExtrusionError::DegenerateDirection(_)
            ))
        ));
    }

    #[test]
    fn coefficient_strategy_is_injectable() {
        let mut store = TopologyStore::new();
        let (v, f) = flat_quad(&mut store);
        let front: HashSet<FaceId> = [f].into();

        let field =
            compute_direction_field(&store, &v, &front, false, &UniformScaling(0.5)).unwrap();
        assert_relative_eq!(field.coefficient(v[0]).unwrap(), 0.5);
    }
}
