use std::collections::HashSet;

use slotmap::SecondaryMap;

use crate::error::ExtrusionError;
use crate::expr;
use crate::topology::{FaceId, TopologyStore, VertexId};

use super::direction::{compute_direction_field, DirectionField, LengthScaling};
use super::extrude::ExtrudeSettings;

/// Result of casting one layer's vertices.
#[derive(Debug)]
pub struct CastResult {
    /// Old front vertex → freshly cast vertex.
    pub vert_map: SecondaryMap<VertexId, VertexId>,
    /// Distinct front vertices, in first-seen order.
    pub orig_verts: Vec<VertexId>,
    /// Directions actually used, keyed by the new vertex ids; becomes the
    /// prior direction map for the next layer.
    pub next_directions: DirectionField,
    /// Thickness for the next layer, after applying the scaling expression.
    pub next_thickness: f64,
}

/// Casts one new vertex per distinct front vertex along the direction field.
///
/// The direction field is computed before any vertex is created, so a
/// degenerate direction leaves the store untouched. When
/// `fixed_initial_directions` is set and the prior map has an entry for a
/// vertex, that direction wins over the freshly computed one.
///
/// # Errors
///
/// Returns [`ExtrusionError::DegenerateDirection`] if the direction field
/// cannot be computed for some front vertex.
pub fn cast_vertices(
    store: &mut TopologyStore,
    front: &[FaceId],
    front_set: &HashSet<FaceId>,
    prior: &DirectionField,
    settings: &ExtrudeSettings,
    scaling: &dyn LengthScaling,
    thickness: f64,
) -> crate::Result<CastResult> {
    let mut orig_verts = Vec::new();
    let mut seen = HashSet::new();
    for &f in front {
        for &v in &store.face(f)?.vertices {
            if seen.insert(v) {
                orig_verts.push(v);
            }
        }
    }

    let fresh = compute_direction_field(
        store,
        &orig_verts,
        front_set,
        settings.ignore_unselected_face_normals,
        scaling,
    )?;

    let mut vert_map = SecondaryMap::new();
    let mut next_directions = DirectionField::new();
    for &v in &orig_verts {
        let fresh_dir = fresh
            .direction(v)
            .ok_or(ExtrusionError::DegenerateDirection(v))?;
        let dir = match prior.direction(v) {
            Some(prior_dir) if settings.fixed_initial_directions => prior_dir,
            _ => fresh_dir,
        };
        let coeff = fresh
            .coefficient(v)
            .ok_or(ExtrusionError::DegenerateDirection(v))?;

        let point = store.vertex(v)?.point;
        let new_id = store.add_vertex(point + dir * (thickness * coeff));
        vert_map.insert(v, new_id);
        next_directions.set(new_id, dir, coeff);
    }

    let next_thickness = scale_thickness(&settings.scale_thickness_expression, thickness);

    Ok(CastResult {
        vert_map,
        orig_verts,
        next_directions,
        next_thickness,
    })
}

/// Evaluates the user's thickness-scaling expression over the current
/// thickness. Evaluation failure is logged and recovered by keeping the
/// current thickness.
fn scale_thickness(expression: &str, current: f64) -> f64 {
    match expr::eval(expression, current) {
        Ok(next) => {
            log::debug!("thickness expression {expression:?} returned {next}");
            next
        }
        Err(err) => {
            log::error!("error evaluating thickness expression {expression:?}: {err}");
            current
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::operations::direction::UniformScaling;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

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
    fn casts_one_vertex_per_distinct_front_vertex() {
        let mut store = TopologyStore::new();
        let (v, f) = flat_quad(&mut store);
        let settings = ExtrudeSettings::default();

        let cast = cast_vertices(
            &mut store,
            &[f],
            &[f].into(),
            &DirectionField::new(),
            &settings,
            &UniformScaling(1.0),
            1.0,
        )
        .unwrap();

        assert_eq!(cast.orig_verts, v);
        assert_eq!(cast.vert_map.len(), 4);
        assert_eq!(store.vertex_count(), 8);
        for &old in &v {
            let new = cast.vert_map[old];
            let old_p = store.vertex(old).unwrap().point;
            let new_p = store.vertex(new).unwrap().point;
            assert_relative_eq!(new_p.x, old_p.x);
            assert_relative_eq!(new_p.y, old_p.y);
            assert_relative_eq!(new_p.z, old_p.z + 1.0);
        }
    }

    #[test]
    fn saved_directions_are_keyed_by_new_vertices() {
        let mut store = TopologyStore::new();
        let (v, f) = flat_quad(&mut store);
        let settings = ExtrudeSettings::default();

        let cast = cast_vertices(
            &mut store,
            &[f],
            &[f].into(),
            &DirectionField::new(),
            &settings,
            &UniformScaling(1.0),
            0.5,
        )
        .unwrap();

        assert_eq!(cast.next_directions.len(), 4);
        for &old in &v {
            assert!(cast.next_directions.direction(old).is_none());
            let dir = cast.next_directions.direction(cast.vert_map[old]).unwrap();
            assert_relative_eq!(dir.z, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn fixed_initial_directions_override_fresh_ones() {
        let mut store = TopologyStore::new();
        let (v, f) = flat_quad(&mut store);
        let settings = ExtrudeSettings {
            fixed_initial_directions: true,
            ..ExtrudeSettings::default()
        };

        let mut prior = DirectionField::new();
        prior.set(v[0], Vector3::new(1.0, 0.0, 0.0), 1.0);

        let cast = cast_vertices(
            &mut store,
            &[f],
            &[f].into(),
            &prior,
            &settings,
            &UniformScaling(1.0),
            2.0,
        )
        .unwrap();

        // v[0] follows its fixed +x direction, the rest follow the fresh +z.
        let moved = store.vertex(cast.vert_map[v[0]]).unwrap().point;
        assert_relative_eq!(moved.x, 2.0);
        assert_relative_eq!(moved.z, 0.0);
        let other = store.vertex(cast.vert_map[v[1]]).unwrap().point;
        assert_relative_eq!(other.z, 2.0);
    }

    #[test]
    fn shared_vertices_are_cast_once() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(p(0.0, 0.0, 0.0));
        let b = store.add_vertex(p(1.0, 0.0, 0.0));
        let c = store.add_vertex(p(1.0, 1.0, 0.0));
        let d = store.add_vertex(p(0.0, 1.0, 0.0));
        let e = store.add_vertex(p(2.0, 0.0, 0.0));
        let g = store.add_vertex(p(2.0, 1.0, 0.0));
        let f0 = store.add_face(vec![a, b, c, d]).unwrap();
        let f1 = store.add_face(vec![b, e, g, c]).unwrap();
        let settings = ExtrudeSettings::default();

        let cast = cast_vertices(
            &mut store,
            &[f0, f1],
            &[f0, f1].into(),
            &DirectionField::new(),
            &settings,
            &UniformScaling(1.0),
            1.0,
        )
        .unwrap();

        assert_eq!(cast.orig_verts.len(), 6);
        assert_eq!(cast.vert_map.len(), 6);
        assert_eq!(store.vertex_count(), 12);
    }

    #[test]
    fn thickness_expression_failure_keeps_thickness() {
        let mut store = TopologyStore::new();
        let (_, f) = flat_quad(&mut store);
        let settings = ExtrudeSettings {
            scale_thickness_expression: "x*oops".into(),
            ..ExtrudeSettings::default()
        };

        let cast = cast_vertices(
            &mut store,
            &[f],
            &[f].into(),
            &DirectionField::new(),
            &settings,
            &UniformScaling(1.0),
            0.75,
        )
        .unwrap();
        assert_relative_eq!(cast.next_thickness, 0.75);
    }

    #[test]
    fn thickness_expression_scales_next_layer() {
        let mut store = TopologyStore::new();
        let (_, f) = flat_quad(&mut store);
        let settings = ExtrudeSettings {
            scale_thickness_expression: "x*2".into(),
            ..ExtrudeSettings::default()
        };

        let cast = cast_vertices(
            &mut store,
            &[f],
            &[f].into(),
            &DirectionField::new(),
            &settings,
            &UniformScaling(1.0),
            1.0,
        )
        .unwrap();
        assert_relative_eq!(cast.next_thickness, 2.0);
    }
}
