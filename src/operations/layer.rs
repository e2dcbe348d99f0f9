use std::collections::HashSet;

use slotmap::SecondaryMap;

use crate::error::ExtrusionError;
use crate::math::Point3;
use crate::topology::{CellId, FaceId, TopologyStore, VertexId};

use super::cast::cast_vertices;
use super::direction::{DirectionField, LengthScaling};
use super::extrude::ExtrudeSettings;

/// Everything one layer of extrusion produced.
#[derive(Debug)]
pub struct LayerOutcome {
    /// The cells created this layer, one per front face.
    pub new_cells: Vec<CellId>,
    /// All faces created this layer (sides and caps), for boundary patch
    /// assignment.
    pub new_faces: Vec<FaceId>,
    /// The cap faces, which form the next layer's front.
    pub next_front: Vec<FaceId>,
    /// Directions keyed by the new vertices, the next layer's prior map.
    pub next_directions: DirectionField,
    /// Thickness for the next layer.
    pub next_thickness: f64,
}

/// Extrudes one layer of cells from the current front.
///
/// For every front face, one new cell is created together with its side
/// faces (one per base edge, shared with the adjacent front face when the
/// edge is shared), and a cap face mirroring the base's vertex order. Side
/// faces are oriented outward from their owning cell using the
/// edge-midpoint-to-base-centroid reference vector; that test requires the
/// extruded cells to be convex, which is the caller's responsibility.
///
/// Base faces that had no owner before this layer (the seed surface) are
/// inverted at the end, so the new cell becomes their owner and their normal
/// points out of the grid.
///
/// # Errors
///
/// Returns [`ExtrusionError::DegenerateDirection`] if no extrusion direction
/// exists for some front vertex, and
/// [`ExtrusionError::TopologyConsistency`] if a side face that must already
/// exist for a shared edge cannot be found.
pub fn extrude_layer(
    store: &mut TopologyStore,
    front: &[FaceId],
    prior: &DirectionField,
    settings: &ExtrudeSettings,
    scaling: &dyn LengthScaling,
    thickness: f64,
) -> crate::Result<LayerOutcome> {
    let front_set: HashSet<FaceId> = front.iter().copied().collect();
    let cast = cast_vertices(store, front, &front_set, prior, settings, scaling, thickness)?;

    // Cell block reserved up front: side faces of later front faces may be
    // linked to any cell of this layer.
    let cells: Vec<CellId> = front.iter().map(|_| store.add_cell()).collect();

    let mut processed_edges: HashSet<(VertexId, VertexId)> = HashSet::new();
    let mut side_faces: Vec<FaceId> = Vec::new();
    let mut new_faces: Vec<FaceId> = Vec::new();
    let mut next_front: Vec<FaceId> = Vec::new();
    let mut seed_bases: Vec<FaceId> = Vec::new();

    for (&f, &cell) in front.iter().zip(&cells) {
        let (base_ring, base_edges, had_owner) = {
            let base = store.face(f)?;
            (base.vertices.clone(), base.edges(), base.owner.is_some())
        };
        let base_centroid = store.face_centroid(f)?;

        // Side faces, one per base edge.
        for (e0, e1) in base_edges {
            if !processed_edges.insert(edge_key(e0, e1)) {
                // The adjacent front face already extruded this edge; the
                // existing side face becomes internal.
                let side = find_side_face(store, &side_faces, e0, e1, &cast.vert_map)?;
                let face = store.face_mut(side)?;
                face.neighbour = Some(cell);
                face.patch = None;
                store.cell_mut(cell)?.add_face(side);
                continue;
            }

            let n0 = mapped(&cast.vert_map, e0)?;
            let n1 = mapped(&cast.vert_map, e1)?;
            let side = store.add_face(vec![e0, n0, n1, e1])?;

            // Reference vector from the edge midpoint (old coordinates)
            // toward the base centroid points into the cell footprint; a
            // normal agreeing with it faces inward and gets flipped.
            let p0 = store.vertex(e0)?.point;
            let p1 = store.vertex(e1)?.point;
            let edge_mid = Point3::from((p0.coords + p1.coords) * 0.5);
            let refvec = base_centroid - edge_mid;
            if store.face_normal(side)?.dot(&refvec) > 0.0 {
                store.flip_face(side)?;
            }

            store.face_mut(side)?.owner = Some(cell);
            store.cell_mut(cell)?.add_face(side);
            side_faces.push(side);
            new_faces.push(side);
        }

        // The base face keeps its winding; the new cell sits on its inward
        // side, so it is registered as neighbour. Seed faces get fixed below.
        {
            let base = store.face_mut(f)?;
            base.neighbour = Some(cell);
            base.patch = None;
        }
        store.cell_mut(cell)?.add_face(f);
        if !had_owner {
            seed_bases.push(f);
        }

        // Cap face, mirroring the base's vertex order.
        let cap_ring: Vec<VertexId> = base_ring
            .iter()
            .map(|&v| mapped(&cast.vert_map, v))
            .collect::<crate::Result<_>>()?;
        let cap = store.add_face(cap_ring)?;
        store.face_mut(cap)?.owner = Some(cell);
        store.cell_mut(cell)?.add_face(cap);
        new_faces.push(cap);
        next_front.push(cap);
    }

    // Seed finalization: bases that were free boundary faces were authored
    // facing the new cell; invert them so owner tracks the outward normal.
    for f in seed_bases {
        store.face_mut(f)?.invert();
    }

    log::debug!(
        "extruded layer: {} cells, {} faces",
        cells.len(),
        new_faces.len()
    );

    Ok(LayerOutcome {
        new_cells: cells,
        new_faces,
        next_front,
        next_directions: cast.next_directions,
        next_thickness: cast.next_thickness,
    })
}

fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn mapped(
    vert_map: &SecondaryMap<VertexId, VertexId>,
    v: VertexId,
) -> crate::Result<VertexId> {
    vert_map
        .get(v)
        .copied()
        .ok_or_else(|| crate::error::TopologyError::EntityNotFound("cast vertex".into()).into())
}

/// Locates the side face already extruded from edge `(e0, e1)` among the
/// faces created this layer, by matching its expected vertex set.
fn find_side_face(
    store: &TopologyStore,
    side_faces: &[FaceId],
    e0: VertexId,
    e1: VertexId,
    vert_map: &SecondaryMap<VertexId, VertexId>,
) -> crate::Result<FaceId> {
    let expected = [e0, mapped(vert_map, e0)?, mapped(vert_map, e1)?, e1];
    for &candidate in side_faces {
        let ring = &store.face(candidate)?.vertices;
        if ring.len() == 4 && expected.iter().all(|v| ring.contains(v)) {
            return Ok(candidate);
        }
    }
    Err(ExtrusionError::TopologyConsistency(e0, e1).into())
}
