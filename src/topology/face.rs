use super::cell::CellId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// Data associated with a polygonal face.
///
/// A face is an ordered ring of vertices with consistent winding. The cell on
/// the side the outward normal points away from is the `owner`; the cell on
/// the inward side, if any, is the `neighbour`. A boundary face has an owner
/// and no neighbour.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The ordered vertex ring of the polygon.
    pub vertices: Vec<VertexId>,
    /// Cell on the outward-normal side.
    pub owner: Option<CellId>,
    /// Cell on the inward side; `None` for boundary faces.
    pub neighbour: Option<CellId>,
    /// Set when the face has been discarded; deleted faces are skipped by
    /// all queries but their records are kept so ids stay meaningful.
    pub deleted: bool,
    /// Boundary patch index, assigned after creation for boundary faces.
    pub patch: Option<usize>,
}

impl FaceData {
    /// Creates a new face with no owner, no neighbour, and no patch.
    #[must_use]
    pub fn new(vertices: Vec<VertexId>) -> Self {
        Self {
            vertices,
            owner: None,
            neighbour: None,
            deleted: false,
            patch: None,
        }
    }

    /// Consecutive vertex pairs of the polygon, including the closing edge.
    #[must_use]
    pub fn edges(&self) -> Vec<(VertexId, VertexId)> {
        let n = self.vertices.len();
        (0..n)
            .map(|i| (self.vertices[i], self.vertices[(i + 1) % n]))
            .collect()
    }

    /// Reverses the winding of the vertex ring, flipping the outward normal.
    pub fn flip_winding(&mut self) {
        self.vertices.reverse();
    }

    /// Reverses the face direction: flips winding and swaps owner with
    /// neighbour, so owner keeps tracking the outward-normal side.
    pub fn invert(&mut self) {
        self.flip_winding();
        std::mem::swap(&mut self.owner, &mut self.neighbour);
    }

    /// `true` once an owner is set and the face is not deleted.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.owner.is_some() && !self.deleted
    }
}
