pub mod cell;
pub mod face;
pub mod vertex;

pub use cell::{CellData, CellId};
pub use face::{FaceData, FaceId};
pub use vertex::{VertexData, VertexId};

use crate::error::TopologyError;
use crate::math::{polygon, Point3, Vector3};
use slotmap::{SecondaryMap, SlotMap};

/// Patch index assigned to boundary faces that were not given one explicitly.
pub const DEFAULT_PATCH: usize = 0;

/// Central arena that owns all mesh entities.
///
/// Entities reference each other via typed IDs (generational indices), so ids
/// stay valid across unrelated create/delete batches and no index-table
/// refresh is ever needed. The store also maintains the per-vertex
/// incident-face adjacency the extrusion queries.
#[derive(Debug, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    faces: SlotMap<FaceId, FaceData>,
    cells: SlotMap<CellId, CellData>,
    link_faces: SecondaryMap<VertexId, Vec<FaceId>>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex at the given position and returns its ID.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        let id = self.vertices.insert(VertexData::new(point));
        self.link_faces.insert(id, Vec::new());
        id
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns a mutable reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Faces incident to a vertex (live faces only).
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found in the store.
    pub fn faces_of_vertex(&self, id: VertexId) -> Result<&[FaceId], TopologyError> {
        self.link_faces
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Number of vertices currently in the store.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // --- Face operations ---

    /// Creates a face from an ordered vertex ring and returns its ID.
    ///
    /// The new face starts with no owner, no neighbour, and no patch.
    ///
    /// # Errors
    ///
    /// Returns an error if the ring has fewer than three vertices or
    /// references a vertex that is not in the store.
    pub fn add_face(&mut self, vertices: Vec<VertexId>) -> Result<FaceId, TopologyError> {
        if vertices.len() < 3 {
            return Err(TopologyError::InvalidTopology(
                "face needs at least 3 vertices".into(),
            ));
        }
        for &v in &vertices {
            if !self.vertices.contains_key(v) {
                return Err(TopologyError::EntityNotFound("vertex".into()));
            }
        }
        let ring = vertices.clone();
        let id = self.faces.insert(FaceData::new(vertices));
        for v in ring {
            if let Some(links) = self.link_faces.get_mut(v) {
                links.push(id);
            }
        }
        Ok(id)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Returns a mutable reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData, TopologyError> {
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Positions of a face's vertices in ring order.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or any of its vertices is not found.
    pub fn face_points(&self, id: FaceId) -> Result<Vec<Point3>, TopologyError> {
        let face = self.face(id)?;
        face.vertices
            .iter()
            .map(|&v| self.vertex(v).map(|d| d.point))
            .collect()
    }

    /// Unit outward normal of a face (Newell's method over the ring).
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not found or its ring is degenerate.
    pub fn face_normal(&self, id: FaceId) -> crate::Result<Vector3> {
        let points = self.face_points(id)?;
        Ok(polygon::newell_normal(&points)?)
    }

    /// Mean of a face's vertex positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or any of its vertices is not found.
    pub fn face_centroid(&self, id: FaceId) -> Result<Point3, TopologyError> {
        Ok(polygon::vertex_centroid(&self.face_points(id)?))
    }

    /// Reverses the winding of a face, flipping its outward normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not found.
    pub fn flip_face(&mut self, id: FaceId) -> Result<(), TopologyError> {
        self.face_mut(id)?.flip_winding();
        Ok(())
    }

    /// Marks a face deleted and unlinks it from vertex adjacency.
    ///
    /// The record is kept so the id stays meaningful; deleted faces are
    /// skipped by adjacency queries and direction averaging.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not found.
    pub fn delete_face(&mut self, id: FaceId) -> Result<(), TopologyError> {
        let vertices = self.face(id)?.vertices.clone();
        for v in vertices {
            if let Some(links) = self.link_faces.get_mut(v) {
                links.retain(|&f| f != id);
            }
        }
        self.face_mut(id)?.deleted = true;
        Ok(())
    }

    /// Removes every vertex with no remaining incident face.
    ///
    /// Used once at initialization, after unselected source faces have been
    /// bulk-deleted. Returns the number of vertices removed.
    pub fn purge_isolated_vertices(&mut self) -> usize {
        let isolated: Vec<VertexId> = self
            .vertices
            .keys()
            .filter(|&v| self.link_faces.get(v).is_none_or(Vec::is_empty))
            .collect();
        for v in &isolated {
            self.vertices.remove(*v);
            self.link_faces.remove(*v);
        }
        isolated.len()
    }

    /// Iterates over all live (non-deleted) faces.
    pub fn live_faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> {
        self.faces.iter().filter(|(_, f)| !f.deleted)
    }

    /// Number of live faces in the store.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.live_faces().count()
    }

    /// Assigns the default patch to every boundary face in the list that has
    /// no patch yet. Internal faces are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if any face id is not found.
    pub fn assign_default_patch(&mut self, faces: &[FaceId]) -> Result<(), TopologyError> {
        for &id in faces {
            let face = self.face_mut(id)?;
            if face.neighbour.is_none() && face.patch.is_none() {
                face.patch = Some(DEFAULT_PATCH);
            }
        }
        Ok(())
    }

    // --- Cell operations ---

    /// Inserts a new empty cell and returns its ID.
    pub fn add_cell(&mut self) -> CellId {
        self.cells.insert(CellData::new())
    }

    /// Returns a reference to the cell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn cell(&self, id: CellId) -> Result<&CellData, TopologyError> {
        self.cells
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("cell".into()))
    }

    /// Returns a mutable reference to the cell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn cell_mut(&mut self, id: CellId) -> Result<&mut CellData, TopologyError> {
        self.cells
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("cell".into()))
    }

    /// Mean of the centroids of a cell's faces.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell or any of its faces is not found, or the
    /// cell has no faces.
    pub fn cell_centroid(&self, id: CellId) -> Result<Point3, TopologyError> {
        let faces = self.cell(id)?.faces.clone();
        if faces.is_empty() {
            return Err(TopologyError::InvalidTopology("cell has no faces".into()));
        }
        let mut acc = Vector3::new(0.0, 0.0, 0.0);
        for f in &faces {
            acc += self.face_centroid(*f)?.coords;
        }
        #[allow(clippy::cast_precision_loss)]
        let inv = 1.0 / faces.len() as f64;
        Ok(Point3::from(acc * inv))
    }

    /// Number of cells in the store.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
