use super::face::FaceId;

slotmap::new_key_type! {
    /// Unique identifier for a cell in the topology store.
    pub struct CellId;
}

/// Data associated with a volumetric cell.
///
/// A cell is the set of faces that bound it. A cell extruded from an n-sided
/// base face ends a layer with n + 2 faces (n sides, base, cap).
#[derive(Debug, Clone, Default)]
pub struct CellData {
    /// The faces bounding this cell, each listed once.
    pub faces: Vec<FaceId>,
}

impl CellData {
    /// Creates a new cell with an empty face set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a face with this cell. Safe against double insertion.
    pub fn add_face(&mut self, face: FaceId) {
        if !self.faces.contains(&face) {
            self.faces.push(face);
        }
    }
}
