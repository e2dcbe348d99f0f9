use crate::error::ExtrusionError;
use crate::math::Point3;
use crate::topology::{FaceId, TopologyStore, VertexId};

/// One polygon of a source surface, by position index.
#[derive(Debug, Clone)]
pub struct SourceFace {
    /// Indices into the surface's position list, in ring order.
    pub vertices: Vec<usize>,
    /// Whether the face is part of the selection to extrude.
    pub selected: bool,
}

/// A seed surface: positions plus selected/unselected polygons.
#[derive(Debug, Clone, Default)]
pub struct SourceSurface {
    /// Vertex positions.
    pub positions: Vec<Point3>,
    /// Polygons over the positions.
    pub faces: Vec<SourceFace>,
}

/// Seeds a fresh grid from the selected faces of a source surface.
///
/// All source geometry is created first, then unselected faces are
/// bulk-deleted and vertices left without any incident face are purged, so
/// the resulting store holds exactly the selected sheet. The seeded faces
/// have no owner yet; the first extrusion layer resolves them.
pub struct SeedGrid {
    surface: SourceSurface,
}

impl SeedGrid {
    /// Creates a new `SeedGrid` operation.
    #[must_use]
    pub fn new(surface: SourceSurface) -> Self {
        Self { surface }
    }

    /// Executes the operation, returning the seeded store and the initial
    /// front.
    ///
    /// # Errors
    ///
    /// Returns [`ExtrusionError::Initialization`] if a face references a
    /// position out of range or has fewer than three vertices, and
    /// [`ExtrusionError::EmptySelection`] if no selected face survives; in
    /// both cases the partially built store is discarded.
    pub fn execute(self) -> crate::Result<(TopologyStore, Vec<FaceId>)> {
        let mut store = TopologyStore::new();

        let verts: Vec<VertexId> = self
            .surface
            .positions
            .iter()
            .map(|&p| store.add_vertex(p))
            .collect();

        let mut front = Vec::new();
        let mut unselected = Vec::new();
        for source in &self.surface.faces {
            let ring: Vec<VertexId> = source
                .vertices
                .iter()
                .map(|&i| {
                    verts.get(i).copied().ok_or_else(|| {
                        ExtrusionError::Initialization(format!(
                            "face references position {i} out of range"
                        ))
                    })
                })
                .collect::<Result<_, _>>()?;
            let id = store
                .add_face(ring)
                .map_err(|err| ExtrusionError::Initialization(err.to_string()))?;
            if source.selected {
                front.push(id);
            } else {
                unselected.push(id);
            }
        }

        for f in unselected {
            store.delete_face(f)?;
        }
        let purged = store.purge_isolated_vertices();
        log::debug!(
            "seeded grid: {} vertices ({purged} purged), {} front faces",
            store.vertex_count(),
            front.len()
        );

        if front.is_empty() {
            return Err(ExtrusionError::EmptySelection.into());
        }
        Ok((store, front))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn strip() -> SourceSurface {
        // Two quads in a row, only the first selected.
        SourceSurface {
            positions: vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(2.0, 0.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(2.0, 1.0, 0.0),
            ],
            faces: vec![
                SourceFace {
                    vertices: vec![0, 1, 4, 3],
                    selected: true,
                },
                SourceFace {
                    vertices: vec![1, 2, 5, 4],
                    selected: false,
                },
            ],
        }
    }

    #[test]
    fn keeps_only_selected_geometry() {
        let (store, front) = SeedGrid::new(strip()).execute().unwrap();

        assert_eq!(front.len(), 1);
        assert_eq!(store.face_count(), 1);
        // Positions 2 and 5 belong only to the unselected quad.
        assert_eq!(store.vertex_count(), 4);

        let face = store.face(front[0]).unwrap();
        assert_eq!(face.owner, None);
        assert_eq!(face.neighbour, None);
    }

    #[test]
    fn nothing_selected_is_empty_selection() {
        let mut surface = strip();
        for f in &mut surface.faces {
            f.selected = false;
        }
        let result = SeedGrid::new(surface).execute();
        assert!(matches!(
            result,
            Err(crate::PrismeshError::Extrusion(
                ExtrusionError::EmptySelection
            ))
        ));
    }

    #[test]
    fn out_of_range_index_fails_initialization() {
        let surface = SourceSurface {
            positions: vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)],
            faces: vec![SourceFace {
                vertices: vec![0, 1, 7],
                selected: true,
            }],
        };
        let result = SeedGrid::new(surface).execute();
        assert!(matches!(
            result,
            Err(crate::PrismeshError::Extrusion(
                ExtrusionError::Initialization(_)
            ))
        ));
    }

    #[test]
    fn seeded_front_extrudes_end_to_end() {
        use crate::operations::{ExtrudeCells, ExtrudeSettings};

        let (mut store, front) = SeedGrid::new(strip()).execute().unwrap();
        let op = ExtrudeCells::new(ExtrudeSettings::default());
        let report = op.execute(&mut store, front).unwrap();

        assert_eq!(report.total_cells, 1);
        assert_eq!(store.cell_count(), 1);
    }
}
