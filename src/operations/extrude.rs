use crate::error::ExtrusionError;
use crate::topology::{FaceId, TopologyStore};

use super::direction::{DirectionField, LengthScaling, UniformScaling};
use super::layer::extrude_layer;

/// Configuration for a multi-layer extrusion run.
#[derive(Debug, Clone)]
pub struct ExtrudeSettings {
    /// Number of layers to extrude.
    pub layers: usize,
    /// Extrusion thickness of the first layer.
    pub thickness: f64,
    /// Reuse each vertex's previous-layer direction instead of recomputing.
    pub fixed_initial_directions: bool,
    /// Exclude faces outside the front from direction averaging.
    pub ignore_unselected_face_normals: bool,
    /// Formula over `x` (the current thickness) giving the next layer's
    /// thickness, e.g. `"x*1.3"`. Evaluation failure keeps the thickness.
    pub scale_thickness_expression: String,
}

impl Default for ExtrudeSettings {
    fn default() -> Self {
        Self {
            layers: 1,
            thickness: 1.0,
            fixed_initial_directions: false,
            ignore_unselected_face_normals: false,
            scale_thickness_expression: "x".into(),
        }
    }
}

/// Summary of a completed multi-layer extrusion.
#[derive(Debug)]
pub struct ExtrudeReport {
    /// Total number of cells created across all layers.
    pub total_cells: usize,
    /// Every face created across all layers.
    pub new_faces: Vec<FaceId>,
    /// The front after the last layer (the outermost caps).
    pub final_front: Vec<FaceId>,
    /// Thickness after the last layer's scaling step.
    pub final_thickness: f64,
}

/// Extrudes N layers of cells from a front of selected faces.
///
/// Each layer's cap faces become the next layer's front, and the directions
/// used are carried forward as the next layer's prior map. Failure in a layer
/// aborts the run; geometry committed by earlier layers is kept.
pub struct ExtrudeCells {
    settings: ExtrudeSettings,
    scaling: Box<dyn LengthScaling>,
}

impl ExtrudeCells {
    /// Creates a new `ExtrudeCells` operation with uniform length scaling.
    #[must_use]
    pub fn new(settings: ExtrudeSettings) -> Self {
        Self {
            settings,
            scaling: Box::new(UniformScaling(1.0)),
        }
    }

    /// Replaces the length-coefficient strategy.
    #[must_use]
    pub fn with_length_scaling(mut self, scaling: Box<dyn LengthScaling>) -> Self {
        self.scaling = scaling;
        self
    }

    /// Runs the configured number of layers starting from `front`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtrusionError::ZeroCellsProduced`] if a layer creates no
    /// cells, and propagates degenerate-direction and topology-consistency
    /// failures from the layer builder.
    pub fn execute(
        &self,
        store: &mut TopologyStore,
        front: Vec<FaceId>,
    ) -> crate::Result<ExtrudeReport> {
        let mut front = front;
        let mut directions = DirectionField::new();
        let mut thickness = self.settings.thickness;
        let mut total_cells = 0;
        let mut new_faces = Vec::new();

        for layer in 0..self.settings.layers {
            let outcome = extrude_layer(
                store,
                &front,
                &directions,
                &self.settings,
                &*self.scaling,
                thickness,
            )?;
            if outcome.new_cells.is_empty() {
                return Err(ExtrusionError::ZeroCellsProduced { layer }.into());
            }
            store.assign_default_patch(&outcome.new_faces)?;
            // Seed bases that were just inverted are boundary faces again.
            store.assign_default_patch(&front)?;

            log::debug!(
                "layer {layer}: {} cells, thickness {thickness}",
                outcome.new_cells.len()
            );
            total_cells += outcome.new_cells.len();
            new_faces.extend(outcome.new_faces);
            front = outcome.next_front;
            directions = outcome.next_directions;
            thickness = outcome.next_thickness;
        }

        Ok(ExtrudeReport {
            total_cells,
            new_faces,
            final_front: front,
            final_thickness: thickness,
        })
    }
}
