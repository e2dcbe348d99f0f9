pub mod cast;
pub mod direction;
pub mod extrude;
pub mod init;
pub mod layer;

pub use direction::{compute_direction_field, DirectionField, LengthScaling, UniformScaling};
pub use extrude::{ExtrudeCells, ExtrudeReport, ExtrudeSettings};
pub use init::{SeedGrid, SourceFace, SourceSurface};
pub use layer::{extrude_layer, LayerOutcome};
