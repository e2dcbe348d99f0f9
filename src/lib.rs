pub mod error;
pub mod expr;
pub mod math;
pub mod operations;
pub mod topology;

pub use error::{PrismeshError, Result};
