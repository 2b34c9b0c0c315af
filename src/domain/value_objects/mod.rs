//! Value objects - immutable types with no identity of their own

mod geometry;
mod grid;
mod ids;
mod recurrence;

pub use geometry::*;
pub use grid::*;
pub use ids::*;
pub use recurrence::*;
