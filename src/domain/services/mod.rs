//! Domain services - pure rules shared across use cases

mod naming;
mod variant_expander;

pub use naming::*;
pub use variant_expander::*;
