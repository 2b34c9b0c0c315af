//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: World, Campaign, Adventure, Encounter, Stage, GameSession, etc.
//! - Value Objects: typed ids, geometry, grids, recurrence rules
//! - Domain Services: pure rules shared across use cases (naming, variants)

pub mod entities;
pub mod services;
pub mod value_objects;
