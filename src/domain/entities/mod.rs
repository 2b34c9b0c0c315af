//! Domain entities

mod adventure;
mod asset;
mod audit_log;
mod campaign;
mod encounter;
mod game_session;
mod maintenance_mode;
mod scene;
mod schedule;
mod stage;
mod world;

pub use adventure::*;
pub use asset::*;
pub use audit_log::*;
pub use campaign::*;
pub use encounter::*;
pub use game_session::*;
pub use maintenance_mode::*;
pub use scene::*;
pub use schedule::*;
pub use stage::*;
pub use world::*;

use crate::domain::value_objects::UserId;

/// Library content that belongs to a user and may be shared with others
pub trait Shareable {
    fn owner_id(&self) -> UserId;
    fn is_published(&self) -> bool;
    fn is_public(&self) -> bool;

    fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id() == user
    }

    /// Owners always see their content; everybody else only sees what has
    /// been both published and made public.
    fn is_visible_to(&self, user: UserId) -> bool {
        self.is_owned_by(user) || (self.is_published() && self.is_public())
    }
}

macro_rules! impl_shareable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Shareable for $ty {
                fn owner_id(&self) -> UserId {
                    self.owner_id
                }

                fn is_published(&self) -> bool {
                    self.is_published
                }

                fn is_public(&self) -> bool {
                    self.is_public
                }
            }
        )+
    };
}

impl_shareable!(World, Campaign, Adventure, Stage, Asset);

/// Items kept in an ordered collection addressed by a stable index
pub trait Indexed {
    fn index(&self) -> u32;
    fn set_index(&mut self, index: u32);
}

macro_rules! impl_indexed {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Indexed for $ty {
                fn index(&self) -> u32 {
                    self.index
                }

                fn set_index(&mut self, index: u32) {
                    self.index = index;
                }
            }
        )+
    };
}

impl_indexed!(
    EncounterAsset,
    StageWall,
    StageRegion,
    StageLight,
    StageDecoration,
    StageSound,
);

/// Next free index: one past the highest in use, 0 for an empty collection
pub fn next_index<T: Indexed>(items: &[T]) -> u32 {
    items.iter().map(|i| i.index() + 1).max().unwrap_or(0)
}

/// Remove the item at `index`, returning whether it existed
pub fn remove_indexed<T: Indexed>(items: &mut Vec<T>, index: u32) -> bool {
    let before = items.len();
    items.retain(|i| i.index() != index);
    items.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slot(u32);

    impl Indexed for Slot {
        fn index(&self) -> u32 {
            self.0
        }

        fn set_index(&mut self, index: u32) {
            self.0 = index;
        }
    }

    #[test]
    fn test_next_index_starts_at_zero() {
        assert_eq!(next_index::<Slot>(&[]), 0);
    }

    #[test]
    fn test_next_index_skips_past_gaps() {
        assert_eq!(next_index(&[Slot(0), Slot(4), Slot(2)]), 5);
    }

    #[test]
    fn test_remove_indexed_reports_missing() {
        let mut slots = vec![Slot(0), Slot(1)];
        assert!(remove_indexed(&mut slots, 1));
        assert!(!remove_indexed(&mut slots, 1));
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_visibility_rules() {
        let owner = UserId::new();
        let other = UserId::new();
        let mut world = World::new(owner, "Eberron", "");
        assert!(world.is_visible_to(owner));
        assert!(!world.is_visible_to(other));

        world.is_public = true;
        assert!(!world.is_visible_to(other));
        world.is_published = true;
        assert!(world.is_visible_to(other));
    }
}
