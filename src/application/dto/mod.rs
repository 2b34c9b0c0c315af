//! Data Transfer Objects - For API boundaries
//!
//! Request shapes live in the application layer so HTTP handlers and
//! services share one definition. Optional fields mean "leave unchanged";
//! `Option<Option<_>>` fields additionally accept `null` to clear a value.

pub mod admin;
pub mod ai;
pub mod game;
pub mod ingest;
pub mod library;

pub use admin::*;
pub use ai::*;
pub use game::*;
pub use ingest::*;
pub use library::*;

use serde::{Deserialize, Deserializer};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`)
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_distinguishes_missing_and_null() {
        let missing: UpdateWorldRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.background, None);

        let cleared: UpdateWorldRequest = serde_json::from_str(r#"{"background":null}"#).unwrap();
        assert_eq!(cleared.background, Some(None));
    }
}
