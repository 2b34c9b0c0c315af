//! Helpers shared by the library services

use crate::application::dto::{LibraryPage, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::outbound::{Record, RecordStore, Repository};
use crate::domain::entities::{GameSession, Shareable};
use crate::domain::value_objects::UserId;

pub const MAX_NAME_LENGTH: usize = 128;
pub const MAX_DESCRIPTION_LENGTH: usize = 4096;

/// Load a record or fail with NotFound naming `what`
pub async fn load<T: Record>(
    store: &dyn RecordStore<T>,
    id: T::Id,
    what: &str,
) -> ServiceResult<T> {
    store
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(what))
}

pub fn ensure_owner<T: Shareable>(item: &T, user: UserId, what: &str) -> ServiceResult<()> {
    if item.is_owned_by(user) {
        Ok(())
    } else {
        Err(ServiceError::not_allowed(format!(
            "Only the owner can modify this {}",
            what.to_lowercase()
        )))
    }
}

pub fn ensure_visible<T: Shareable>(item: &T, user: UserId, what: &str) -> ServiceResult<()> {
    if item.is_visible_to(user) {
        Ok(())
    } else {
        Err(ServiceError::not_allowed(format!(
            "This {} is not shared with you",
            what.to_lowercase()
        )))
    }
}

pub fn check_name(entity: &str, name: &str, errors: &mut Vec<String>) {
    if name.trim().is_empty() {
        errors.push(format!("{} name cannot be empty", entity));
    } else if name.trim().chars().count() > MAX_NAME_LENGTH {
        errors.push(format!(
            "{} name cannot exceed {} characters",
            entity, MAX_NAME_LENGTH
        ));
    }
}

pub fn check_description(entity: &str, description: &str, errors: &mut Vec<String>) {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        errors.push(format!(
            "{} description cannot exceed {} characters",
            entity, MAX_DESCRIPTION_LENGTH
        ));
    }
}

/// Validate an optional name and description pair, as sent by updates
pub fn check_patch(entity: &str, name: Option<&str>, description: Option<&str>) -> ServiceResult<()> {
    let mut errors = Vec::new();
    if let Some(name) = name {
        check_name(entity, name, &mut errors);
    }
    if let Some(description) = description {
        check_description(entity, description, &mut errors);
    }
    ServiceError::check(errors)
}

pub fn check_create(entity: &str, name: &str, description: &str) -> ServiceResult<()> {
    check_patch(entity, Some(name), Some(description))
}

/// Refuse to remove content that an in-progress or paused session points at
pub async fn ensure_not_in_play(
    repository: &Repository,
    what: &str,
    references: impl Fn(&GameSession) -> bool + Send,
) -> ServiceResult<()> {
    let sessions = repository.game_sessions().list().await?;
    if sessions.iter().any(|s| s.status.is_live() && references(s)) {
        return Err(ServiceError::Conflict(format!(
            "Cannot delete {} referenced by active game session",
            what.to_lowercase()
        )));
    }
    Ok(())
}

pub fn check_paging(skip: i64, take: i64) -> ServiceResult<()> {
    let mut errors = Vec::new();
    if skip < 0 {
        errors.push("skip must be greater than or equal to 0".to_string());
    }
    if !(1..=MAX_PAGE_SIZE).contains(&take) {
        errors.push(format!("take must be between 1 and {}", MAX_PAGE_SIZE));
    }
    ServiceError::check(errors)
}

/// Cut one page out of already filtered and sorted items
pub fn paginate<T>(items: Vec<T>, skip: Option<i64>, take: Option<i64>) -> ServiceResult<LibraryPage<T>> {
    let skip = skip.unwrap_or(0);
    let take = take.unwrap_or(DEFAULT_PAGE_SIZE);
    check_paging(skip, take)?;

    let total_count = items.len();
    let mut content: Vec<T> = items
        .into_iter()
        .skip(skip as usize)
        .take(take as usize + 1)
        .collect();
    let has_more = content.len() > take as usize;
    content.truncate(take as usize);
    Ok(LibraryPage {
        content,
        total_count,
        has_more,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rules() {
        assert!(check_create("World", "Eberron", "").is_ok());
        assert!(check_create("World", "   ", "").is_err());
        assert!(check_create("World", &"x".repeat(129), "").is_err());
        assert!(check_create("World", &"x".repeat(128), "").is_ok());
    }

    #[test]
    fn test_description_limit() {
        let err = check_create("World", "Eberron", &"x".repeat(4097)).unwrap_err();
        match err {
            ServiceError::Validation(messages) => {
                assert_eq!(messages, vec!["World description cannot exceed 4096 characters"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_patch_skips_missing_fields() {
        assert!(check_patch("World", None, None).is_ok());
        assert!(check_patch("World", Some(""), None).is_err());
    }

    #[test]
    fn test_paginate_reports_more_pages() {
        let first = paginate((0..5).collect::<Vec<_>>(), None, Some(2)).unwrap();
        assert_eq!(first.content, vec![0, 1]);
        assert_eq!(first.total_count, 5);
        assert!(first.has_more);

        let last = paginate((0..5).collect::<Vec<_>>(), Some(4), Some(2)).unwrap();
        assert_eq!(last.content, vec![4]);
        assert!(!last.has_more);

        assert!(matches!(
            paginate(vec![1], Some(-1), Some(0)),
            Err(ServiceError::Validation(errors)) if errors.len() == 2
        ));
    }
}
