//! In-memory record store

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::ports::outbound::{Record, RecordStore, RepoError};
use crate::domain::value_objects::UserId;

/// Keeps records in insertion order behind a tokio `RwLock`
#[derive(Clone)]
pub struct InMemoryStore<T> {
    records: Arc<RwLock<Vec<T>>>,
}

impl<T> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn same_id<T: Record>(record: &T, id: T::Id) -> bool {
    let a: Uuid = record.id().into();
    let b: Uuid = id.into();
    a == b
}

#[async_trait]
impl<T: Record> RecordStore<T> for InMemoryStore<T> {
    async fn get(&self, id: T::Id) -> Result<Option<T>, RepoError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| same_id::<T>(r, id)).cloned())
    }

    async fn list(&self) -> Result<Vec<T>, RepoError> {
        Ok(self.records.read().await.clone())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<T>, RepoError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.owner() == Some(owner))
            .cloned()
            .collect())
    }

    async fn list_by_parent(&self, parent: Uuid) -> Result<Vec<T>, RepoError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.parent() == Some(parent))
            .cloned()
            .collect())
    }

    async fn save(&self, record: &T) -> Result<(), RepoError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| same_id::<T>(r, record.id())) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn delete(&self, id: T::Id) -> Result<bool, RepoError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !same_id::<T>(r, id));
        Ok(records.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Campaign, World};

    #[tokio::test]
    async fn test_save_is_an_upsert() {
        let store = InMemoryStore::<World>::new();
        let mut world = World::new(UserId::new(), "Greyhawk", "");
        store.save(&world).await.unwrap();

        world.name = "Oerth".to_string();
        store.save(&world).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Oerth");
    }

    #[tokio::test]
    async fn test_owner_and_parent_filters() {
        let owner = UserId::new();
        let world = World::new(owner, "Greyhawk", "");
        let store = InMemoryStore::<Campaign>::new();
        store
            .save(&Campaign::new(owner, "In world", "").in_world(world.id))
            .await
            .unwrap();
        store
            .save(&Campaign::new(UserId::new(), "Elsewhere", ""))
            .await
            .unwrap();

        assert_eq!(store.list_by_owner(owner).await.unwrap().len(), 1);
        let children = store.list_by_parent(world.id.into()).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "In world");
    }

    #[tokio::test]
    async fn test_delete_reports_missing() {
        let store = InMemoryStore::<World>::new();
        let world = World::new(UserId::new(), "Greyhawk", "");
        store.save(&world).await.unwrap();

        assert!(store.delete(world.id).await.unwrap());
        assert!(!store.delete(world.id).await.unwrap());
        assert!(store.get(world.id).await.unwrap().is_none());
    }
}
