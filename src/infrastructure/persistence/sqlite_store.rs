//! SQLite record store
//!
//! Each aggregate lives in its own table as a JSON document, with the
//! owner and parent keys copied into indexed columns.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::application::ports::outbound::{Record, RecordStore, RepoError};
use crate::domain::value_objects::UserId;

pub struct SqliteStore<T> {
    pool: SqlitePool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for SqliteStore<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _marker: PhantomData,
        }
    }
}

fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

impl<T: Record> SqliteStore<T> {
    /// Open the store, creating its table and indexes if needed
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        let table = T::TABLE;
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                owner_id TEXT,
                parent_id TEXT,
                data TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#
        ))
        .execute(&pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_owner ON {table} (owner_id)"
        ))
        .execute(&pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_parent ON {table} (parent_id)"
        ))
        .execute(&pool)
        .await?;

        Ok(Self {
            pool,
            _marker: PhantomData,
        })
    }

    async fn fetch_where(&self, filter: &str, value: Option<String>) -> Result<Vec<T>, RepoError> {
        let sql = format!("SELECT data FROM {} {} ORDER BY rowid", T::TABLE, filter);
        let mut query = sqlx::query_as::<_, (String,)>(&sql);
        if let Some(value) = value {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;
        rows.into_iter()
            .map(|(data,)| serde_json::from_str(&data).map_err(RepoError::from))
            .collect()
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for SqliteStore<T> {
    async fn get(&self, id: T::Id) -> Result<Option<T>, RepoError> {
        let uuid: Uuid = id.into();
        Ok(self
            .fetch_where("WHERE id = ?", Some(uuid.to_string()))
            .await?
            .into_iter()
            .next())
    }

    async fn list(&self) -> Result<Vec<T>, RepoError> {
        self.fetch_where("", None).await
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<T>, RepoError> {
        self.fetch_where("WHERE owner_id = ?", Some(owner.to_string()))
            .await
    }

    async fn list_by_parent(&self, parent: Uuid) -> Result<Vec<T>, RepoError> {
        self.fetch_where("WHERE parent_id = ?", Some(parent.to_string()))
            .await
    }

    async fn save(&self, record: &T) -> Result<(), RepoError> {
        let data = serde_json::to_string(record)?;
        let id: Uuid = record.id().into();
        let sql = format!(
            "INSERT INTO {} (id, owner_id, parent_id, data, updated_at) \
             VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP) \
             ON CONFLICT(id) DO UPDATE SET owner_id = excluded.owner_id, \
             parent_id = excluded.parent_id, data = excluded.data, updated_at = CURRENT_TIMESTAMP",
            T::TABLE
        );
        sqlx::query(&sql)
            .bind(id.to_string())
            .bind(record.owner().map(|o| o.to_string()))
            .bind(record.parent().map(|p| p.to_string()))
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: T::Id) -> Result<bool, RepoError> {
        let uuid: Uuid = id.into();
        let sql = format!("DELETE FROM {} WHERE id = ?", T::TABLE);
        let result = sqlx::query(&sql)
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Scene, World};
    use crate::domain::value_objects::AdventureId;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_and_upsert() {
        let store = SqliteStore::<World>::new(pool().await).await.unwrap();
        let mut world = World::new(UserId::new(), "Faerun", "Sword coast");
        store.save(&world).await.unwrap();

        world.description = "Updated".to_string();
        store.save(&world).await.unwrap();

        let loaded = store.get(world.id).await.unwrap().unwrap();
        assert_eq!(loaded, world);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_parent_index() {
        let store = SqliteStore::<Scene>::new(pool().await).await.unwrap();
        let owner = UserId::new();
        let adventure = AdventureId::new();
        store
            .save(&Scene::new(owner, adventure, "Opening", ""))
            .await
            .unwrap();
        store
            .save(&Scene::new(owner, AdventureId::new(), "Other", ""))
            .await
            .unwrap();

        let scenes = store.list_by_parent(adventure.into()).await.unwrap();
        assert_eq!(scenes.len(), 1);
        assert_eq!(store.list_by_owner(owner).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = SqliteStore::<World>::new(pool().await).await.unwrap();
        let world = World::new(UserId::new(), "Faerun", "");
        store.save(&world).await.unwrap();
        assert!(store.delete(world.id).await.unwrap());
        assert!(!store.delete(world.id).await.unwrap());
    }
}
