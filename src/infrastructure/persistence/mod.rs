//! Persistence adapters
//!
//! Two interchangeable backends implement the record store port: SQLite for
//! deployments and an in-memory store for development and tests. The
//! backend is chosen at startup from configuration.

mod memory_store;
mod sqlite_store;

pub use memory_store::InMemoryStore;
pub use sqlite_store::SqliteStore;

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::application::ports::outbound::{Record, RecordStore, RepoError, Repository, Store};
use crate::domain::value_objects::UserId;
use crate::infrastructure::config::StorageConfig;

/// Enum wrapper for store backends to enable runtime selection
pub enum StoreBackend<T> {
    Memory(InMemoryStore<T>),
    Sqlite(SqliteStore<T>),
}

#[async_trait]
impl<T: Record> RecordStore<T> for StoreBackend<T> {
    async fn get(&self, id: T::Id) -> Result<Option<T>, RepoError> {
        match self {
            StoreBackend::Memory(s) => s.get(id).await,
            StoreBackend::Sqlite(s) => s.get(id).await,
        }
    }

    async fn list(&self) -> Result<Vec<T>, RepoError> {
        match self {
            StoreBackend::Memory(s) => s.list().await,
            StoreBackend::Sqlite(s) => s.list().await,
        }
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<T>, RepoError> {
        match self {
            StoreBackend::Memory(s) => s.list_by_owner(owner).await,
            StoreBackend::Sqlite(s) => s.list_by_owner(owner).await,
        }
    }

    async fn list_by_parent(&self, parent: Uuid) -> Result<Vec<T>, RepoError> {
        match self {
            StoreBackend::Memory(s) => s.list_by_parent(parent).await,
            StoreBackend::Sqlite(s) => s.list_by_parent(parent).await,
        }
    }

    async fn save(&self, record: &T) -> Result<(), RepoError> {
        match self {
            StoreBackend::Memory(s) => s.save(record).await,
            StoreBackend::Sqlite(s) => s.save(record).await,
        }
    }

    async fn delete(&self, id: T::Id) -> Result<bool, RepoError> {
        match self {
            StoreBackend::Memory(s) => s.delete(id).await,
            StoreBackend::Sqlite(s) => s.delete(id).await,
        }
    }
}

/// Store factory for creating record stores
pub struct StoreFactory {
    config: StorageConfig,
    sqlite_pool: Option<SqlitePool>,
}

impl StoreFactory {
    pub async fn new(config: StorageConfig) -> Result<Self> {
        let sqlite_pool = if config.backend == "sqlite" {
            let options = SqliteConnectOptions::from_str(&config.database_url)
                .context("Invalid VTT_DATABASE_URL")?
                .create_if_missing(true);

            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create database directory")?;
                }
            }

            let pool = SqlitePool::connect_with(options)
                .await
                .context("Failed to connect to SQLite database")?;
            tracing::info!("Connected to SQLite database: {}", config.database_url);
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            config,
            sqlite_pool,
        })
    }

    pub async fn create<T: Record>(&self) -> Result<Store<T>> {
        match self.config.backend.as_str() {
            "memory" => Ok(Arc::new(StoreBackend::Memory(InMemoryStore::<T>::new()))),
            "sqlite" => {
                let pool = self
                    .sqlite_pool
                    .as_ref()
                    .context("SQLite pool not initialized")?;
                let store = SqliteStore::<T>::new(pool.clone())
                    .await
                    .with_context(|| format!("Failed to prepare table {}", T::TABLE))?;
                Ok(Arc::new(StoreBackend::Sqlite(store)))
            }
            backend => anyhow::bail!("Unsupported storage backend: {}", backend),
        }
    }

    /// Build the full repository facade
    pub async fn repository(&self) -> Result<Repository> {
        Ok(Repository {
            worlds: self.create().await?,
            campaigns: self.create().await?,
            adventures: self.create().await?,
            scenes: self.create().await?,
            encounters: self.create().await?,
            stages: self.create().await?,
            assets: self.create().await?,
            game_sessions: self.create().await?,
            schedules: self.create().await?,
            audit_logs: self.create().await?,
            maintenance: self.create().await?,
        })
    }
}

/// Repository with every store held in memory
#[cfg(test)]
pub fn in_memory_repository() -> Repository {
    fn store<T: Record>() -> Store<T> {
        Arc::new(InMemoryStore::<T>::new())
    }

    Repository {
        worlds: store(),
        campaigns: store(),
        adventures: store(),
        scenes: store(),
        encounters: store(),
        stages: store(),
        assets: store(),
        game_sessions: store(),
        schedules: store(),
        audit_logs: store(),
        maintenance: store(),
    }
}
