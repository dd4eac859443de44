//! Storage module - typed repositories over the configured storage engine
//!
//! Every entity type gets its own [`Repository`], and all of them are bundled in a
//! cloneable [`Storage`] handle that the application builds once and injects into
//! services. Two engines exist:
//!
//! - [`FileStorage`]: objects kept in memory, flushed to a JSON file on `save()`
//! - [`PgStorage`]: PostgreSQL through a `sqlx` connection pool

mod file_storage;
mod pg_storage;

pub use file_storage::FileStorage;
pub use pg_storage::PgStorage;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::features::places::models::{Amenity, City, Place, State, User};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupted storage: {0}")]
    Corrupted(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Entity type names, as they appear in file storage keys (`"Place.<id>"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    State,
    City,
    User,
    Amenity,
    Place,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::State => "State",
            EntityKind::City => "City",
            EntityKind::User => "User",
            EntityKind::Amenity => "Amenity",
            EntityKind::Place => "Place",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "State" => Ok(EntityKind::State),
            "City" => Ok(EntityKind::City),
            "User" => Ok(EntityKind::User),
            "Amenity" => Ok(EntityKind::Amenity),
            "Place" => Ok(EntityKind::Place),
            other => Err(StorageError::Corrupted(format!(
                "unknown entity kind '{}'",
                other
            ))),
        }
    }
}

/// A persisted record type.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;
}

/// Typed access to the stored records of one entity type.
///
/// `all()` returns records ordered by creation time, then id, so repeated reads of
/// unchanged data are identical.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn get(&self, id: &str) -> StorageResult<Option<E>>;

    async fn all(&self) -> StorageResult<Vec<E>>;

    async fn insert(&self, entity: E) -> StorageResult<()>;

    async fn update(&self, entity: E) -> StorageResult<()>;

    /// Returns `false` when no record had this id.
    async fn delete(&self, id: &str) -> StorageResult<bool>;
}

/// Engine-wide lifecycle operations.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    fn kind(&self) -> StorageKind;

    /// Make every pending change durable.
    async fn save(&self) -> StorageResult<()>;

    async fn close(&self) -> StorageResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    File,
    Db,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" | "" => Ok(StorageKind::File),
            "db" => Ok(StorageKind::Db),
            other => Err(format!(
                "HBNB_TYPE_STORAGE must be 'file' or 'db', got '{}'",
                other
            )),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::File => f.write_str("file"),
            StorageKind::Db => f.write_str("db"),
        }
    }
}

/// Handle to every repository of one storage engine.
#[derive(Clone)]
pub struct Storage {
    pub states: Arc<dyn Repository<State>>,
    pub cities: Arc<dyn Repository<City>>,
    pub users: Arc<dyn Repository<User>>,
    pub amenities: Arc<dyn Repository<Amenity>>,
    pub places: Arc<dyn Repository<Place>>,
    engine: Arc<dyn StorageEngine>,
}

impl Storage {
    pub fn new<B>(backend: Arc<B>) -> Self
    where
        B: StorageEngine
            + Repository<State>
            + Repository<City>
            + Repository<User>
            + Repository<Amenity>
            + Repository<Place>
            + 'static,
    {
        Self {
            states: backend.clone(),
            cities: backend.clone(),
            users: backend.clone(),
            amenities: backend.clone(),
            places: backend.clone(),
            engine: backend,
        }
    }

    pub fn kind(&self) -> StorageKind {
        self.engine.kind()
    }

    pub async fn save(&self) -> StorageResult<()> {
        self.engine.save().await
    }

    pub async fn close(&self) -> StorageResult<()> {
        self.engine.close().await
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("kind", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_parsing() {
        assert_eq!("file".parse::<StorageKind>(), Ok(StorageKind::File));
        assert_eq!("DB".parse::<StorageKind>(), Ok(StorageKind::Db));
        assert_eq!("".parse::<StorageKind>(), Ok(StorageKind::File));
        assert!("redis".parse::<StorageKind>().is_err());
    }

    #[test]
    fn test_entity_kind_round_trip_names() {
        for kind in [
            EntityKind::State,
            EntityKind::City,
            EntityKind::User,
            EntityKind::Amenity,
            EntityKind::Place,
        ] {
            assert_eq!(kind.as_str().parse::<EntityKind>().ok(), Some(kind));
        }
        assert!("Review".parse::<EntityKind>().is_err());
    }
}
