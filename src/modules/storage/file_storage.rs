use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use super::{
    Entity, EntityKind, Repository, StorageEngine, StorageError, StorageKind, StorageResult,
};
use crate::features::places::models::{Amenity, City, Place, State, User};

#[derive(Debug, Default)]
struct Objects {
    states: HashMap<String, State>,
    cities: HashMap<String, City>,
    users: HashMap<String, User>,
    amenities: HashMap<String, Amenity>,
    places: HashMap<String, Place>,
}

/// Gives the generic repository implementation access to the map of one entity type.
trait FileTable: Entity {
    fn table(objects: &Objects) -> &HashMap<String, Self>;

    fn table_mut(objects: &mut Objects) -> &mut HashMap<String, Self>;
}

macro_rules! file_table {
    ($entity:ty, $field:ident) => {
        impl FileTable for $entity {
            fn table(objects: &Objects) -> &HashMap<String, Self> {
                &objects.$field
            }

            fn table_mut(objects: &mut Objects) -> &mut HashMap<String, Self> {
                &mut objects.$field
            }
        }
    };
}

file_table!(State, states);
file_table!(City, cities);
file_table!(User, users);
file_table!(Amenity, amenities);
file_table!(Place, places);

/// In-memory object store, serialized as one JSON document keyed `"<Kind>.<id>"`.
///
/// Without a path (see [`FileStorage::in_memory`]) `save()` only keeps changes in memory.
pub struct FileStorage {
    path: Option<PathBuf>,
    objects: RwLock<Objects>,
    /// Held across encode, write and rename; the temp file is shared
    save_lock: Mutex<()>,
}

impl FileStorage {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            objects: RwLock::new(Objects::default()),
            save_lock: Mutex::new(()),
        }
    }

    /// Open the store at `path`, reloading any objects saved there before.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let objects = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let document: BTreeMap<String, Value> = serde_json::from_slice(&bytes)?;
                let objects = Self::decode(document)?;
                tracing::info!(
                    "Reloaded {} places from {}",
                    objects.places.len(),
                    path.display()
                );
                objects
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No storage file at {}, starting empty", path.display());
                Objects::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: Some(path),
            objects: RwLock::new(objects),
            save_lock: Mutex::new(()),
        })
    }

    fn decode(document: BTreeMap<String, Value>) -> StorageResult<Objects> {
        let mut objects = Objects::default();
        for (key, value) in document {
            let (kind, id) = key
                .split_once('.')
                .ok_or_else(|| StorageError::Corrupted(format!("malformed key '{}'", key)))?;
            match kind.parse::<EntityKind>()? {
                EntityKind::State => load_into::<State>(&mut objects, id, value)?,
                EntityKind::City => load_into::<City>(&mut objects, id, value)?,
                EntityKind::User => load_into::<User>(&mut objects, id, value)?,
                EntityKind::Amenity => load_into::<Amenity>(&mut objects, id, value)?,
                EntityKind::Place => load_into::<Place>(&mut objects, id, value)?,
            }
        }
        Ok(objects)
    }

    fn encode(objects: &Objects) -> StorageResult<BTreeMap<String, Value>> {
        let mut document = BTreeMap::new();
        dump_from::<State>(objects, &mut document)?;
        dump_from::<City>(objects, &mut document)?;
        dump_from::<User>(objects, &mut document)?;
        dump_from::<Amenity>(objects, &mut document)?;
        dump_from::<Place>(objects, &mut document)?;
        Ok(document)
    }
}

fn load_into<E: FileTable>(objects: &mut Objects, id: &str, value: Value) -> StorageResult<()> {
    let entity: E = serde_json::from_value(value)?;
    if entity.id() != id {
        return Err(StorageError::Corrupted(format!(
            "key {}.{} holds object with id {}",
            E::KIND,
            id,
            entity.id()
        )));
    }
    E::table_mut(objects).insert(id.to_string(), entity);
    Ok(())
}

fn dump_from<E: FileTable>(
    objects: &Objects,
    document: &mut BTreeMap<String, Value>,
) -> StorageResult<()> {
    for (id, entity) in E::table(objects) {
        let mut value = serde_json::to_value(entity)?;
        if let Value::Object(ref mut map) = value {
            map.insert(
                "__class__".to_string(),
                Value::String(E::KIND.as_str().to_string()),
            );
        }
        document.insert(format!("{}.{}", E::KIND, id), value);
    }
    Ok(())
}

#[async_trait]
impl<E: FileTable> Repository<E> for FileStorage {
    async fn get(&self, id: &str) -> StorageResult<Option<E>> {
        let objects = self.objects.read().await;
        Ok(E::table(&objects).get(id).cloned())
    }

    async fn all(&self) -> StorageResult<Vec<E>> {
        let objects = self.objects.read().await;
        let mut entities: Vec<E> = E::table(&objects).values().cloned().collect();
        entities.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(entities)
    }

    async fn insert(&self, entity: E) -> StorageResult<()> {
        let mut objects = self.objects.write().await;
        E::table_mut(&mut objects).insert(entity.id().to_string(), entity);
        Ok(())
    }

    async fn update(&self, entity: E) -> StorageResult<()> {
        Repository::<E>::insert(self, entity).await
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let mut objects = self.objects.write().await;
        Ok(E::table_mut(&mut objects).remove(id).is_some())
    }
}

#[async_trait]
impl StorageEngine for FileStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::File
    }

    async fn save(&self) -> StorageResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let _guard = self.save_lock.lock().await;

        let bytes = {
            let objects = self.objects.read().await;
            serde_json::to_vec(&Self::encode(&objects)?)?
        };

        // Write next to the target and rename so a crash never leaves half a file
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        tracing::debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        self.save().await
    }
}
