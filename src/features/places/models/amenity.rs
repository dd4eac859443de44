use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::modules::storage::{Entity, EntityKind};

/// Amenity model (wifi, pool, ...), linked many-to-many with places
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Amenity {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Amenity {
    const KIND: EntityKind = EntityKind::Amenity;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
