use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::modules::storage::{Entity, EntityKind};

/// City model; its places are the places whose `city_id` points at it
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub state_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for City {
    const KIND: EntityKind = EntityKind::City;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
