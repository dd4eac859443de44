use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::modules::storage::{Entity, EntityKind};

/// State grouping cities, used by place search to expand state ids into city ids
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct State {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for State {
    const KIND: EntityKind = EntityKind::State;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
