use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};

use super::{Entity, Repository, StorageEngine, StorageKind, StorageResult};
use crate::features::places::models::{Amenity, City, Place, State, User};

/// Table mapping for an entity stored in PostgreSQL.
///
/// `COLUMNS` must list `id` first and match the order of `push_values`.
#[async_trait]
trait PgEntity: Entity + for<'r> FromRow<'r, PgRow> + Unpin {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>);

    /// Fill in data living outside the entity's own table.
    async fn load_relations(_pool: &PgPool, rows: Vec<Self>) -> Result<Vec<Self>, sqlx::Error> {
        Ok(rows)
    }

    /// Write data living outside the entity's own table, inside the entity's transaction.
    async fn save_relations(&self, _conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        Ok(())
    }
}

#[async_trait]
impl PgEntity for State {
    const TABLE: &'static str = "states";
    const COLUMNS: &'static [&'static str] = &["id", "name", "created_at", "updated_at"];

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.id.clone())
            .push_bind(self.name.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

#[async_trait]
impl PgEntity for City {
    const TABLE: &'static str = "cities";
    const COLUMNS: &'static [&'static str] =
        &["id", "state_id", "name", "created_at", "updated_at"];

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.id.clone())
            .push_bind(self.state_id.clone())
            .push_bind(self.name.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

#[async_trait]
impl PgEntity for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "email",
        "first_name",
        "last_name",
        "created_at",
        "updated_at",
    ];

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.id.clone())
            .push_bind(self.email.clone())
            .push_bind(self.first_name.clone())
            .push_bind(self.last_name.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

#[async_trait]
impl PgEntity for Amenity {
    const TABLE: &'static str = "amenities";
    const COLUMNS: &'static [&'static str] = &["id", "name", "created_at", "updated_at"];

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.id.clone())
            .push_bind(self.name.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

#[async_trait]
impl PgEntity for Place {
    const TABLE: &'static str = "places";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "city_id",
        "user_id",
        "name",
        "description",
        "number_rooms",
        "number_bathrooms",
        "max_guest",
        "price_by_night",
        "latitude",
        "longitude",
        "created_at",
        "updated_at",
    ];

    fn push_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.id.clone())
            .push_bind(self.city_id.clone())
            .push_bind(self.user_id.clone())
            .push_bind(self.name.clone())
            .push_bind(self.description.clone())
            .push_bind(self.number_rooms)
            .push_bind(self.number_bathrooms)
            .push_bind(self.max_guest)
            .push_bind(self.price_by_night)
            .push_bind(self.latitude)
            .push_bind(self.longitude)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }

    async fn load_relations(pool: &PgPool, mut rows: Vec<Self>) -> Result<Vec<Self>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(rows);
        }

        let place_ids: Vec<String> = rows.iter().map(|p| p.id.clone()).collect();
        let links = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT place_id, amenity_id
            FROM place_amenity
            WHERE place_id = ANY($1)
            ORDER BY amenity_id ASC
            "#,
        )
        .bind(&place_ids)
        .fetch_all(pool)
        .await?;

        let mut by_place: HashMap<String, Vec<String>> = HashMap::new();
        for (place_id, amenity_id) in links {
            by_place.entry(place_id).or_default().push(amenity_id);
        }
        for place in rows.iter_mut() {
            place.amenity_ids = by_place.remove(&place.id).unwrap_or_default();
        }

        Ok(rows)
    }

    async fn save_relations(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM place_amenity WHERE place_id = $1")
            .bind(&self.id)
            .execute(&mut *conn)
            .await?;

        if self.amenity_ids.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO place_amenity (place_id, amenity_id) ",
        );
        builder.push_values(self.amenity_ids.iter(), |mut row, amenity_id| {
            row.push_bind(self.id.clone()).push_bind(amenity_id.clone());
        });
        builder.build().execute(&mut *conn).await?;

        Ok(())
    }
}

/// PostgreSQL-backed storage; every write is committed immediately.
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write<E: PgEntity>(&self, entity: &E, upsert: bool) -> StorageResult<()> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            E::TABLE,
            E::COLUMNS.join(", ")
        ));
        {
            let mut row = builder.separated(", ");
            entity.push_values(&mut row);
        }
        builder.push(")");

        if upsert {
            let assignments: Vec<String> = E::COLUMNS
                .iter()
                .filter(|column| !matches!(**column, "id" | "created_at"))
                .map(|column| format!("{column} = EXCLUDED.{column}"))
                .collect();
            builder.push(format!(
                " ON CONFLICT (id) DO UPDATE SET {}",
                assignments.join(", ")
            ));
        }

        let mut tx = self.pool.begin().await?;
        builder.build().execute(&mut *tx).await?;
        entity.save_relations(&mut *tx).await?;
        tx.commit().await?;

        Ok(())
    }
}

impl std::fmt::Debug for PgStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStorage")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

#[async_trait]
impl<E: PgEntity> Repository<E> for PgStorage {
    async fn get(&self, id: &str) -> StorageResult<Option<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            E::COLUMNS.join(", "),
            E::TABLE
        );
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch {} {}: {:?}", E::KIND, id, e);
                e
            })?;

        match row {
            Some(entity) => Ok(E::load_relations(&self.pool, vec![entity]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn all(&self) -> StorageResult<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at ASC, id ASC",
            E::COLUMNS.join(", "),
            E::TABLE
        );
        let rows = sqlx::query_as::<_, E>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list {}: {:?}", E::KIND, e);
                e
            })?;

        Ok(E::load_relations(&self.pool, rows).await?)
    }

    async fn insert(&self, entity: E) -> StorageResult<()> {
        self.write(&entity, false).await
    }

    async fn update(&self, entity: E) -> StorageResult<()> {
        self.write(&entity, true).await
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StorageEngine for PgStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::Db
    }

    async fn save(&self) -> StorageResult<()> {
        // Writes commit as they happen
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
        Ok(())
    }
}
