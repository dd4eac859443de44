use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::modules::storage::{Entity, EntityKind};

/// Place model - a rentable listing owned by a user inside a city
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub city_id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub number_rooms: i32,
    pub number_bathrooms: i32,
    pub max_guest: i32,
    pub price_by_night: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Linked amenities; lives in the `place_amenity` join table under `db` storage
    #[sqlx(skip)]
    #[serde(default)]
    pub amenity_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    pub fn new(city_id: String, user_id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            city_id,
            user_id,
            name,
            description: None,
            number_rooms: 0,
            number_bathrooms: 0,
            max_guest: 0,
            price_by_night: 0,
            latitude: None,
            longitude: None,
            amenity_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_amenity(&self, amenity_id: &str) -> bool {
        self.amenity_ids.iter().any(|id| id == amenity_id)
    }

    /// True when every id in `required` is linked to this place.
    pub fn has_all_amenities(&self, required: &HashSet<&str>) -> bool {
        required.iter().all(|id| self.has_amenity(id))
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for Place {
    const KIND: EntityKind = EntityKind::Place;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_place_defaults() {
        let place = Place::new("city".to_string(), "user".to_string(), "Loft".to_string());

        assert_eq!(place.name, "Loft");
        assert_eq!(place.number_rooms, 0);
        assert!(place.amenity_ids.is_empty());
        assert_eq!(place.created_at, place.updated_at);
        assert!(Uuid::parse_str(&place.id).is_ok());
    }

    #[test]
    fn test_has_all_amenities() {
        let mut place = Place::new("c".to_string(), "u".to_string(), "p".to_string());
        place.amenity_ids = vec!["wifi".to_string(), "pool".to_string()];

        assert!(place.has_all_amenities(&HashSet::from(["wifi"])));
        assert!(place.has_all_amenities(&HashSet::from(["wifi", "pool"])));
        assert!(place.has_all_amenities(&HashSet::new()));
        assert!(!place.has_all_amenities(&HashSet::from(["wifi", "sauna"])));
    }
}
