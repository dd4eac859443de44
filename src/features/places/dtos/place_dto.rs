use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::NOT_A_JSON;
use crate::features::places::models::{Amenity, Place};
use crate::features::places::services::SearchCriteria;

/// Keys a client may send back but never overwrite
pub const PROTECTED_FIELDS: [&str; 6] = [
    "id",
    "city_id",
    "user_id",
    "created_at",
    "updated_at",
    "__class__",
];

/// Only non-empty JSON objects count as a payload.
fn payload_object(payload: Value) -> Result<Map<String, Value>> {
    match payload {
        Value::Object(map) if !map.is_empty() => Ok(map),
        _ => Err(AppError::BadRequest(NOT_A_JSON.to_string())),
    }
}

fn decode<T: serde::de::DeserializeOwned + Validate>(object: Map<String, Value>) -> Result<T> {
    let dto: T = serde_json::from_value(Value::Object(object))
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON data: {}", e)))?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(dto)
}

// Create request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePlaceDto {
    pub user_id: String,

    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(length(max = 1024))]
    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub number_rooms: Option<i32>,

    #[validate(range(min = 0))]
    pub number_bathrooms: Option<i32>,

    #[validate(range(min = 0))]
    pub max_guest: Option<i32>,

    #[validate(range(min = 0))]
    pub price_by_night: Option<i32>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl CreatePlaceDto {
    /// Checks run in order: JSON object, `user_id`, `name`, then field types and ranges.
    pub fn from_payload(payload: Value) -> Result<Self> {
        let object = payload_object(payload)?;
        if !object.contains_key("user_id") {
            return Err(AppError::BadRequest("Missing user_id".to_string()));
        }
        if !object.contains_key("name") {
            return Err(AppError::BadRequest("Missing name".to_string()));
        }
        decode(object)
    }

    pub fn into_place(self, city_id: String) -> Place {
        let mut place = Place::new(city_id, self.user_id, self.name);
        place.description = self.description;
        place.number_rooms = self.number_rooms.unwrap_or_default();
        place.number_bathrooms = self.number_bathrooms.unwrap_or_default();
        place.max_guest = self.max_guest.unwrap_or_default();
        place.price_by_night = self.price_by_night.unwrap_or_default();
        place.latitude = self.latitude;
        place.longitude = self.longitude;
        place
    }
}

// Update request; only these fields are writable
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdatePlaceDto {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    #[validate(length(max = 1024))]
    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub number_rooms: Option<i32>,

    #[validate(range(min = 0))]
    pub number_bathrooms: Option<i32>,

    #[validate(range(min = 0))]
    pub max_guest: Option<i32>,

    #[validate(range(min = 0))]
    pub price_by_night: Option<i32>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl UpdatePlaceDto {
    /// Strips [`PROTECTED_FIELDS`], then rejects any key outside the writable set.
    pub fn from_payload(payload: Value) -> Result<Self> {
        let mut object = payload_object(payload)?;
        for key in PROTECTED_FIELDS {
            object.remove(key);
        }
        decode(object)
    }

    pub fn apply(self, place: &mut Place) {
        if let Some(name) = self.name {
            place.name = name;
        }
        if let Some(description) = self.description {
            place.description = Some(description);
        }
        if let Some(number_rooms) = self.number_rooms {
            place.number_rooms = number_rooms;
        }
        if let Some(number_bathrooms) = self.number_bathrooms {
            place.number_bathrooms = number_bathrooms;
        }
        if let Some(max_guest) = self.max_guest {
            place.max_guest = max_guest;
        }
        if let Some(price_by_night) = self.price_by_night {
            place.price_by_night = price_by_night;
        }
        if let Some(latitude) = self.latitude {
            place.latitude = Some(latitude);
        }
        if let Some(longitude) = self.longitude {
            place.longitude = Some(longitude);
        }
        place.touch();
    }
}

/// Body of `POST /places_search`; every list is optional
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PlaceSearchDto {
    pub states: Option<Vec<String>>,
    pub cities: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
}

impl PlaceSearchDto {
    /// A `null` body is not a search request; `{}` is the empty search.
    pub fn from_payload(payload: Value) -> Result<Self> {
        if payload.is_null() {
            return Err(AppError::BadRequest(NOT_A_JSON.to_string()));
        }
        serde_json::from_value(payload)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON data: {}", e)))
    }
}

impl From<PlaceSearchDto> for SearchCriteria {
    fn from(dto: PlaceSearchDto) -> Self {
        Self {
            state_ids: dto.states.unwrap_or_default(),
            city_ids: dto.cities.unwrap_or_default(),
            amenity_ids: dto.amenities.unwrap_or_default(),
        }
    }
}

// Response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceResponseDto {
    #[serde(rename = "__class__")]
    pub class: String,
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
    pub amenity_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Place> for PlaceResponseDto {
    fn from(p: Place) -> Self {
        Self {
            class: "Place".to_string(),
            id: p.id,
            city_id: p.city_id,
            user_id: p.user_id,
            name: p.name,
            description: p.description,
            number_rooms: p.number_rooms,
            number_bathrooms: p.number_bathrooms,
            max_guest: p.max_guest,
            price_by_night: p.price_by_night,
            latitude: p.latitude,
            longitude: p.longitude,
            amenity_ids: p.amenity_ids,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AmenityResponseDto {
    #[serde(rename = "__class__")]
    pub class: String,
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Amenity> for AmenityResponseDto {
    fn from(a: Amenity) -> Self {
        Self {
            class: "Amenity".to_string(),
            id: a.id,
            name: a.name,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
