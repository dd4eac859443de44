use serde_json::Value;

use crate::core::error::{AppError, Result};
use crate::features::places::dtos::{
    AmenityResponseDto, CreatePlaceDto, PlaceResponseDto, PlaceSearchDto, UpdatePlaceDto,
};
use crate::features::places::models::{Amenity, City, Place};
use crate::features::places::services::search_filter::{
    PlaceSearchFilter, SearchAmenityPolicy, SearchCriteria,
};
use crate::modules::storage::Storage;

/// Whether linking an amenity created a new link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    AlreadyLinked,
}

/// Service for places and their links to cities, users and amenities
pub struct PlaceService {
    storage: Storage,
    search_policy: SearchAmenityPolicy,
}

impl std::fmt::Debug for PlaceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceService")
            .field("storage", &self.storage)
            .field("search_policy", &self.search_policy)
            .finish()
    }
}

impl PlaceService {
    pub fn new(storage: Storage, search_policy: SearchAmenityPolicy) -> Self {
        Self {
            storage,
            search_policy,
        }
    }

    async fn find_city(&self, city_id: &str) -> Result<City> {
        self.storage
            .cities
            .get(city_id)
            .await?
            .ok_or_else(AppError::not_found)
    }

    async fn find_place(&self, place_id: &str) -> Result<Place> {
        self.storage
            .places
            .get(place_id)
            .await?
            .ok_or_else(AppError::not_found)
    }

    async fn find_amenity(&self, amenity_id: &str) -> Result<Amenity> {
        self.storage
            .amenities
            .get(amenity_id)
            .await?
            .ok_or_else(AppError::not_found)
    }

    /// List the places of a city
    pub async fn list_by_city(&self, city_id: &str) -> Result<Vec<PlaceResponseDto>> {
        let city = self.find_city(city_id).await?;

        let places = self
            .storage
            .places
            .all()
            .await?
            .into_iter()
            .filter(|place| place.city_id == city.id)
            .map(PlaceResponseDto::from)
            .collect();

        Ok(places)
    }

    /// Get place by ID
    pub async fn get_by_id(&self, place_id: &str) -> Result<PlaceResponseDto> {
        Ok(self.find_place(place_id).await?.into())
    }

    pub async fn delete(&self, place_id: &str) -> Result<()> {
        if !self.storage.places.delete(place_id).await? {
            return Err(AppError::not_found());
        }
        self.storage.save().await?;

        tracing::info!("Deleted place {}", place_id);
        Ok(())
    }

    /// Create a place in `city_id` from a raw JSON payload.
    ///
    /// Payload problems are reported before the city and user lookups.
    pub async fn create(&self, city_id: &str, payload: Value) -> Result<PlaceResponseDto> {
        let dto = CreatePlaceDto::from_payload(payload)?;

        let city = self.find_city(city_id).await?;
        if self.storage.users.get(&dto.user_id).await?.is_none() {
            return Err(AppError::not_found());
        }

        let place = dto.into_place(city.id);
        self.storage.places.insert(place.clone()).await?;
        self.storage.save().await?;

        tracing::info!("Created place {} in city {}", place.id, place.city_id);
        Ok(place.into())
    }

    pub async fn update(&self, place_id: &str, payload: Value) -> Result<PlaceResponseDto> {
        let mut place = self.find_place(place_id).await?;

        let dto = UpdatePlaceDto::from_payload(payload)?;
        dto.apply(&mut place);

        self.storage.places.update(place.clone()).await?;
        self.storage.save().await?;

        Ok(place.into())
    }

    /// Search places by states, cities and amenities
    pub async fn search(&self, dto: PlaceSearchDto) -> Result<Vec<PlaceResponseDto>> {
        let criteria = SearchCriteria::from(dto);

        let places = self.storage.places.all().await?;
        let states = self.storage.states.all().await?;
        let cities = self.storage.cities.all().await?;
        let amenities = self.storage.amenities.all().await?;

        let filter = PlaceSearchFilter::new(&states, &cities, &amenities, self.search_policy);
        if filter.drops_amenity_filter(&criteria) {
            tracing::warn!(
                "Place search ignores {} amenity id(s) because a city or state filter matched",
                criteria.amenity_ids.len()
            );
        }

        let results = filter.search(places, &criteria);
        tracing::debug!("Place search matched {} place(s)", results.len());

        Ok(results.into_iter().map(PlaceResponseDto::from).collect())
    }

    /// List the amenities linked to a place
    pub async fn list_amenities(&self, place_id: &str) -> Result<Vec<AmenityResponseDto>> {
        let place = self.find_place(place_id).await?;

        let mut amenities = Vec::with_capacity(place.amenity_ids.len());
        for amenity_id in &place.amenity_ids {
            // Links to amenities deleted behind our back are skipped
            if let Some(amenity) = self.storage.amenities.get(amenity_id).await? {
                amenities.push(AmenityResponseDto::from(amenity));
            }
        }

        Ok(amenities)
    }

    pub async fn link_amenity(
        &self,
        place_id: &str,
        amenity_id: &str,
    ) -> Result<(AmenityResponseDto, LinkOutcome)> {
        let mut place = self.find_place(place_id).await?;
        let amenity = self.find_amenity(amenity_id).await?;

        if place.has_amenity(&amenity.id) {
            return Ok((amenity.into(), LinkOutcome::AlreadyLinked));
        }

        place.amenity_ids.push(amenity.id.clone());
        self.storage.places.update(place).await?;
        self.storage.save().await?;

        tracing::info!("Linked amenity {} to place {}", amenity_id, place_id);
        Ok((amenity.into(), LinkOutcome::Created))
    }

    pub async fn unlink_amenity(&self, place_id: &str, amenity_id: &str) -> Result<()> {
        let mut place = self.find_place(place_id).await?;
        let amenity = self.find_amenity(amenity_id).await?;

        if !place.has_amenity(&amenity.id) {
            return Err(AppError::not_found());
        }

        place.amenity_ids.retain(|id| id != &amenity.id);
        self.storage.places.update(place).await?;
        self.storage.save().await?;

        tracing::info!("Unlinked amenity {} from place {}", amenity_id, place_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::seeded_storage;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_by_city() {
        let seeded = seeded_storage().await;
        let service = PlaceService::new(seeded.storage.clone(), SearchAmenityPolicy::default());

        let places = service.list_by_city(&seeded.first_city.id).await.unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, seeded.place.id);

        let empty = service.list_by_city(&seeded.second_city.id).await.unwrap();
        assert!(empty.is_empty());

        let missing = service.list_by_city("missing").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_checks_city_then_user() {
        let seeded = seeded_storage().await;
        let service = PlaceService::new(seeded.storage.clone(), SearchAmenityPolicy::default());

        let result = service
            .create("missing", json!({"user_id": seeded.user.id, "name": "Loft"}))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = service
            .create(
                &seeded.second_city.id,
                json!({"user_id": "missing", "name": "Loft"}),
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        // Payload errors win over lookups
        let result = service.create("missing", json!({"name": "Loft"})).await;
        assert!(matches!(result, Err(AppError::BadRequest(ref m)) if m == "Missing user_id"));
    }

    #[tokio::test]
    async fn test_create_then_update_then_delete() {
        let seeded = seeded_storage().await;
        let service = PlaceService::new(seeded.storage.clone(), SearchAmenityPolicy::default());

        let created = service
            .create(
                &seeded.second_city.id,
                json!({"user_id": seeded.user.id, "name": "Cabin", "number_rooms": 2}),
            )
            .await
            .unwrap();
        assert_eq!(created.city_id, seeded.second_city.id);
        assert_eq!(created.number_rooms, 2);

        let updated = service
            .update(&created.id, json!({"name": "Big Cabin", "city_id": "elsewhere"}))
            .await
            .unwrap();
        assert_eq!(updated.name, "Big Cabin");
        assert_eq!(updated.city_id, seeded.second_city.id);
        assert_eq!(updated.created_at, created.created_at);

        service.delete(&created.id).await.unwrap();
        assert!(matches!(
            service.get_by_id(&created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(&created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_place_is_not_found_before_payload_check() {
        let seeded = seeded_storage().await;
        let service = PlaceService::new(seeded.storage, SearchAmenityPolicy::default());

        let result = service.update("missing", json!(null)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_by_state_and_amenity() {
        let seeded = seeded_storage().await;
        let service = PlaceService::new(seeded.storage.clone(), SearchAmenityPolicy::default());

        let by_state = service
            .search(PlaceSearchDto {
                states: Some(vec![seeded.state.id.clone()]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_state.len(), 1);

        let by_amenity = service
            .search(PlaceSearchDto {
                amenities: Some(vec![seeded.amenities[0].id.clone()]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_amenity.len(), 1);
        assert_eq!(by_amenity[0].id, seeded.place.id);
    }

    #[tokio::test]
    async fn test_link_and_unlink_amenity() {
        let seeded = seeded_storage().await;
        let service = PlaceService::new(seeded.storage.clone(), SearchAmenityPolicy::default());
        let fresh = service
            .create(
                &seeded.first_city.id,
                json!({"user_id": seeded.user.id, "name": "Studio"}),
            )
            .await
            .unwrap();
        let wifi = &seeded.amenities[0];

        let (_, outcome) = service.link_amenity(&fresh.id, &wifi.id).await.unwrap();
        assert_eq!(outcome, LinkOutcome::Created);
        let (_, outcome) = service.link_amenity(&fresh.id, &wifi.id).await.unwrap();
        assert_eq!(outcome, LinkOutcome::AlreadyLinked);

        let linked = service.list_amenities(&fresh.id).await.unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, wifi.id);

        service.unlink_amenity(&fresh.id, &wifi.id).await.unwrap();
        assert!(service.list_amenities(&fresh.id).await.unwrap().is_empty());
        assert!(matches!(
            service.unlink_amenity(&fresh.id, &wifi.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
