use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppJsonRejection};
use crate::features::places::dtos::{
    AmenityResponseDto, CreatePlaceDto, PlaceResponseDto, PlaceSearchDto, UpdatePlaceDto,
};
use crate::features::places::services::{LinkOutcome, PlaceService};
use crate::shared::types::{EmptyObject, ErrorResponse};

// ==================== Place Handlers ====================

/// List all places of a city
#[utoipa::path(
    get,
    path = "/api/v1/cities/{city_id}/places",
    params(
        ("city_id" = String, Path, description = "City ID")
    ),
    responses(
        (status = 200, description = "Places of the city", body = Vec<PlaceResponseDto>),
        (status = 404, description = "City not found", body = ErrorResponse)
    ),
    tag = "places"
)]
pub async fn list_places_by_city(
    State(service): State<Arc<PlaceService>>,
    Path(city_id): Path<String>,
) -> Result<Json<Vec<PlaceResponseDto>>> {
    let places = service.list_by_city(&city_id).await?;
    Ok(Json(places))
}

/// Get a place by ID
#[utoipa::path(
    get,
    path = "/api/v1/places/{place_id}",
    params(
        ("place_id" = String, Path, description = "Place ID")
    ),
    responses(
        (status = 200, description = "Place details", body = PlaceResponseDto),
        (status = 404, description = "Place not found", body = ErrorResponse)
    ),
    tag = "places"
)]
pub async fn get_place(
    State(service): State<Arc<PlaceService>>,
    Path(place_id): Path<String>,
) -> Result<Json<PlaceResponseDto>> {
    let place = service.get_by_id(&place_id).await?;
    Ok(Json(place))
}

/// Delete a place
#[utoipa::path(
    delete,
    path = "/api/v1/places/{place_id}",
    params(
        ("place_id" = String, Path, description = "Place ID")
    ),
    responses(
        (status = 200, description = "Place deleted", body = EmptyObject),
        (status = 404, description = "Place not found", body = ErrorResponse)
    ),
    tag = "places"
)]
pub async fn delete_place(
    State(service): State<Arc<PlaceService>>,
    Path(place_id): Path<String>,
) -> Result<Json<EmptyObject>> {
    service.delete(&place_id).await?;
    Ok(Json(EmptyObject::default()))
}

/// Create a place in a city
#[utoipa::path(
    post,
    path = "/api/v1/cities/{city_id}/places",
    params(
        ("city_id" = String, Path, description = "City ID")
    ),
    request_body = CreatePlaceDto,
    responses(
        (status = 201, description = "Place created", body = PlaceResponseDto),
        (status = 400, description = "Not a JSON, missing user_id or name, invalid field", body = ErrorResponse),
        (status = 404, description = "City or user not found", body = ErrorResponse)
    ),
    tag = "places"
)]
pub async fn create_place(
    State(service): State<Arc<PlaceService>>,
    Path(city_id): Path<String>,
    AppJson(payload): AppJson<Value>,
) -> Result<(StatusCode, Json<PlaceResponseDto>)> {
    let place = service.create(&city_id, payload).await?;
    Ok((StatusCode::CREATED, Json(place)))
}

/// Update the writable fields of a place
#[utoipa::path(
    put,
    path = "/api/v1/places/{place_id}",
    params(
        ("place_id" = String, Path, description = "Place ID")
    ),
    request_body = UpdatePlaceDto,
    responses(
        (status = 200, description = "Place updated", body = PlaceResponseDto),
        (status = 400, description = "Not a JSON or invalid field", body = ErrorResponse),
        (status = 404, description = "Place not found", body = ErrorResponse),
        (status = 413, description = "Body over the size limit", body = ErrorResponse)
    ),
    tag = "places"
)]
pub async fn update_place(
    State(service): State<Arc<PlaceService>>,
    Path(place_id): Path<String>,
    body: std::result::Result<AppJson<Value>, AppJsonRejection>,
) -> Result<Json<PlaceResponseDto>> {
    // A missing place is reported before a body that is not JSON
    let payload = match body {
        Ok(AppJson(value)) => value,
        Err(rejection) if rejection.is_not_json() => Value::Null,
        Err(rejection) => return Err(rejection.into()),
    };
    let place = service.update(&place_id, payload).await?;
    Ok(Json(place))
}

/// Search places by states, cities and amenities
#[utoipa::path(
    post,
    path = "/api/v1/places_search",
    request_body = PlaceSearchDto,
    responses(
        (status = 200, description = "Matching places", body = Vec<PlaceResponseDto>),
        (status = 400, description = "Not a JSON", body = ErrorResponse)
    ),
    tag = "places"
)]
pub async fn search_places(
    State(service): State<Arc<PlaceService>>,
    AppJson(payload): AppJson<Value>,
) -> Result<Json<Vec<PlaceResponseDto>>> {
    let dto = PlaceSearchDto::from_payload(payload)?;
    let places = service.search(dto).await?;
    Ok(Json(places))
}

// ==================== Place Amenity Handlers ====================

/// List the amenities of a place
#[utoipa::path(
    get,
    path = "/api/v1/places/{place_id}/amenities",
    params(
        ("place_id" = String, Path, description = "Place ID")
    ),
    responses(
        (status = 200, description = "Amenities of the place", body = Vec<AmenityResponseDto>),
        (status = 404, description = "Place not found", body = ErrorResponse)
    ),
    tag = "places"
)]
pub async fn list_place_amenities(
    State(service): State<Arc<PlaceService>>,
    Path(place_id): Path<String>,
) -> Result<Json<Vec<AmenityResponseDto>>> {
    let amenities = service.list_amenities(&place_id).await?;
    Ok(Json(amenities))
}

/// Link an amenity to a place
#[utoipa::path(
    post,
    path = "/api/v1/places/{place_id}/amenities/{amenity_id}",
    params(
        ("place_id" = String, Path, description = "Place ID"),
        ("amenity_id" = String, Path, description = "Amenity ID")
    ),
    responses(
        (status = 200, description = "Amenity was already linked", body = AmenityResponseDto),
        (status = 201, description = "Amenity linked", body = AmenityResponseDto),
        (status = 404, description = "Place or amenity not found", body = ErrorResponse)
    ),
    tag = "places"
)]
pub async fn link_place_amenity(
    State(service): State<Arc<PlaceService>>,
    Path((place_id, amenity_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<AmenityResponseDto>)> {
    let (amenity, outcome) = service.link_amenity(&place_id, &amenity_id).await?;
    let status = match outcome {
        LinkOutcome::Created => StatusCode::CREATED,
        LinkOutcome::AlreadyLinked => StatusCode::OK,
    };
    Ok((status, Json(amenity)))
}

/// Unlink an amenity from a place
#[utoipa::path(
    delete,
    path = "/api/v1/places/{place_id}/amenities/{amenity_id}",
    params(
        ("place_id" = String, Path, description = "Place ID"),
        ("amenity_id" = String, Path, description = "Amenity ID")
    ),
    responses(
        (status = 200, description = "Amenity unlinked", body = EmptyObject),
        (status = 404, description = "Place or amenity not found, or not linked", body = ErrorResponse)
    ),
    tag = "places"
)]
pub async fn unlink_place_amenity(
    State(service): State<Arc<PlaceService>>,
    Path((place_id, amenity_id)): Path<(String, String)>,
) -> Result<Json<EmptyObject>> {
    service.unlink_amenity(&place_id, &amenity_id).await?;
    Ok(Json(EmptyObject::default()))
}
