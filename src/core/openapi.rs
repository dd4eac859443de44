use utoipa::{Modify, OpenApi};

use crate::features::places::{dtos as places_dtos, handlers as places_handlers};
use crate::shared::types::{EmptyObject, ErrorResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Places
        places_handlers::list_places_by_city,
        places_handlers::get_place,
        places_handlers::delete_place,
        places_handlers::create_place,
        places_handlers::update_place,
        places_handlers::search_places,
        // Place amenities
        places_handlers::list_place_amenities,
        places_handlers::link_place_amenity,
        places_handlers::unlink_place_amenity,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            EmptyObject,
            // Places
            places_dtos::CreatePlaceDto,
            places_dtos::UpdatePlaceDto,
            places_dtos::PlaceSearchDto,
            places_dtos::PlaceResponseDto,
            places_dtos::AmenityResponseDto,
        )
    ),
    tags(
        (name = "places", description = "Places of a city, place search and place amenities"),
    ),
    info(
        title = "Places API",
        version = "0.1.0",
        description = "API documentation for the places service",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_place_routes() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Places".to_string(),
            version: "1.2.3".to_string(),
            description: "test".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.version, "1.2.3");
        for path in [
            "/api/v1/cities/{city_id}/places",
            "/api/v1/places/{place_id}",
            "/api/v1/places_search",
            "/api/v1/places/{place_id}/amenities/{amenity_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
