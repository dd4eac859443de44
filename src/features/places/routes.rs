use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::places::handlers;
use crate::features::places::services::PlaceService;

/// Create routes for the places feature
pub fn routes(service: Arc<PlaceService>) -> Router {
    Router::new()
        // Places of a city
        .route(
            "/cities/{city_id}/places",
            get(handlers::list_places_by_city).post(handlers::create_place),
        )
        // Single place
        .route(
            "/places/{place_id}",
            get(handlers::get_place)
                .put(handlers::update_place)
                .delete(handlers::delete_place),
        )
        .route("/places_search", post(handlers::search_places))
        // Place <-> amenity links
        .route(
            "/places/{place_id}/amenities",
            get(handlers::list_place_amenities),
        )
        .route(
            "/places/{place_id}/amenities/{amenity_id}",
            post(handlers::link_place_amenity).delete(handlers::unlink_place_amenity),
        )
        .with_state(service)
}
