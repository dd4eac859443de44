//! Places feature.
//!
//! Places belong to a city and an owner (user) and may be linked to any
//! number of amenities. Cities, states, users and amenities are read-only
//! here; they are only looked up to validate places and to resolve searches.
//!
//! ## Endpoints
//!
//! All paths are mounted under `/api/v1`.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/cities/{city_id}/places` | List places of a city |
//! | POST | `/cities/{city_id}/places` | Create a place in a city |
//! | GET | `/places/{place_id}` | Get place by ID |
//! | PUT | `/places/{place_id}` | Update the writable fields of a place |
//! | DELETE | `/places/{place_id}` | Delete a place |
//! | POST | `/places_search` | Search places by states, cities and amenities |
//! | GET | `/places/{place_id}/amenities` | List amenities of a place |
//! | POST | `/places/{place_id}/amenities/{amenity_id}` | Link an amenity |
//! | DELETE | `/places/{place_id}/amenities/{amenity_id}` | Unlink an amenity |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::PlaceService;
