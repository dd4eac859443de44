pub mod place_service;
pub mod search_filter;

pub use place_service::{LinkOutcome, PlaceService};
pub use search_filter::{PlaceSearchFilter, SearchAmenityPolicy, SearchCriteria};
