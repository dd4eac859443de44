pub mod place_dto;

pub use place_dto::{
    AmenityResponseDto, CreatePlaceDto, PlaceResponseDto, PlaceSearchDto, UpdatePlaceDto,
};
