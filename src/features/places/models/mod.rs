mod amenity;
mod city;
mod place;
mod state;
mod user;

pub use amenity::Amenity;
pub use city::City;
pub use place::Place;
pub use state::State;
pub use user::User;
