#[cfg(test)]
use chrono::Utc;
#[cfg(test)]
use fake::{
    faker::{address::en::CityName, address::en::StateName, company::en::CompanyName},
    faker::{internet::en::SafeEmail, lorem::en::Word, name::en::FirstName},
    Fake,
};
#[cfg(test)]
use uuid::Uuid;

#[cfg(test)]
use crate::features::places::models::{Amenity, City, Place, State, User};
#[cfg(test)]
use crate::modules::storage::{FileStorage, Repository, Storage};

#[cfg(test)]
pub fn state(name: &str) -> State {
    let now = Utc::now();
    State {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
pub fn random_state() -> State {
    state(&StateName().fake::<String>())
}

#[cfg(test)]
pub fn city(state_id: &str, name: &str) -> City {
    let now = Utc::now();
    City {
        id: Uuid::new_v4().to_string(),
        state_id: state_id.to_string(),
        name: name.to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
pub fn random_city(state_id: &str) -> City {
    city(state_id, &CityName().fake::<String>())
}

#[cfg(test)]
pub fn user() -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4().to_string(),
        email: SafeEmail().fake(),
        first_name: Some(FirstName().fake()),
        last_name: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
pub fn amenity(name: &str) -> Amenity {
    let now = Utc::now();
    Amenity {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
pub fn random_amenity() -> Amenity {
    amenity(&Word().fake::<String>())
}

#[cfg(test)]
pub fn place(city_id: &str, user_id: &str, amenity_ids: &[&str]) -> Place {
    let mut place = Place::new(
        city_id.to_string(),
        user_id.to_string(),
        CompanyName().fake(),
    );
    place.amenity_ids = amenity_ids.iter().map(|id| id.to_string()).collect();
    place
}

/// In-memory storage seeded with one state, two cities, a user and two amenities.
///
/// `first_city` holds a place linked to both amenities, `second_city` is empty.
#[cfg(test)]
pub struct Seeded {
    pub storage: Storage,
    pub state: State,
    pub first_city: City,
    pub second_city: City,
    pub user: User,
    pub amenities: Vec<Amenity>,
    pub place: Place,
}

#[cfg(test)]
pub async fn seeded_storage() -> Seeded {
    let backend = std::sync::Arc::new(FileStorage::in_memory());
    let state = random_state();
    let first_city = random_city(&state.id);
    let second_city = random_city(&state.id);
    let owner = user();
    let amenities = vec![random_amenity(), random_amenity()];
    let ids: Vec<&str> = amenities.iter().map(|a| a.id.as_str()).collect();
    let place = place(&first_city.id, &owner.id, &ids);

    backend.insert(state.clone()).await.unwrap();
    backend.insert(first_city.clone()).await.unwrap();
    backend.insert(second_city.clone()).await.unwrap();
    backend.insert(owner.clone()).await.unwrap();
    for amenity in &amenities {
        backend.insert(amenity.clone()).await.unwrap();
    }
    backend.insert(place.clone()).await.unwrap();

    Seeded {
        storage: Storage::new(backend),
        state,
        first_city,
        second_city,
        user: owner,
        amenities,
        place,
    }
}
