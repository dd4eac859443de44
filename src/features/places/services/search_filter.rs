use std::collections::HashSet;
use std::str::FromStr;

use crate::features::places::models::{Amenity, City, Place, State};

/// How the amenity filter combines with a city/state filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchAmenityPolicy {
    /// Amenities only narrow the result when no city or state matched.
    #[default]
    IgnoreWithCities,
    /// Amenities always narrow the result.
    Always,
}

impl FromStr for SearchAmenityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore_with_cities" => Ok(Self::IgnoreWithCities),
            "always" => Ok(Self::Always),
            other => Err(format!(
                "PLACES_SEARCH_AMENITY_POLICY must be 'ignore_with_cities' or 'always', got '{}'",
                other
            )),
        }
    }
}

/// Candidate ids of a place search. Empty lists mean "no constraint".
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub state_ids: Vec<String>,
    pub city_ids: Vec<String>,
    pub amenity_ids: Vec<String>,
}

/// Filters already loaded places by state, city and amenity ids.
///
/// Ids that do not resolve to a known state, city or amenity are dropped before filtering.
pub struct PlaceSearchFilter<'a> {
    known_states: HashSet<&'a str>,
    cities: &'a [City],
    known_amenities: HashSet<&'a str>,
    policy: SearchAmenityPolicy,
}

impl<'a> PlaceSearchFilter<'a> {
    pub fn new(
        states: &'a [State],
        cities: &'a [City],
        amenities: &'a [Amenity],
        policy: SearchAmenityPolicy,
    ) -> Self {
        Self {
            known_states: states.iter().map(|s| s.id.as_str()).collect(),
            cities,
            known_amenities: amenities.iter().map(|a| a.id.as_str()).collect(),
            policy,
        }
    }

    /// Cities of the requested states, plus the requested cities that exist.
    pub fn target_cities(&self, criteria: &SearchCriteria) -> HashSet<&'a str> {
        let states: HashSet<&str> = criteria
            .state_ids
            .iter()
            .map(String::as_str)
            .filter(|id| self.known_states.contains(id))
            .collect();
        let requested: HashSet<&str> = criteria.city_ids.iter().map(String::as_str).collect();

        self.cities
            .iter()
            .filter(|city| {
                states.contains(city.state_id.as_str()) || requested.contains(city.id.as_str())
            })
            .map(|city| city.id.as_str())
            .collect()
    }

    fn required_amenities<'c>(&self, criteria: &'c SearchCriteria) -> HashSet<&'c str> {
        criteria
            .amenity_ids
            .iter()
            .map(String::as_str)
            .filter(|id| self.known_amenities.contains(id))
            .collect()
    }

    /// True when `criteria` carries an amenity filter that this policy will not apply.
    pub fn drops_amenity_filter(&self, criteria: &SearchCriteria) -> bool {
        self.policy == SearchAmenityPolicy::IgnoreWithCities
            && !criteria.amenity_ids.is_empty()
            && !self.target_cities(criteria).is_empty()
    }

    /// Places matching `criteria`, in the order they were given.
    pub fn search(&self, mut places: Vec<Place>, criteria: &SearchCriteria) -> Vec<Place> {
        let target_cities = self.target_cities(criteria);

        if !target_cities.is_empty() {
            places.retain(|place| target_cities.contains(place.city_id.as_str()));
            if self.policy == SearchAmenityPolicy::IgnoreWithCities {
                return places;
            }
        }

        if criteria.amenity_ids.is_empty() {
            return places;
        }

        // A place without amenities never satisfies an amenity filter
        let required = self.required_amenities(criteria);
        places.retain(|place| {
            !place.amenity_ids.is_empty() && place.has_all_amenities(&required)
        });
        places
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{amenity, city, place, state, user};

    struct World {
        states: Vec<State>,
        cities: Vec<City>,
        amenities: Vec<Amenity>,
        places: Vec<Place>,
        s1: String,
        s2: String,
        c1: String,
        c2: String,
        a1: String,
        a2: String,
        p1: String,
        p2: String,
        p3: String,
    }

    impl World {
        fn filter(&self, policy: SearchAmenityPolicy) -> PlaceSearchFilter<'_> {
            PlaceSearchFilter::new(&self.states, &self.cities, &self.amenities, policy)
        }
    }

    /// C1 (S1) holds P1 {A1, A2} and P2 {A2}; C2 (S2) holds P3 {}.
    fn world() -> World {
        let s1 = state("S1");
        let s2 = state("S2");
        let c1 = city(&s1.id, "C1");
        let c2 = city(&s2.id, "C2");
        let a1 = amenity("A1");
        let a2 = amenity("A2");
        let owner = user();
        let p1 = place(&c1.id, &owner.id, &[a1.id.as_str(), a2.id.as_str()]);
        let p2 = place(&c1.id, &owner.id, &[a2.id.as_str()]);
        let p3 = place(&c2.id, &owner.id, &[]);

        World {
            s1: s1.id.clone(),
            s2: s2.id.clone(),
            c1: c1.id.clone(),
            c2: c2.id.clone(),
            a1: a1.id.clone(),
            a2: a2.id.clone(),
            p1: p1.id.clone(),
            p2: p2.id.clone(),
            p3: p3.id.clone(),
            states: vec![s1, s2],
            cities: vec![c1, c2],
            amenities: vec![a1, a2],
            places: vec![p1, p2, p3],
        }
    }

    fn ids(places: &[Place]) -> Vec<&String> {
        places.iter().map(|p| &p.id).collect()
    }

    #[test]
    fn test_empty_criteria_returns_everything() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::default());

        let result = filter.search(w.places.clone(), &SearchCriteria::default());

        assert_eq!(ids(&result), vec![&w.p1, &w.p2, &w.p3]);
    }

    #[test]
    fn test_state_expands_to_its_cities() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::default());
        let criteria = SearchCriteria {
            state_ids: vec![w.s1.clone()],
            ..Default::default()
        };

        let result = filter.search(w.places.clone(), &criteria);

        assert_eq!(ids(&result), vec![&w.p1, &w.p2]);
        assert!(result.iter().all(|p| p.city_id == w.c1));
    }

    #[test]
    fn test_state_and_city_are_unioned() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::default());
        let criteria = SearchCriteria {
            state_ids: vec![w.s1.clone()],
            city_ids: vec![w.c2.clone()],
            ..Default::default()
        };

        let result = filter.search(w.places.clone(), &criteria);

        assert_eq!(ids(&result), vec![&w.p1, &w.p2, &w.p3]);
    }

    #[test]
    fn test_both_states_cover_every_city() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::default());
        let criteria = SearchCriteria {
            state_ids: vec![w.s1.clone(), w.s2.clone()],
            ..Default::default()
        };

        let targets = filter.target_cities(&criteria);

        assert_eq!(targets, HashSet::from([w.c1.as_str(), w.c2.as_str()]));
    }

    #[test]
    fn test_unknown_city_ids_are_ignored() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::default());
        let criteria = SearchCriteria {
            city_ids: vec!["no-such-city".to_string()],
            ..Default::default()
        };

        // Nothing resolves, so the search falls back to the unfiltered set
        let result = filter.search(w.places.clone(), &criteria);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_unknown_state_matches_nothing_but_does_not_error() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::default());
        let criteria = SearchCriteria {
            state_ids: vec!["no-such-state".to_string()],
            ..Default::default()
        };

        assert!(filter.target_cities(&criteria).is_empty());
        assert_eq!(filter.search(w.places.clone(), &criteria).len(), 3);
    }

    #[test]
    fn test_amenities_without_city_filter_require_superset() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::default());
        let criteria = SearchCriteria {
            amenity_ids: vec![w.a1.clone()],
            ..Default::default()
        };

        let result = filter.search(w.places.clone(), &criteria);

        assert_eq!(ids(&result), vec![&w.p1]);
        let required = HashSet::from([w.a1.as_str()]);
        assert!(result.iter().all(|place| place.has_all_amenities(&required)));
    }

    #[test]
    fn test_unknown_amenity_ids_are_dropped() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::default());
        let criteria = SearchCriteria {
            amenity_ids: vec![w.a2.clone(), "no-such-amenity".to_string()],
            ..Default::default()
        };

        let result = filter.search(w.places.clone(), &criteria);

        assert_eq!(ids(&result), vec![&w.p1, &w.p2]);
    }

    #[test]
    fn test_only_unknown_amenities_still_exclude_bare_places() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::default());
        let criteria = SearchCriteria {
            amenity_ids: vec!["ghost".to_string()],
            ..Default::default()
        };

        let result = filter.search(w.places.clone(), &criteria);

        assert_eq!(ids(&result), vec![&w.p1, &w.p2]);
        assert!(result.iter().all(|p| p.id != w.p3));
    }

    #[test]
    fn test_always_policy_excludes_bare_places_in_city_branch() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::Always);
        let criteria = SearchCriteria {
            city_ids: vec![w.c2.clone()],
            amenity_ids: vec!["ghost".to_string()],
            ..Default::default()
        };

        assert!(filter.search(w.places.clone(), &criteria).is_empty());
    }

    #[test]
    fn test_cities_of_unknown_states_are_not_targeted() {
        let w = world();
        let mut cities = w.cities.clone();
        let orphan = city("no-such-state", "Orphan");
        cities.push(orphan.clone());
        let filter = PlaceSearchFilter::new(
            &w.states,
            &cities,
            &w.amenities,
            SearchAmenityPolicy::default(),
        );
        let criteria = SearchCriteria {
            state_ids: vec!["no-such-state".to_string(), w.s2.clone()],
            ..Default::default()
        };

        let targets = filter.target_cities(&criteria);

        assert_eq!(targets, HashSet::from([w.c2.as_str()]));
        assert!(!targets.contains(orphan.id.as_str()));
    }

    #[test]
    fn test_amenities_ignored_when_cities_match_by_default() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::default());
        let criteria = SearchCriteria {
            city_ids: vec![w.c1.clone()],
            amenity_ids: vec![w.a1.clone()],
            ..Default::default()
        };

        assert!(filter.drops_amenity_filter(&criteria));
        let result = filter.search(w.places.clone(), &criteria);
        assert_eq!(ids(&result), vec![&w.p1, &w.p2]);
    }

    #[test]
    fn test_always_policy_applies_amenities_with_cities() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::Always);
        let criteria = SearchCriteria {
            city_ids: vec![w.c1.clone()],
            amenity_ids: vec![w.a1.clone()],
            ..Default::default()
        };

        assert!(!filter.drops_amenity_filter(&criteria));
        let result = filter.search(w.places.clone(), &criteria);
        assert_eq!(ids(&result), vec![&w.p1]);
    }

    #[test]
    fn test_search_is_idempotent() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::Always);
        let criteria = SearchCriteria {
            state_ids: vec![w.s1.clone(), w.s2.clone()],
            amenity_ids: vec![w.a2.clone()],
            ..Default::default()
        };

        let first = filter.search(w.places.clone(), &criteria);
        let second = filter.search(w.places.clone(), &criteria);

        assert_eq!(ids(&first), ids(&second));
        assert_eq!(ids(&first), vec![&w.p1, &w.p2]);
    }

    #[test]
    fn test_empty_place_set_yields_empty_result() {
        let w = world();
        let filter = w.filter(SearchAmenityPolicy::default());
        let criteria = SearchCriteria {
            state_ids: vec![w.s1.clone()],
            amenity_ids: vec![w.a1.clone()],
            ..Default::default()
        };

        assert!(filter.search(Vec::new(), &criteria).is_empty());
        assert!(filter.search(Vec::new(), &SearchCriteria::default()).is_empty());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "always".parse::<SearchAmenityPolicy>(),
            Ok(SearchAmenityPolicy::Always)
        );
        assert_eq!(
            "IGNORE_WITH_CITIES".parse::<SearchAmenityPolicy>(),
            Ok(SearchAmenityPolicy::IgnoreWithCities)
        );
        assert!("sometimes".parse::<SearchAmenityPolicy>().is_err());
    }
}
