//! Pure filtering over the in-memory catalog.

use crate::models::Tour;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel accepted wherever a facet can be left unconstrained.
pub const ANY: &str = "all";

/// One facet constraint: either unconstrained or an exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Facet {
    #[default]
    Any,
    Is(String),
}

impl Facet {
    pub fn is(value: impl Into<String>) -> Self {
        Facet::from(value.into())
    }

    /// Equality match against a single field.
    pub fn admits(&self, value: &str) -> bool {
        match self {
            Facet::Any => true,
            Facet::Is(wanted) => wanted == value,
        }
    }

    /// Membership match against a tag list.
    pub fn admits_any(&self, values: &[String]) -> bool {
        match self {
            Facet::Any => true,
            Facet::Is(wanted) => values.iter().any(|v| v == wanted),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Facet::Any)
    }
}

impl From<String> for Facet {
    fn from(value: String) -> Self {
        if value.is_empty() || value == ANY {
            Facet::Any
        } else {
            Facet::Is(value)
        }
    }
}

impl From<&str> for Facet {
    fn from(value: &str) -> Self {
        Facet::from(value.to_string())
    }
}

impl From<Facet> for String {
    fn from(facet: Facet) -> Self {
        match facet {
            Facet::Any => ANY.to_string(),
            Facet::Is(value) => value,
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facet::Any => f.write_str(ANY),
            Facet::Is(value) => f.write_str(value),
        }
    }
}

/// The four facet filters. Defaults to fully unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default, rename = "tourType", alias = "tour_type")]
    pub tour_type: Facet,
    #[serde(default)]
    pub departure: Facet,
    #[serde(default)]
    pub destination: Facet,
    #[serde(default)]
    pub transportation: Facet,
}

impl FilterCriteria {
    pub fn is_unconstrained(&self) -> bool {
        self.tour_type.is_any()
            && self.departure.is_any()
            && self.destination.is_any()
            && self.transportation.is_any()
    }

    pub fn admits(&self, tour: &Tour) -> bool {
        self.tour_type.admits_any(&tour.types)
            && self.departure.admits(&tour.departure)
            && self.destination.admits(&tour.destination)
            && self.transportation.admits(&tour.transportation)
    }
}

/// Case-insensitive substring match over the searchable text fields.
/// An empty query matches everything.
pub fn matches_search(tour: &Tour, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    let hit = |field: &str| field.to_lowercase().contains(&needle);

    hit(&tour.title)
        || tour.title_en.as_deref().is_some_and(hit)
        || hit(&tour.description)
        || tour.description_en.as_deref().is_some_and(hit)
        || hit(&tour.destination)
}

/// Tours admitted by both the search text and the facet criteria, in
/// catalog order.
pub fn filter_tours<'a>(tours: &'a [Tour], query: &str, criteria: &FilterCriteria) -> Vec<&'a Tour> {
    tours
        .iter()
        .filter(|tour| matches_search(tour, query) && criteria.admits(tour))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TourRecord;
    use crate::models::tour::TourTypes;

    fn tour(id: &str, title: &str, types: &[&str], departure: &str, transportation: &str) -> Tour {
        Tour::from(TourRecord {
            id: id.into(),
            title: title.into(),
            tour_type: Some(TourTypes::Many(types.iter().map(|t| t.to_string()).collect())),
            departure: departure.into(),
            destination: "vietnam".into(),
            transportation: transportation.into(),
            ..Default::default()
        })
    }

    fn catalog() -> Vec<Tour> {
        vec![
            tour("1", "Văn Miếu - Quốc Tử Giám", &["Tour gia đình", "Tour trường học"], "hanoi", "bus"),
            tour("2", "Làng lụa Vạn Phúc", &["Tour chill cuối tuần"], "hanoi", "motorbike"),
            tour("3", "Làng gốm Bát Tràng", &["Tour gia đình"], "hcm", "bus"),
        ]
    }

    #[test]
    fn test_unconstrained_returns_full_catalog_in_order() {
        let tours = catalog();
        let criteria = FilterCriteria::default();
        assert!(criteria.is_unconstrained());

        let ids: Vec<_> = filter_tours(&tours, "", &criteria)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_tag_inside_multi_tag_tour_matches() {
        let tours = catalog();
        let criteria = FilterCriteria {
            tour_type: Facet::is("Tour trường học"),
            ..Default::default()
        };
        let hits = filter_tours(&tours, "", &criteria);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
    }

    #[test]
    fn test_facets_combine_with_and() {
        let tours = catalog();
        let criteria = FilterCriteria {
            tour_type: Facet::is("Tour gia đình"),
            transportation: Facet::is("bus"),
            departure: Facet::is("hcm"),
            ..Default::default()
        };
        let hits = filter_tours(&tours, "", &criteria);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "3");
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_and_english_title() {
        let mut tours = catalog();
        tours[2].title_en = Some("Bat Trang Pottery Village".into());

        assert_eq!(filter_tours(&tours, "LỤA", &FilterCriteria::default()).len(), 1);
        assert_eq!(filter_tours(&tours, "pottery", &FilterCriteria::default())[0].id, "3");
        assert_eq!(filter_tours(&tours, "VIETNAM", &FilterCriteria::default()).len(), 3);
        assert!(filter_tours(&tours, "sapa", &FilterCriteria::default()).is_empty());
    }

    #[test]
    fn test_all_sentinel_round_trips_through_serde() {
        let criteria: FilterCriteria = serde_json::from_str(
            r#"{"tourType": "all", "departure": "hanoi", "destination": "all", "transportation": ""}"#,
        )
        .unwrap();
        assert_eq!(criteria.tour_type, Facet::Any);
        assert_eq!(criteria.departure, Facet::is("hanoi"));
        assert_eq!(criteria.transportation, Facet::Any);
        assert_eq!(Facet::Any.to_string(), "all");
    }

    #[test]
    fn test_result_is_always_subset() {
        let tours = catalog();
        for query in ["", "làng", "x"] {
            for tag in ["all", "Tour gia đình", "none"] {
                let criteria = FilterCriteria {
                    tour_type: Facet::from(tag),
                    ..Default::default()
                };
                for hit in filter_tours(&tours, query, &criteria) {
                    assert!(tours.iter().any(|t| t.id == hit.id));
                }
            }
        }
    }
}
