//! Location intent to backend filter predicates.

use serde::Serialize;
use serde_json::Value;

use super::intent::LocationIntent;
use crate::config::LocationFieldMap;

/// Location attribute a predicate constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationAttribute {
    City,
    State,
    Neighborhood,
    ZipCode,
}

impl LocationAttribute {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::State => "state",
            Self::Neighborhood => "neighborhood",
            Self::ZipCode => "zip_code",
        }
    }
}

impl std::fmt::Display for LocationAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Exact-match predicate on one index field. Predicates are ANDed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterPredicate {
    pub attribute: LocationAttribute,
    pub field: String,
    pub value: String,
}

impl FilterPredicate {
    /// Render as a backend `term` clause.
    #[must_use]
    pub fn to_query(&self) -> Value {
        let mut term = serde_json::Map::new();
        term.insert(self.field.clone(), Value::String(self.value.clone()));
        serde_json::json!({ "term": term })
    }
}

/// Builds filter predicates from a [`LocationIntent`]. Pure; no I/O.
#[derive(Debug, Clone, Default)]
pub struct LocationFilterBuilder {
    fields: LocationFieldMap,
}

impl LocationFilterBuilder {
    pub const fn new(fields: LocationFieldMap) -> Self {
        Self { fields }
    }

    /// One predicate per present field; empty when the intent has no location.
    #[must_use]
    pub fn build(&self, intent: &LocationIntent) -> Vec<FilterPredicate> {
        if !intent.has_location() {
            return Vec::new();
        }

        [
            (LocationAttribute::City, &self.fields.city, intent.city()),
            (LocationAttribute::State, &self.fields.state, intent.state()),
            (
                LocationAttribute::Neighborhood,
                &self.fields.neighborhood,
                intent.neighborhood(),
            ),
            (LocationAttribute::ZipCode, &self.fields.zip_code, intent.zip_code()),
        ]
        .into_iter()
        .filter_map(|(attribute, field, value)| {
            value.map(|value| FilterPredicate {
                attribute,
                field: field.clone(),
                value: value.to_string(),
            })
        })
        .collect()
    }
}

/// Render predicates as the filter clause list shared by both retrievers.
#[must_use]
pub fn to_filter_clauses(predicates: &[FilterPredicate]) -> Vec<Value> {
    predicates.iter().map(FilterPredicate::to_query).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_location_builds_nothing() {
        let builder = LocationFilterBuilder::default();
        assert!(builder.build(&LocationIntent::none("pool")).is_empty());
    }

    #[test]
    fn city_only_builds_one_term() {
        let intent = LocationIntent::builder("museums in San Francisco")
            .city("San Francisco")
            .cleaned_query("museums")
            .build();
        let predicates = LocationFilterBuilder::default().build(&intent);

        assert_eq!(predicates.len(), 1);
        assert_eq!(predicates[0].attribute, LocationAttribute::City);
        assert_eq!(
            predicates[0].to_query(),
            json!({ "term": { "address.city": "San Francisco" } })
        );
    }

    #[test]
    fn every_present_field_builds_a_term_in_order() {
        let intent = LocationIntent::builder("q")
            .city("Austin")
            .state("TX")
            .neighborhood("Zilker")
            .zip_code("78704")
            .build();
        let predicates = LocationFilterBuilder::default().build(&intent);

        let attributes: Vec<_> = predicates.iter().map(|p| p.attribute).collect();
        assert_eq!(
            attributes,
            vec![
                LocationAttribute::City,
                LocationAttribute::State,
                LocationAttribute::Neighborhood,
                LocationAttribute::ZipCode
            ]
        );
    }

    #[test]
    fn values_keep_their_case() {
        let intent = LocationIntent::builder("q").city("San Luis Obispo").build();
        let predicates = LocationFilterBuilder::default().build(&intent);
        assert_eq!(predicates[0].value, "San Luis Obispo");
    }

    #[test]
    fn custom_field_map_is_used() {
        let fields = LocationFieldMap {
            zip_code: "postal_code".to_string(),
            ..LocationFieldMap::default()
        };
        let intent = LocationIntent::builder("q").zip_code("10001").build();
        let clauses = to_filter_clauses(&LocationFilterBuilder::new(fields).build(&intent));
        assert_eq!(clauses, vec![json!({ "term": { "postal_code": "10001" } })]);
    }
}
