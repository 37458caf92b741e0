use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{Value, json};

use homeseek::location::{
    LocationFilterBuilder, LocationIntent, LocationUnderstandingModule, RawLocationFields,
};
use homeseek::test_utils::doubles::ScriptedLanguageModel;

/// What an extractor might put in a text field: real values, the sentinel in
/// any case, blanks, numbers, or junk types.
fn arb_field() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(json!("unknown"))),
        Just(Some(json!("UNKNOWN"))),
        Just(Some(json!("  "))),
        Just(Some(Value::Null)),
        Just(Some(json!(true))),
        (10_000u32..99_999).prop_map(|zip| Some(json!(zip))),
        "[A-Z][a-z]{2,12}( [A-Z][a-z]{2,10})?".prop_map(|s| Some(json!(s))),
    ]
}

fn arb_flag() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(json!(true))),
        Just(Some(json!(false))),
        Just(Some(json!("yes"))),
        Just(Some(json!("no"))),
        Just(Some(json!("maybe"))),
    ]
}

fn arb_confidence() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(json!("high"))),
        (-5.0f64..5.0).prop_map(|c| Some(json!(c))),
        "[0-9]\\.[0-9]{1,3}".prop_map(|s| Some(json!(s))),
    ]
}

fn arb_raw() -> impl Strategy<Value = RawLocationFields> {
    (
        arb_field(),
        arb_field(),
        arb_field(),
        arb_field(),
        arb_flag(),
        prop::option::of("[a-z ]{0,30}".prop_map(|s| json!(s))),
        arb_confidence(),
    )
        .prop_map(
            |(city, state, neighborhood, zip_code, has_location, cleaned_query, confidence)| {
                RawLocationFields {
                    reasoning: None,
                    city,
                    state,
                    neighborhood,
                    zip_code,
                    has_location,
                    cleaned_query,
                    confidence,
                }
            },
        )
}

proptest! {
    #[test]
    fn no_fields_means_no_location_and_zero_confidence(raw in arb_raw(), query in "[a-z ]{1,40}") {
        let intent = LocationIntent::from_raw(&query, raw);
        if intent.field_count() == 0 {
            prop_assert!(!intent.has_location());
            prop_assert_eq!(intent.confidence(), 0.0);
        }
        if !intent.has_location() {
            prop_assert_eq!(intent.confidence(), 0.0);
            prop_assert_eq!(intent.cleaned_query(), query.as_str());
        }
    }

    #[test]
    fn confidence_is_clamped(raw in arb_raw(), query in "[a-z]{1,20}") {
        let intent = LocationIntent::from_raw(&query, raw);
        prop_assert!((0.0..=1.0).contains(&intent.confidence()));
    }

    #[test]
    fn sentinel_never_survives(raw in arb_raw(), query in "[a-z]{1,20}") {
        let intent = LocationIntent::from_raw(&query, raw);
        for value in [intent.city(), intent.state(), intent.neighborhood(), intent.zip_code()]
            .into_iter()
            .flatten()
        {
            prop_assert!(!value.eq_ignore_ascii_case("unknown"));
            prop_assert!(!value.trim().is_empty());
        }
    }

    #[test]
    fn cleaned_query_is_never_empty(raw in arb_raw(), query in "[a-z]{1,20}") {
        let intent = LocationIntent::from_raw(&query, raw);
        prop_assert!(!intent.cleaned_query().trim().is_empty());
    }

    #[test]
    fn one_predicate_per_present_field(raw in arb_raw(), query in "[a-z]{1,20}") {
        let intent = LocationIntent::from_raw(&query, raw);
        let predicates = LocationFilterBuilder::default().build(&intent);
        if intent.has_location() {
            prop_assert_eq!(predicates.len(), intent.field_count());
        } else {
            prop_assert!(predicates.is_empty());
        }
    }

    #[test]
    fn extraction_is_repeatable(raw in arb_raw(), query in "[a-z]{1,20}") {
        let output = serde_json::to_value(&raw).unwrap();
        let module = LocationUnderstandingModule::new(Arc::new(
            ScriptedLanguageModel::new().with_response(&query, output),
        ));
        prop_assert_eq!(module.extract(&query), module.extract(&query));
    }
}
