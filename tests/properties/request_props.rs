use proptest::prelude::*;

use homeseek::config::SearchConfig;
use homeseek::location::{LocationFilterBuilder, LocationIntent, to_filter_clauses};
use homeseek::search::{HybridSearchParams, RrfSearchRequest, knn_bounds};

fn arb_intent() -> impl Strategy<Value = LocationIntent> {
    (
        prop::option::of("[A-Z][a-z]{3,10}"),
        prop::option::of("[A-Z]{2}"),
        prop::option::of("[A-Z][a-z]{3,10}"),
        prop::option::of("[0-9]{5}"),
    )
        .prop_map(|(city, state, neighborhood, zip)| {
            let mut builder = LocationIntent::builder("homes near here").cleaned_query("homes");
            if let Some(city) = city {
                builder = builder.city(city);
            }
            if let Some(state) = state {
                builder = builder.state(state);
            }
            if let Some(neighborhood) = neighborhood {
                builder = builder.neighborhood(neighborhood);
            }
            if let Some(zip) = zip {
                builder = builder.zip_code(zip);
            }
            builder.confidence(0.8).build()
        })
}

proptest! {
    #[test]
    fn knn_bounds_respect_caps(size in 0usize..10_000, upper in 0usize..1_000) {
        let (k, num_candidates) = knn_bounds(size, upper);
        let upper = upper.max(1);
        prop_assert!(k >= 1);
        prop_assert!(k <= upper);
        prop_assert!(num_candidates <= upper);
        prop_assert!(num_candidates >= k);
        prop_assert!(k <= size.max(1) * 5);
        prop_assert!(num_candidates <= size.max(1) * 10);
    }

    #[test]
    fn request_shape_and_filter_symmetry(
        intent in arb_intent(),
        size in 1usize..100,
        rank_constant in 1u32..200,
    ) {
        let config = SearchConfig::default();
        let filters = to_filter_clauses(&LocationFilterBuilder::default().build(&intent));
        let expected_filters = filters.len();
        let params = HybridSearchParams::builder("homes near here")
            .size(size)
            .rank_constant(rank_constant)
            .rank_window_size(size.max(100))
            .location_intent(intent)
            .build()
            .unwrap();

        let request = RrfSearchRequest::compose(&params, vec![0.0; 4], filters, &config);

        let kinds: Vec<_> = request.retrievers().iter().map(|r| r.kind()).collect();
        prop_assert_eq!(kinds, vec!["standard", "knn"]);
        prop_assert_eq!(request.retrievers()[0].filter(), request.retrievers()[1].filter());
        prop_assert_eq!(request.retrievers()[0].filter().len(), expected_filters);
        prop_assert_eq!(request.retriever.rrf.rank_constant, rank_constant);
        prop_assert_eq!(request.size, size);
    }
}
