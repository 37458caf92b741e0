use std::sync::Arc;

use proptest::prelude::*;

use homeseek::HsError;
use homeseek::embeddings::QueryEmbeddingService;
use homeseek::test_utils::doubles::CountingEmbeddingProvider;

proptest! {
    #[test]
    fn whitespace_only_text_is_never_embedded(text in "[ \t\n\u{00A0}\u{2003}]{0,20}") {
        let provider = Arc::new(CountingEmbeddingProvider::new(8));
        let mut service = QueryEmbeddingService::new(provider.clone(), Some("k".to_string()));
        service.initialize().unwrap();

        let result = service.embed_query(&text);

        prop_assert!(matches!(result, Err(HsError::EmbeddingGeneration(_))));
        prop_assert_eq!(provider.texts_embedded(), 0);
    }
}
