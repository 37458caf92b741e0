//! Geographic intent: extraction from free text and translation to filters.
//!
//! ```text
//! query ──► LanguageModel ──► RawLocationFields (untrusted)
//!                                   │ LocationIntent::from_raw
//!                                   ▼
//!                            LocationIntent ──► LocationFilterBuilder ──► [FilterPredicate]
//! ```

pub mod filters;
pub mod intent;
pub mod model;
pub mod understanding;

pub use filters::{FilterPredicate, LocationAttribute, LocationFilterBuilder, to_filter_clauses};
pub use intent::{LocationIntent, LocationIntentBuilder, RawLocationFields, UNKNOWN_SENTINEL};
pub use model::{ChatCompletionModel, LanguageModel};
pub use understanding::LocationUnderstandingModule;
