//! Property suite entry point.

mod embedding_props;
mod intent_props;
mod request_props;
