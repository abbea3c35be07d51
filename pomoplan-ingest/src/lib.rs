//! pomoplan-ingest: topic-list ingestion (extraction-service JSON, outlines, CSV).

pub mod parsers;
pub mod types;

pub use types::{ExtractionResponse, TopicFormat, load_topics, parse_topics};
