//! Extraction-service JSON.
//!
//! Accepted shapes:
//!   {"topics": [{"topic": "Cells", "subtopics": []}, ...]}
//!   [{"label": "Cells"}, ...]
//!   ["Cells", "Genetics"]            (labels only)

use anyhow::{Context, Result};
use pomoplan_core::Topic;
use serde::Deserialize;

use crate::types::ExtractionResponse;

#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Label(String),
    Topic(Topic),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Body {
    Wrapped(ExtractionResponse),
    Bare(Vec<Entry>),
}

pub fn parse_extraction_json(text: &str) -> Result<Vec<Topic>> {
    let body: Body = serde_json::from_str(text).context("extraction JSON is not a topic list")?;
    let topics = match body {
        Body::Wrapped(resp) => resp.topics,
        Body::Bare(entries) => entries
            .into_iter()
            .map(|e| match e {
                Entry::Label(l) => Topic::new(l),
                Entry::Topic(t) => t,
            })
            .collect(),
    };
    Ok(normalize(topics))
}

/// Trim labels, drop blank subtopics and topics with no label.
pub(crate) fn normalize(topics: Vec<Topic>) -> Vec<Topic> {
    topics
        .into_iter()
        .filter_map(|t| {
            let label = t.label.trim().to_string();
            if label.is_empty() {
                return None;
            }
            let subs: Vec<String> = t
                .subtopics
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            Some(Topic::new(label).with_subtopics(subs))
        })
        .collect()
}
