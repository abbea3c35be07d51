//! `topic,subtopic` CSV.
//!
//! One row per subtopic; consecutive rows with the same topic are grouped, a
//! blank subtopic column means the topic has none. A header row is optional.

use std::io::Read;

use anyhow::{Context, Result};
use pomoplan_core::Topic;

use super::extraction_json::normalize;

pub fn parse_topic_csv<R: Read>(reader: R) -> Result<Vec<Topic>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out: Vec<Topic> = Vec::new();

    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("csv row {}", i + 1))?;
        let topic = record.get(0).unwrap_or_default();
        let sub = record.get(1).unwrap_or_default();

        if i == 0 && topic.eq_ignore_ascii_case("topic") {
            continue;
        }
        if topic.is_empty() {
            continue;
        }

        match out.last_mut() {
            Some(last) if last.label == topic => {
                if !sub.is_empty() {
                    last.subtopics.push(sub.to_string());
                }
            }
            _ => {
                let mut t = Topic::new(topic);
                if !sub.is_empty() {
                    t.subtopics.push(sub.to_string());
                }
                out.push(t);
            }
        }
    }

    Ok(normalize(out))
}
