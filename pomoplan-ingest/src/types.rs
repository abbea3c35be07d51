use std::path::Path;

use anyhow::{Context, Result, bail};
use pomoplan_core::Topic;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parsers::{extraction_json, outline, topic_csv};

/// Input formats we know how to turn into topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicFormat {
    /// Extraction-service output: `{"topics": [...]}` or a bare array.
    Json,
    /// `topic,subtopic` rows.
    Csv,
    /// Markdown/plain-text outline.
    Outline,
}

impl TopicFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => TopicFormat::Json,
            Some("csv") => TopicFormat::Csv,
            _ => TopicFormat::Outline,
        }
    }
}

/// Response body of the upload/extraction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExtractionResponse {
    #[serde(default)]
    pub topics: Vec<Topic>,
}

pub fn parse_topics(text: &str, format: TopicFormat) -> Result<Vec<Topic>> {
    let topics = match format {
        TopicFormat::Json => extraction_json::parse_extraction_json(text)?,
        TopicFormat::Csv => topic_csv::parse_topic_csv(text.as_bytes())?,
        TopicFormat::Outline => outline::parse_outline(text)?,
    };
    debug!(?format, topics = topics.len(), "parsed topic list");
    Ok(topics)
}

/// Read a topic file, picking the parser from its extension.
pub fn load_topics(path: impl AsRef<Path>) -> Result<Vec<Topic>> {
    let path = path.as_ref();
    if !path.exists() {
        bail!("topics file not found: {}", path.display());
    }
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_topics(&text, TopicFormat::from_path(path))
        .with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn picks_parser_from_extension() {
        assert_eq!(TopicFormat::from_path(Path::new("a/topics.JSON")), TopicFormat::Json);
        assert_eq!(TopicFormat::from_path(Path::new("topics.csv")), TopicFormat::Csv);
        assert_eq!(TopicFormat::from_path(Path::new("syllabus.md")), TopicFormat::Outline);
        assert_eq!(TopicFormat::from_path(Path::new("syllabus")), TopicFormat::Outline);
    }

    #[test]
    fn loads_from_disk() {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(f, "topic,subtopic\nCells,\nGenetics,DNA").unwrap();
        let topics = load_topics(f.path()).unwrap();
        assert_eq!(topics.len(), 2);
        assert!(load_topics("/definitely/not/here.json").is_err());
    }
}
