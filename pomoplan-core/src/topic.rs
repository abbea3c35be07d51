//! Syllabus topics and their flattening into schedulable items.

use serde::{Deserialize, Serialize};

/// A syllabus entry as returned by the extraction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(alias = "topic")]
    pub label: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

impl Topic {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            subtopics: Vec::new(),
        }
    }

    pub fn with_subtopics<I, S>(mut self, subtopics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtopics = subtopics.into_iter().map(Into::into).collect();
        self
    }
}

/// Flatten topics into the ordered list of focus-session labels.
///
/// Label rules (these labels are also the reconciliation key):
/// - no subtopics: the topic label
/// - first subtopic: "<topic>: <subtopic>"
/// - later subtopics: the bare subtopic
pub fn flatten(topics: &[Topic]) -> Vec<String> {
    let mut out = Vec::new();
    for topic in topics {
        if topic.subtopics.is_empty() {
            out.push(topic.label.clone());
            continue;
        }
        for (i, sub) in topic.subtopics.iter().enumerate() {
            if i == 0 {
                out.push(format!("{}: {}", topic.label, sub));
            } else {
                out.push(sub.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_subtopic_carries_parent_label() {
        let topics = vec![Topic::new("Algebra").with_subtopics(["Linear Eq", "Quadratics"])];
        assert_eq!(flatten(&topics), vec!["Algebra: Linear Eq", "Quadratics"]);
    }

    #[test]
    fn single_subtopic_is_still_prefixed() {
        let topics = vec![Topic::new("Optics").with_subtopics(["Lenses"])];
        assert_eq!(flatten(&topics), vec!["Optics: Lenses"]);
    }

    #[test]
    fn bare_topic_and_order_preserved() {
        let topics = vec![
            Topic::new("Cells"),
            Topic::new("Genetics").with_subtopics(["DNA", "RNA"]),
        ];
        assert_eq!(flatten(&topics), vec!["Cells", "Genetics: DNA", "RNA"]);
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn accepts_extraction_service_keys() {
        let raw = r#"[{"topic": "Cells"}, {"label": "Genetics", "subtopics": ["DNA"]}]"#;
        let topics: Vec<Topic> = serde_json::from_str(raw).unwrap();
        assert_eq!(topics[0], Topic::new("Cells"));
        assert_eq!(topics[1].subtopics, vec!["DNA".to_string()]);
    }
}
