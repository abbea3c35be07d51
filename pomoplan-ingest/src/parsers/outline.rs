//! Markdown / plain-text syllabus outlines.
//!
//! Two layouts are recognized:
//!
//!   ## Cells                      - Cells
//!   ## Genetics                   - Genetics
//!   - DNA                             - DNA
//!   - RNA                             1. RNA
//!
//! Headings (or unindented bullets/lines when there are no headings) start a
//! topic; bullets or numbered items under it are its subtopics. When the
//! outline uses `##` or deeper headings, a `#` heading is treated as the title.

use anyhow::Result;
use pomoplan_core::Topic;
use regex::Regex;

use super::extraction_json::normalize;

pub fn parse_outline(text: &str) -> Result<Vec<Topic>> {
    let heading_re = Regex::new(r"^(?P<hashes>#{1,6})\s+(?P<text>.+?)\s*#*\s*$")?;
    let item_re = Regex::new(r"^(?P<indent>\s*)(?:[-*+]|\d+[.)])\s+(?P<text>.+?)\s*$")?;

    let levels: Vec<usize> = text
        .lines()
        .filter_map(|l| heading_re.captures(l.trim_end()))
        .map(|c| c["hashes"].len())
        .collect();
    let has_headings = !levels.is_empty();
    let title_level = if levels.iter().any(|&l| l >= 2) { Some(1) } else { None };

    let mut out: Vec<Topic> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = heading_re.captures(line.trim_end()) {
            if Some(caps["hashes"].len()) == title_level {
                continue;
            }
            out.push(Topic::new(&caps["text"]));
            continue;
        }

        if let Some(caps) = item_re.captures(line) {
            let text = &caps["text"];
            let top_level = caps["indent"].is_empty() && !has_headings;
            match out.last_mut() {
                Some(current) if !top_level => current.subtopics.push(text.to_string()),
                _ => out.push(Topic::new(text)),
            }
            continue;
        }

        if !has_headings && !line.starts_with(char::is_whitespace) {
            out.push(Topic::new(line.trim()));
        }
    }

    Ok(normalize(out))
}
