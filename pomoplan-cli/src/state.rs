use anyhow::{Context, Result};
use pomoplan_core::{PlanError, PlanResult, PlanStore, SessionSlot, StudyPlan};
use std::fs;
use std::path::{Path, PathBuf};

/// `$POMOPLAN_HOME`, else `~/.pomoplan`.
pub fn pomoplan_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("POMOPLAN_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".pomoplan"))
}

pub fn ensure_pomoplan_home() -> Result<PathBuf> {
    let dir = pomoplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn plans_dir() -> Result<PathBuf> {
    Ok(ensure_pomoplan_home()?.join("plans"))
}

pub fn session_path() -> Result<PathBuf> {
    Ok(ensure_pomoplan_home()?.join("session.json"))
}

/// File-name-safe owner: ASCII alphanumerics and `-` pass through, every other
/// byte becomes `_XX`. `_` itself is escaped, so distinct owners never share a file.
fn escape_owner(owner: &str) -> String {
    let mut out = String::with_capacity(owner.len());
    for b in owner.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("_{b:02X}"));
        }
    }
    out
}

/// Write to a sibling temp file, then rename over `p`.
fn write_atomic(p: &Path, contents: &str) -> std::io::Result<()> {
    let tmp = p.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, p)
}

/// One pretty-printed JSON document per owner under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(plans_dir()?))
    }

    fn doc_path(&self, owner: &str) -> PathBuf {
        self.dir.join(format!("{}.json", escape_owner(owner)))
    }
}

impl PlanStore for JsonFileStore {
    fn get(&self, owner: &str) -> PlanResult<Option<StudyPlan>> {
        let p = self.doc_path(owner);
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&p)
            .map_err(|e| PlanError::Store(format!("read {}: {e}", p.display())))?;
        serde_json::from_str(&s)
            .map(Some)
            .map_err(|e| PlanError::Store(format!("parse {}: {e}", p.display())))
    }

    fn set(&mut self, owner: &str, plan: &StudyPlan) -> PlanResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| PlanError::Store(format!("create {}: {e}", self.dir.display())))?;
        let p = self.doc_path(owner);
        let json = serde_json::to_string_pretty(plan)
            .map_err(|e| PlanError::Store(format!("serialize plan: {e}")))?;
        write_atomic(&p, &json)
            .map_err(|e| PlanError::Store(format!("write {}: {e}", p.display())))
    }
}

pub fn read_session(p: &Path) -> Result<SessionSlot> {
    if !p.exists() {
        return Ok(SessionSlot::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn write_session(p: &Path, slot: &SessionSlot) -> Result<()> {
    let json = serde_json::to_string_pretty(slot)?;
    write_atomic(p, &json).with_context(|| format!("write {}", p.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pomoplan_core::{FixedClock, PlanManager, PlanParams, Preference, Topic};

    #[test]
    fn file_store_round_trips_plans() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut m = PlanManager::new(JsonFileStore::new(dir.path()), FixedClock(today));
        m.generate(
            "me@example.com",
            PlanParams {
                topics: vec![Topic::new("Cells")],
                exam_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                study_hours_per_day: 1.0,
                preference: Preference::Morning,
            },
        )
        .unwrap();
        m.set_completed("me@example.com", 0, true).unwrap();

        assert!(dir.path().join("me_40example_2Ecom.json").exists());
        let again = JsonFileStore::new(dir.path());
        let plan = again.get("me@example.com").unwrap().unwrap();
        assert_eq!(plan.tasks.len(), 2);
        assert!(plan.tasks.tasks()[0].completed);
        assert!(again.get("nobody").unwrap().is_none());
    }

    #[test]
    fn corrupt_document_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("local.json"), "{not json").unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(store.get("local"), Err(PlanError::Store(_))));
    }

    #[test]
    fn missing_session_file_is_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("session.json");
        assert!(read_session(&p).unwrap().active().is_none());
        write_session(&p, &SessionSlot::default()).unwrap();
        assert!(read_session(&p).unwrap().active().is_none());
    }

    #[test]
    fn similar_owner_names_keep_separate_documents() {
        assert_eq!(escape_owner("a.b"), "a_2Eb");
        assert_eq!(escape_owner("a_b"), "a_5Fb");

        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut m = PlanManager::new(JsonFileStore::new(dir.path()), FixedClock(today));
        for (owner, topic) in [("a.b", "Cells"), ("a_b", "Genetics")] {
            m.generate(
                owner,
                PlanParams {
                    topics: vec![Topic::new(topic)],
                    exam_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                    study_hours_per_day: 1.0,
                    preference: Preference::Morning,
                },
            )
            .unwrap();
        }
        assert_eq!(m.load("a.b").unwrap().tasks.tasks()[0].label, "Cells");
        assert_eq!(m.load("a_b").unwrap().tasks.tasks()[0].label, "Genetics");
    }

    #[test]
    fn session_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("session.json");
        write_session(&p, &SessionSlot::default()).unwrap();
        assert!(p.exists());
        assert!(!p.with_extension("json.tmp").exists());
    }
}
