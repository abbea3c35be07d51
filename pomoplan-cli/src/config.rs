use anyhow::{Context, Result};
use pomoplan_core::{PlanPolicy, Preference, ReconcileKey, SchedulerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_pomoplan_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub planner: PlannerSection,
    pub pomodoro: SchedulerConfig,
    pub extraction: ExtractionSection,
    pub calendar: CalendarSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlannerSection {
    /// Document key for the local plan (one plan per owner).
    pub owner: String,
    pub hours_per_day: f64,
    pub preference: Preference,
    pub min_days_before_exam: i64,
    pub max_hours_per_day: f64,
    pub reconcile_key: ReconcileKey,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionSection {
    /// Upload endpoint that turns a syllabus into `{"topics": [...]}`.
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalendarSection {
    /// IANA timezone the study times are expressed in.
    pub timezone: String,
    pub event_prefix: String,
    /// Leave break sessions out of exported calendars.
    pub skip_breaks: bool,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            owner: "local".to_string(),
            hours_per_day: 2.0,
            preference: Preference::Morning,
            min_days_before_exam: 1,
            max_hours_per_day: 12.0,
            reconcile_key: ReconcileKey::Label,
        }
    }
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5000/upload".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for CalendarSection {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
            event_prefix: "[Study] ".to_string(),
            skip_breaks: false,
        }
    }
}

impl Config {
    pub fn policy(&self) -> PlanPolicy {
        PlanPolicy {
            min_days_before_exam: self.planner.min_days_before_exam,
            max_hours_per_day: self.planner.max_hours_per_day,
            reconcile_key: self.planner.reconcile_key,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_pomoplan_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
