//! Time utilities: wall-clock display format, day start hours and
//! timezone-aware conversion for calendar export.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// Display format for task start/end times, e.g. "08:00 AM".
pub const WALL_CLOCK_FORMAT: &str = "%I:%M %p";

/// Storage format for task dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// When the study day starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    #[default]
    Morning,
    Afternoon,
}

impl Preference {
    pub fn as_str(self) -> &'static str {
        match self {
            Preference::Morning => "morning",
            Preference::Afternoon => "afternoon",
        }
    }
}

impl std::str::FromStr for Preference {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "am" => Ok(Preference::Morning),
            "afternoon" | "pm" => Ok(Preference::Afternoon),
            other => Err(PlanError::invalid(format!(
                "preference must be 'morning' or 'afternoon', got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for Preference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of "today". Injected so planning stays deterministic under test.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn format_wall_clock(t: NaiveTime) -> String {
    t.format(WALL_CLOCK_FORMAT).to_string()
}

pub fn parse_wall_clock(s: &str) -> PlanResult<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), WALL_CLOCK_FORMAT)
        .map_err(|e| PlanError::invalid(format!("invalid wall-clock time '{s}': {e}")))
}

pub fn parse_date(s: &str) -> PlanResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| PlanError::invalid(format!("invalid date '{s}' (want YYYY-MM-DD): {e}")))
}

/// Resolve a local date + wall time in an IANA tz like "America/Chicago" to UTC.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: &str) -> PlanResult<DateTime<Utc>> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| PlanError::invalid(format!("invalid timezone: {tz}")))?;

    let ndt = NaiveDateTime::new(date, time);
    let local_dt = tz
        .from_local_datetime(&ndt)
        .earliest()
        .ok_or_else(|| PlanError::invalid(format!("nonexistent local time (DST?): {ndt} {tz}")))?;

    Ok(local_dt.with_timezone(&Utc))
}

/// Serde adapter storing a `NaiveTime` as "hh:mm AM".
pub mod wall_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_wall_clock(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_wall_clock(&raw).map_err(serde::de::Error::custom)
    }
}
