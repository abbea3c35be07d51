use anyhow::{Context, Result};
use chrono::{DateTime, Days, Utc};
use pomoplan_core::{Schedule, TaskKind, local_to_utc};

pub struct CalendarEvent {
    pub uid: String,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub summary: String,
    pub description: String,
}

/// Turn scheduled tasks into timed events in `tz`.
///
/// UIDs are derived from date + schedule index, so re-exporting the same plan
/// updates events instead of duplicating them.
pub fn schedule_to_events(
    schedule: &Schedule,
    tz: &str,
    prefix: &str,
    skip_breaks: bool,
) -> Result<Vec<CalendarEvent>> {
    let mut events = Vec::new();

    for (i, t) in schedule.iter().enumerate() {
        if skip_breaks && t.kind == TaskKind::Break {
            continue;
        }

        let start_utc = local_to_utc(t.date, t.start_time, tz)
            .with_context(|| format!("task {i} start"))?;
        // Sessions running past midnight end on the following day.
        let end_date = if t.end_time < t.start_time {
            t.date.checked_add_days(Days::new(1)).unwrap_or(t.date)
        } else {
            t.date
        };
        let end_utc =
            local_to_utc(end_date, t.end_time, tz).with_context(|| format!("task {i} end"))?;

        let status = if t.completed { "done" } else { "pending" };
        events.push(CalendarEvent {
            uid: format!("pomoplan-{}-{}@pomoplan", t.date.format("%Y%m%d"), i),
            start_utc,
            end_utc,
            summary: format!("{}{}", prefix, t.label),
            description: format!(
                "Kind: {:?}\nMinutes: {}\nStatus: {}\n",
                t.kind, t.duration_minutes, status
            ),
        });
    }

    Ok(events)
}

/// Emit a minimal ICS calendar containing VEVENT blocks (DTSTART/DTEND in UTC).
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Pomoplan//EN\r\n");

    for e in events {
        s.push_str("BEGIN:VEVENT\r\n");
        s.push_str(&format!("UID:{}\r\n", e.uid));
        s.push_str(&format!("DTSTART:{}\r\n", e.start_utc.format("%Y%m%dT%H%M%SZ")));
        s.push_str(&format!("DTEND:{}\r\n", e.end_utc.format("%Y%m%dT%H%M%SZ")));
        s.push_str(&format!("SUMMARY:{}\r\n", escape_ics(&e.summary)));
        s.push_str(&format!("DESCRIPTION:{}\r\n", escape_ics(&e.description)));
        s.push_str("END:VEVENT\r\n");
    }

    s.push_str("END:VCALENDAR\r\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}
