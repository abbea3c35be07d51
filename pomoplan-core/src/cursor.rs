//! Time cursor: the generator's position while laying out sessions.
//!
//! Only lives for the duration of one `Scheduler::generate` call.

use chrono::{Days, NaiveDate, NaiveTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeCursor {
    date: NaiveDate,
    clock: NaiveTime,
    day_start: NaiveTime,
    minutes_used: u32,
    sessions_today: u32,
}

impl TimeCursor {
    pub fn new(date: NaiveDate, day_start: NaiveTime) -> Self {
        Self {
            date,
            clock: day_start,
            day_start,
            minutes_used: 0,
            sessions_today: 0,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn clock(&self) -> NaiveTime {
        self.clock
    }

    pub fn minutes_used(&self) -> u32 {
        self.minutes_used
    }

    pub fn sessions_today(&self) -> u32 {
        self.sessions_today
    }

    /// Would `cost` more minutes exceed `budget` today?
    pub fn would_exceed(&self, cost: u32, budget: u32) -> bool {
        self.minutes_used + cost > budget
    }

    /// Advance to the next calendar day. A rolled-over day is never revisited.
    pub fn roll_over(&mut self) {
        // Only fails at NaiveDate::MAX.
        self.date = self.date.checked_add_days(Days::new(1)).unwrap_or(self.date);
        self.clock = self.day_start;
        self.minutes_used = 0;
        self.sessions_today = 0;
    }

    /// Consume `minutes` of wall time, returning the (start, end) of the slot.
    pub fn advance(&mut self, minutes: u32) -> (NaiveTime, NaiveTime) {
        let start = self.clock;
        self.clock = start + chrono::Duration::minutes(i64::from(minutes));
        self.minutes_used += minutes;
        (start, self.clock)
    }

    /// Count a finished focus session, returning the 1-based count for today.
    pub fn record_session(&mut self) -> u32 {
        self.sessions_today += 1;
        self.sessions_today
    }
}
