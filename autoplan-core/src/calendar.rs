//! Working calendar: daily work window, inter-task break and working weekdays.
//!
//! All hour arithmetic happens on wall-clock time in the calendar's timezone.
//! Callers pass and receive UTC instants.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::time::localize;

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Plain, serializable form of a [`WorkCalendar`]. Validated on conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkCalendarConfig {
    pub start_hour: u32,
    pub end_hour: u32,
    pub break_minutes: u32,
    pub working_days: Vec<Weekday>,
    pub timezone: Tz,
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 18,
            break_minutes: 15,
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            timezone: Tz::UTC,
        }
    }
}

/// Immutable working calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WorkCalendarConfig", into = "WorkCalendarConfig")]
pub struct WorkCalendar {
    /// Minute of day the work window opens.
    start_min: u32,
    /// Minute of day the work window closes (exclusive).
    end_min: u32,
    break_minutes: u32,
    // indexed by num_days_from_monday
    working: [bool; 7],
    timezone: Tz,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            start_min: 9 * 60,
            end_min: 18 * 60,
            break_minutes: 15,
            working: [true, true, true, true, true, false, false],
            timezone: Tz::UTC,
        }
    }
}

impl TryFrom<WorkCalendarConfig> for WorkCalendar {
    type Error = ScheduleError;

    fn try_from(config: WorkCalendarConfig) -> Result<Self> {
        Self::new(
            config.start_hour,
            config.end_hour,
            config.break_minutes,
            config.working_days,
            config.timezone,
        )
    }
}

impl From<WorkCalendar> for WorkCalendarConfig {
    fn from(cal: WorkCalendar) -> Self {
        Self {
            start_hour: cal.start_min / 60,
            end_hour: cal.end_min / 60,
            break_minutes: cal.break_minutes,
            working_days: cal.working_days(),
            timezone: cal.timezone,
        }
    }
}

impl WorkCalendar {
    pub fn new<I>(
        start_hour: u32,
        end_hour: u32,
        break_minutes: u32,
        working_days: I,
        timezone: Tz,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = Weekday>,
    {
        if start_hour >= end_hour {
            return Err(ScheduleError::InvalidCalendar(format!(
                "start_hour ({start_hour}) must be before end_hour ({end_hour})"
            )));
        }
        if end_hour > 24 {
            return Err(ScheduleError::InvalidCalendar(format!(
                "end_hour ({end_hour}) must be at most 24"
            )));
        }

        let mut working = [false; 7];
        for day in working_days {
            working[day.num_days_from_monday() as usize] = true;
        }
        if !working.iter().any(|w| *w) {
            return Err(ScheduleError::InvalidCalendar(
                "at least one working day is required".to_string(),
            ));
        }

        Ok(Self {
            start_min: start_hour * 60,
            end_min: end_hour * 60,
            break_minutes,
            working,
            timezone,
        })
    }

    /// Same calendar, different timezone.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    pub fn start_hour(&self) -> u32 {
        self.start_min / 60
    }

    pub fn end_hour(&self) -> u32 {
        self.end_min / 60
    }

    pub fn working_days(&self) -> Vec<Weekday> {
        ALL_WEEKDAYS
            .into_iter()
            .filter(|d| self.working[d.num_days_from_monday() as usize])
            .collect()
    }

    /// Length of one working day in minutes.
    pub fn minutes_per_day(&self) -> u32 {
        self.end_min - self.start_min
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.working[date.weekday().num_days_from_monday() as usize]
    }

    /// Wall-clock time of `at` in the calendar's timezone.
    pub fn local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.timezone).naive_local()
    }

    pub fn is_working_instant(&self, at: DateTime<Utc>) -> bool {
        let local = self.local(at);
        let m = minute_of_day(local);
        self.is_working_day(local.date()) && m >= self.start_min && m < self.end_min
    }

    /// Minutes left in the work window containing `at`, zero outside a window.
    pub fn minutes_remaining_today(&self, at: DateTime<Utc>) -> u32 {
        if !self.is_working_instant(at) {
            return 0;
        }
        self.end_min - minute_of_day(self.local(at))
    }

    /// Whether `at` sits exactly on a working day's opening minute.
    pub fn is_day_start(&self, at: DateTime<Utc>) -> bool {
        let local = self.local(at);
        self.is_working_day(local.date()) && local == self.day_start(local.date())
    }

    /// Whether the wall-clock time of `at` is at or past closing time.
    pub fn is_past_end_of_day(&self, at: DateTime<Utc>) -> bool {
        minute_of_day(self.local(at)) >= self.end_min
    }

    /// Start of the working day that `from` belongs to, pinned to the opening hour.
    ///
    /// A non-working day rolls forward to the next working day. A working day at
    /// or past closing time advances to the next working day. The result is
    /// always the opening minute, even if `from` is already inside today's
    /// window; use [`WorkCalendar::next_working_instant`] to keep the exact time.
    pub fn next_work_slot(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        let local = self.local(from);
        let date = local.date();
        let date = if !self.is_working_day(date) {
            self.roll_forward(date)
        } else if minute_of_day(local) >= self.end_min {
            self.roll_forward(date + Duration::days(1))
        } else {
            date
        };
        self.to_utc(self.day_start(date))
    }

    /// Earliest working instant at or after `from`, rounded up to the minute.
    pub fn next_working_instant(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        self.to_utc(self.next_working_local(self.local(from)))
    }

    /// Opening minute of the first working day strictly after the day of `at`.
    pub fn next_day_start(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let date = self.local(at).date() + Duration::days(1);
        self.to_utc(self.day_start(self.roll_forward(date)))
    }

    /// The local calendar day of `day_of` at the local time-of-day of `time_of`.
    pub fn on_day_at_time_of(
        &self,
        day_of: DateTime<Utc>,
        time_of: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let date = self.local(day_of).date();
        let time = self.local(time_of).time();
        self.to_utc(date.and_time(time))
    }

    /// Instant at which `duration_minutes` of working time starting at `start` is used up.
    ///
    /// Time outside the work window does not count: the remainder spills into the
    /// next working day's window. A zero duration returns `start` unchanged.
    pub fn end_of_task(&self, start: DateTime<Utc>, duration_minutes: u32) -> DateTime<Utc> {
        if duration_minutes == 0 {
            return start;
        }

        let mut cursor = self.next_working_local(self.local(start));
        let mut remaining = i64::from(duration_minutes);

        loop {
            let available = i64::from(self.end_min) - i64::from(minute_of_day(cursor));
            if available >= remaining {
                cursor += Duration::minutes(remaining);
                break;
            }
            remaining -= available.max(0);
            cursor = self.day_start(self.roll_forward(cursor.date() + Duration::days(1)));
        }

        self.to_utc(cursor)
    }

    fn next_working_local(&self, local: NaiveDateTime) -> NaiveDateTime {
        let local = ceil_to_minute(local);
        let date = local.date();
        if !self.is_working_day(date) {
            return self.day_start(self.roll_forward(date));
        }

        let m = minute_of_day(local);
        if m < self.start_min {
            self.day_start(date)
        } else if m >= self.end_min {
            self.day_start(self.roll_forward(date + Duration::days(1)))
        } else {
            local
        }
    }

    /// First working day on or after `date`.
    fn roll_forward(&self, date: NaiveDate) -> NaiveDate {
        let mut d = date;
        // At least one weekday is working, so a week always contains one.
        for _ in 0..7 {
            if self.is_working_day(d) {
                break;
            }
            d += Duration::days(1);
        }
        d
    }

    fn day_start(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(self.start_min))
    }

    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        localize(self.timezone, local)
    }
}

fn minute_of_day(t: NaiveDateTime) -> u32 {
    t.hour() * 60 + t.minute()
}

fn ceil_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    let truncated = t
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t);
    if truncated == t {
        t
    } else {
        truncated + Duration::minutes(1)
    }
}
