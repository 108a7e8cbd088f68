//! Day-grouped view of a plan: pending scheduled tasks, by local day, by start.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::calendar::WorkCalendar;
use crate::task::Task;

#[derive(Debug, Clone, PartialEq)]
pub struct AgendaEntry<'a> {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub task: &'a Task,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgendaDay<'a> {
    /// Local calendar day in the calendar's timezone.
    pub day: NaiveDate,
    pub entries: Vec<AgendaEntry<'a>>,
}

pub fn agenda<'a>(tasks: &'a [Task], calendar: &WorkCalendar) -> Vec<AgendaDay<'a>> {
    let mut days: BTreeMap<NaiveDate, Vec<AgendaEntry<'a>>> = BTreeMap::new();

    for task in tasks.iter().filter(|t| t.is_pending()) {
        let Some(start) = task.scheduled_start else { continue };
        let end = calendar.end_of_task(start, task.resolved_duration());
        days.entry(calendar.local(start).date())
            .or_default()
            .push(AgendaEntry { start, end, task });
    }

    days.into_iter()
        .map(|(day, mut entries)| {
            entries.sort_by_key(|e| e.start);
            AgendaDay { day, entries }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn groups_by_local_day_and_sorts_by_start() {
        let cal = WorkCalendar::default().with_timezone(chrono_tz::America::New_York);
        // EST is UTC-5; 03:30 UTC on Mar 3 is still Mar 2 locally.
        let tasks = vec![
            Task::new("late", "late")
                .with_scheduled_start(Utc.with_ymd_and_hms(2026, 3, 2, 20, 0, 0).unwrap()),
            Task::new("early", "early")
                .with_scheduled_start(Utc.with_ymd_and_hms(2026, 3, 2, 15, 0, 0).unwrap()),
            Task::new("night", "night")
                .with_scheduled_start(Utc.with_ymd_and_hms(2026, 3, 3, 3, 30, 0).unwrap()),
            Task::new("next", "next")
                .with_scheduled_start(Utc.with_ymd_and_hms(2026, 3, 3, 14, 0, 0).unwrap()),
            Task::new("unplanned", "unplanned"),
            Task::new("done", "done")
                .with_scheduled_start(Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap())
                .completed(),
        ];

        let days = agenda(&tasks, &cal);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        let ids: Vec<&str> = days[0].entries.iter().map(|e| e.task.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "night"]);
        assert_eq!(days[1].entries[0].task.id, "next");

        // 10:00 EST + 30 minutes.
        assert_eq!(
            days[0].entries[0].end,
            Utc.with_ymd_and_hms(2026, 3, 2, 15, 30, 0).unwrap()
        );
    }
}
