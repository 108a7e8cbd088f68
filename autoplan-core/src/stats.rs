//! Read-side summary of a task collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::WorkCalendar;
use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStats {
    /// Pending (incomplete) tasks.
    pub total_tasks: usize,
    /// Pending tasks with a placement; a bare deadline does not count.
    pub scheduled_tasks: usize,
    pub unscheduled_tasks: usize,
    /// Sum of pending durations; tasks with no estimate count as zero.
    pub total_minutes: u64,
    /// `total_minutes` in hours, one decimal.
    pub total_hours: f64,
    /// Working days needed, rounded up.
    pub total_days: u64,
    /// When the pending work would be done if started at `now`.
    pub estimated_completion: Option<DateTime<Utc>>,
}

impl ScheduleStats {
    pub fn compute(tasks: &[Task], calendar: &WorkCalendar, now: DateTime<Utc>) -> Self {
        let pending: Vec<&Task> = tasks.iter().filter(|t| t.is_pending()).collect();
        let scheduled_tasks = pending.iter().filter(|t| t.scheduled_start.is_some()).count();

        let total_minutes: u64 = pending.iter().map(|t| u64::from(t.reported_minutes())).sum();
        let total_hours = (total_minutes as f64 / 60.0 * 10.0).round() / 10.0;
        let total_days = total_minutes.div_ceil(u64::from(calendar.minutes_per_day()));

        let estimated_completion = (total_days > 0).then(|| {
            let minutes = u32::try_from(total_minutes).unwrap_or(u32::MAX);
            calendar.end_of_task(now, minutes)
        });

        Self {
            total_tasks: pending.len(),
            scheduled_tasks,
            unscheduled_tasks: pending.len() - scheduled_tasks,
            total_minutes,
            total_hours,
            total_days,
            estimated_completion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn counts_and_totals() {
        let cal = WorkCalendar::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let tasks = vec![
            Task::new("a", "a").with_estimate(300).with_scheduled_start(now),
            Task::new("b", "b").with_duration(300),
            Task::new("c", "c"),
            Task::new("d", "d").with_estimate(999).completed(),
        ];

        let stats = ScheduleStats::compute(&tasks, &cal, now);
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.scheduled_tasks, 1);
        assert_eq!(stats.unscheduled_tasks, 2);
        assert_eq!(stats.total_minutes, 600);
        assert_eq!(stats.total_hours, 10.0);
        assert_eq!(stats.total_days, 2);
        assert_eq!(
            stats.estimated_completion,
            Some(Utc.with_ymd_and_hms(2026, 3, 3, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn deadline_alone_is_not_a_placement() {
        let cal = WorkCalendar::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let deadline = Utc.with_ymd_and_hms(2026, 3, 5, 17, 0, 0).unwrap();
        let tasks = vec![Task::new("d", "report").with_deadline(deadline).with_estimate(60)];

        let stats = ScheduleStats::compute(&tasks, &cal, now);
        assert_eq!(stats.scheduled_tasks, 0);
        assert_eq!(stats.unscheduled_tasks, 1);
        assert!(crate::agenda::agenda(&tasks, &cal).is_empty());
    }

    #[test]
    fn empty_collection_has_no_completion() {
        let cal = WorkCalendar::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let stats = ScheduleStats::compute(&[Task::new("x", "x").completed()], &cal, now);
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.total_days, 0);
        assert!(stats.estimated_completion.is_none());
    }

    #[test]
    fn hours_round_to_one_decimal() {
        let cal = WorkCalendar::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let stats = ScheduleStats::compute(&[Task::new("x", "x").with_estimate(50)], &cal, now);
        assert_eq!(stats.total_hours, 0.8);
        assert_eq!(stats.total_days, 1);
    }
}
