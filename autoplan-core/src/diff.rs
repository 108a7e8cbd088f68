//! Per-task schedule changes, for writing a replanned collection back to storage.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// One persistence update: the schedule fields of a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub id: String,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
}

/// Updates for every task whose start or duration differs between `before` and `after`.
///
/// Tasks only present in `after` count as changed. Output follows `after` order.
pub fn diff_schedules(before: &[Task], after: &[Task]) -> Vec<TaskUpdate> {
    let prior: HashMap<&str, &Task> = before.iter().map(|t| (t.id.as_str(), t)).collect();

    after
        .iter()
        .filter(|t| match prior.get(t.id.as_str()) {
            Some(old) => {
                old.scheduled_start != t.scheduled_start
                    || old.duration_minutes != t.duration_minutes
            }
            None => true,
        })
        .map(|t| TaskUpdate {
            id: t.id.clone(),
            scheduled_start: t.scheduled_start,
            duration_minutes: t.duration_minutes,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reports_only_changed_schedule_fields() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let before = vec![
            Task::new("same", "same").with_scheduled_start(t0),
            Task::new("moved", "moved"),
            Task::new("retitled", "old title"),
        ];
        let mut after = before.clone();
        after[1].scheduled_start = Some(t0);
        after[1].duration_minutes = Some(30);
        after[2].title = "new title".into();

        let updates = diff_schedules(&before, &after);
        assert_eq!(
            updates,
            vec![TaskUpdate {
                id: "moved".into(),
                scheduled_start: Some(t0),
                duration_minutes: Some(30),
            }]
        );
    }

    #[test]
    fn new_tasks_are_reported() {
        let after = vec![Task::new("n", "n")];
        assert_eq!(diff_schedules(&[], &after).len(), 1);
    }
}
