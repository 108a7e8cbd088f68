//! Reschedule policy: decides, per task-set mutation, whether an allocation
//! pass runs and over what.
//!
//! v0 behavior:
//! - a high-priority insertion reflows every pending task from `now`
//! - an undated insertion is placed on its own and spliced back by id
//! - a completion that leaves later-dated work behind reflows from `now`, pulling
//!   that work forward into the freed time
//! - anything else leaves the collection untouched (returned borrowed)
//!
//! Inputs are never mutated, so callers can diff before/after.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::allocator::{AllocateOptions, ScheduleAllocator};
use crate::calendar::WorkCalendar;
use crate::error::{Result, ScheduleError};
use crate::task::{Priority, Task};

/// What kind of allocation pass an event triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reflow {
    /// Leave the plan as is.
    None,
    /// Place only the new task.
    Single,
    /// Re-place every pending task.
    Full,
}

#[derive(Debug, Clone, Copy)]
pub struct ReschedulePolicy<'c> {
    calendar: &'c WorkCalendar,
}

impl<'c> ReschedulePolicy<'c> {
    pub fn new(calendar: &'c WorkCalendar) -> Self {
        Self { calendar }
    }

    pub fn decide_on_added(&self, new_task: &Task) -> Reflow {
        if new_task.completed {
            Reflow::None
        } else if new_task.priority == Some(Priority::High) {
            Reflow::Full
        } else if new_task.due_date().is_none() {
            Reflow::Single
        } else {
            Reflow::None
        }
    }

    pub fn decide_on_completed(&self, tasks: &[Task], completed: &Task) -> Reflow {
        let Some(done_at) = completed.due_date() else {
            return Reflow::None;
        };

        let has_later = tasks.iter().any(|t| {
            t.is_pending() && t.id != completed.id && t.due_date().is_some_and(|d| d > done_at)
        });

        if has_later { Reflow::Full } else { Reflow::None }
    }

    /// React to `new_task` having been added to `tasks` (it must already be in there).
    pub fn on_task_added<'a>(
        &self,
        tasks: &'a [Task],
        new_task: &Task,
        now: DateTime<Utc>,
    ) -> Result<Cow<'a, [Task]>> {
        let reflow = self.decide_on_added(new_task);
        debug!(task = %new_task.id, ?reflow, "task added");

        match reflow {
            Reflow::None => Ok(Cow::Borrowed(tasks)),
            Reflow::Full => self.auto_schedule(tasks, now),
            Reflow::Single => {
                if !tasks.iter().any(|t| t.id == new_task.id) {
                    return Err(ScheduleError::UnknownTask(new_task.id.clone()));
                }

                let single = std::slice::from_ref(new_task);
                let placed = ScheduleAllocator::new(self.calendar)
                    .allocate(single, AllocateOptions::new(now))?;
                let placed = placed
                    .first()
                    .cloned()
                    .ok_or_else(|| ScheduleError::UnknownTask(new_task.id.clone()))?;

                let spliced = tasks
                    .iter()
                    .map(|t| if t.id == placed.id { placed.clone() } else { t.clone() })
                    .collect::<Vec<_>>();
                Ok(Cow::Owned(spliced))
            }
        }
    }

    /// React to `completed` having been marked done in `tasks`.
    pub fn on_task_completed<'a>(
        &self,
        tasks: &'a [Task],
        completed: &Task,
        now: DateTime<Utc>,
    ) -> Result<Cow<'a, [Task]>> {
        let reflow = self.decide_on_completed(tasks, completed);
        debug!(task = %completed.id, ?reflow, "task completed");

        match reflow {
            Reflow::None => Ok(Cow::Borrowed(tasks)),
            Reflow::Single | Reflow::Full => self.auto_schedule(tasks, now),
        }
    }

    /// Full reflow of every pending task from `now`.
    pub fn auto_schedule<'a>(
        &self,
        tasks: &'a [Task],
        now: DateTime<Utc>,
    ) -> Result<Cow<'a, [Task]>> {
        ScheduleAllocator::new(self.calendar)
            .allocate(tasks, AllocateOptions::new(now).include_scheduled(true))
    }
}
