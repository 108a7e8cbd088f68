//! Schedule allocator: assigns each pending task a start instant.
//!
//! Algorithm (deterministic, greedy):
//! 1) pick candidates: incomplete tasks, optionally only those without a start
//! 2) order them (see `crate::order`)
//! 3) walk a cursor forward through the working calendar, placing each task at
//!    the cursor and advancing it by duration + break
//! 4) deadline-bearing tasks (when deadlines are respected) are pinned to their
//!    deadline's day at the cursor's time of day and do not move the cursor
//! 5) merge results back by id, keeping the input order

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

use crate::calendar::WorkCalendar;
use crate::error::{Result, ScheduleError};
use crate::order::order_tasks;
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocateOptions {
    /// Anchor instant for the pass, usually "now".
    pub start_from: DateTime<Utc>,
    /// Re-place tasks that already have a start, not just unscheduled ones.
    pub include_scheduled: bool,
    /// Pin deadline-bearing tasks to their deadline's day.
    pub respect_deadlines: bool,
}

impl AllocateOptions {
    pub fn new(start_from: DateTime<Utc>) -> Self {
        Self {
            start_from,
            include_scheduled: false,
            respect_deadlines: true,
        }
    }

    pub fn include_scheduled(mut self, yes: bool) -> Self {
        self.include_scheduled = yes;
        self
    }

    pub fn respect_deadlines(mut self, yes: bool) -> Self {
        self.respect_deadlines = yes;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduleAllocator<'c> {
    calendar: &'c WorkCalendar,
}

impl<'c> ScheduleAllocator<'c> {
    pub fn new(calendar: &'c WorkCalendar) -> Self {
        Self { calendar }
    }

    /// Run one allocation pass.
    ///
    /// Returns the input untouched (borrowed) when nothing is eligible.
    pub fn allocate<'a>(
        &self,
        tasks: &'a [Task],
        opts: AllocateOptions,
    ) -> Result<Cow<'a, [Task]>> {
        validate_ids(tasks)?;

        let candidates: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.is_pending())
            .filter(|t| opts.include_scheduled || t.scheduled_start.is_none())
            .collect();

        if candidates.is_empty() {
            debug!(tasks = tasks.len(), "allocation pass: no candidates");
            return Ok(Cow::Borrowed(tasks));
        }

        let ordered = order_tasks(&candidates);
        let mut cursor = self.calendar.next_working_instant(opts.start_from);
        debug!(
            candidates = ordered.len(),
            include_scheduled = opts.include_scheduled,
            cursor = %cursor,
            "allocation pass"
        );

        let mut placed: HashMap<&str, Task> = HashMap::with_capacity(ordered.len());
        for task in ordered {
            let duration = task.resolved_duration().max(1);

            let start = match task.deadline.filter(|_| opts.respect_deadlines) {
                Some(deadline) => {
                    if deadline < opts.start_from {
                        debug!(task = %task.id, %deadline, "anchoring to a deadline in the past");
                    }
                    self.calendar.on_day_at_time_of(deadline, cursor)
                }
                None => {
                    let start = self.fit(cursor, duration);
                    cursor = self.advance(start, duration);
                    start
                }
            };

            trace!(task = %task.id, %start, duration, "placed");

            let mut updated = task.clone();
            updated.scheduled_start = Some(start);
            updated.duration_minutes = Some(duration);
            placed.insert(task.id.as_str(), updated);
        }

        let merged = tasks
            .iter()
            .map(|t| placed.remove(t.id.as_str()).unwrap_or_else(|| t.clone()))
            .collect::<Vec<_>>();

        Ok(Cow::Owned(merged))
    }

    /// Start instant for a task of `duration` minutes at or after `cursor`.
    ///
    /// A task that cannot finish in what is left of today moves to the next
    /// working day, unless the cursor already sits at a day's opening (the task
    /// is longer than a whole day and has to spill anyway).
    fn fit(&self, cursor: DateTime<Utc>, duration: u32) -> DateTime<Utc> {
        let cursor = self.calendar.next_working_instant(cursor);
        if self.calendar.minutes_remaining_today(cursor) < duration
            && !self.calendar.is_day_start(cursor)
        {
            return self.calendar.next_day_start(cursor);
        }
        cursor
    }

    /// Cursor position after a task placed at `start`: its end plus the break.
    fn advance(&self, start: DateTime<Utc>, duration: u32) -> DateTime<Utc> {
        let end = self.calendar.end_of_task(start, duration);
        let next = end + Duration::minutes(i64::from(self.calendar.break_minutes()));
        if self.calendar.is_past_end_of_day(next) {
            self.calendar.next_work_slot(next)
        } else {
            next
        }
    }
}

/// Results are merged back by id, so ids must be present and unique.
pub(crate) fn validate_ids(tasks: &[Task]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(tasks.len());
    for t in tasks {
        if t.id.trim().is_empty() {
            return Err(ScheduleError::MissingId);
        }
        if !seen.insert(t.id.as_str()) {
            return Err(ScheduleError::DuplicateId(t.id.clone()));
        }
    }
    Ok(())
}
