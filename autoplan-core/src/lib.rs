//! autoplan-core: automatic task scheduling over a working calendar.
//!
//! Pure and synchronous. Every operation takes the current instant explicitly
//! and returns a new task collection instead of mutating its input.

pub mod agenda;
pub mod allocator;
pub mod calendar;
pub mod diff;
pub mod error;
pub mod order;
pub mod reschedule;
pub mod stats;
pub mod task;
pub mod time;

pub use agenda::{agenda, AgendaDay, AgendaEntry};
pub use allocator::{AllocateOptions, ScheduleAllocator};
pub use calendar::{WorkCalendar, WorkCalendarConfig};
pub use diff::{diff_schedules, TaskUpdate};
pub use error::{Result, ScheduleError};
pub use order::{compare_tasks, order_tasks};
pub use reschedule::{Reflow, ReschedulePolicy};
pub use stats::ScheduleStats;
pub use task::{Priority, Task, DEFAULT_DURATION_MINUTES};
