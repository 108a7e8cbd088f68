//! Allocation order over the tasks of one pass.
//!
//! Ranking (first rule that differs decides):
//! - priority DESC (missing = medium)
//! - dated before undated; between two dated tasks, earlier first
//! - resolved duration ASC (quick wins first)
//!
//! The sort is stable, so full ties keep their input order.

use std::cmp::Ordering;

use crate::task::Task;

pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    b.effective_priority()
        .rank()
        .cmp(&a.effective_priority().rank())
        .then_with(|| match (a.due_date(), b.due_date()) {
            (Some(da), Some(db)) => da.cmp(&db),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.resolved_duration().cmp(&b.resolved_duration()))
}

/// Order tasks for allocation without touching them.
pub fn order_tasks<'a>(tasks: &[&'a Task]) -> Vec<&'a Task> {
    let mut ordered = tasks.to_vec();
    ordered.sort_by(|a, b| compare_tasks(a, b));
    ordered
}
