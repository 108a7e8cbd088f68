//! Task model consumed and produced by the scheduling engine.
//!
//! Records are owned by an external store; the engine only reads the fields
//! below and writes `scheduled_start` / `duration_minutes`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minutes assumed for a task with no usable estimate.
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank, higher schedules first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Core task record.
///
/// `deadline` is what the task is due by and is never written by the engine.
/// `scheduled_start` is the start instant the allocator assigned. Older records
/// that carry a single `due_date` load it as the deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub completed: bool,

    /// Absent is treated as medium.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    #[serde(default, alias = "due_date", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_start: Option<DateTime<Utc>>,

    /// Minutes, as estimated by whoever created the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,

    /// Minutes. Authoritative over `estimated_minutes` once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent_minutes: Option<u32>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            completed: false,
            priority: None,
            deadline: None,
            scheduled_start: None,
            estimated_minutes: None,
            duration_minutes: None,
            time_spent_minutes: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_scheduled_start(mut self, start: DateTime<Utc>) -> Self {
        self.scheduled_start = Some(start);
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn effective_priority(&self) -> Priority {
        self.priority.unwrap_or(Priority::Medium)
    }

    /// Duration used for allocation: `duration_minutes`, then
    /// `estimated_minutes`, then the 30 minute default. Zero counts as unset.
    pub fn resolved_duration(&self) -> u32 {
        self.duration_minutes
            .filter(|m| *m > 0)
            .or(self.estimated_minutes.filter(|m| *m > 0))
            .unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    /// Duration as reported in summaries: unset contributes nothing.
    pub fn reported_minutes(&self) -> u32 {
        self.duration_minutes
            .filter(|m| *m > 0)
            .or(self.estimated_minutes)
            .unwrap_or(0)
    }

    /// The single date a task is "on": its assigned start if it has one,
    /// otherwise its deadline.
    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.scheduled_start.or(self.deadline)
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn duration_prefers_duration_then_estimate_then_default() {
        let t = Task::new("a", "a").with_estimate(45).with_duration(20);
        assert_eq!(t.resolved_duration(), 20);

        let t = Task::new("b", "b").with_estimate(45);
        assert_eq!(t.resolved_duration(), 45);

        let t = Task::new("c", "c").with_estimate(0).with_duration(0);
        assert_eq!(t.resolved_duration(), DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn reported_minutes_skips_default() {
        assert_eq!(Task::new("a", "a").reported_minutes(), 0);
        assert_eq!(Task::new("b", "b").with_estimate(40).reported_minutes(), 40);
    }

    #[test]
    fn due_date_prefers_scheduled_start() {
        let deadline = Utc.with_ymd_and_hms(2026, 3, 6, 17, 0, 0).unwrap();
        let start = Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap();

        let t = Task::new("a", "a").with_deadline(deadline);
        assert_eq!(t.due_date(), Some(deadline));

        let t = t.with_scheduled_start(start);
        assert_eq!(t.due_date(), Some(start));
        assert_eq!(t.deadline, Some(deadline));
    }

    #[test]
    fn missing_priority_is_medium() {
        assert_eq!(Task::new("a", "a").effective_priority(), Priority::Medium);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn legacy_due_date_loads_as_deadline() {
        let json = r#"{
            "id": "7",
            "title": "report",
            "priority": "high",
            "due_date": "2026-03-06T17:00:00Z",
            "estimated_minutes": 60
        }"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.priority, Some(Priority::High));
        assert_eq!(
            t.deadline,
            Some(Utc.with_ymd_and_hms(2026, 3, 6, 17, 0, 0).unwrap())
        );
        assert!(t.scheduled_start.is_none());
        assert!(!t.completed);
    }
}
