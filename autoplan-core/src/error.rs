//! Error types for the scheduling engine.
//!
//! The engine is total over malformed-but-present data (missing priority,
//! duration or deadline all resolve to defaults). These variants cover the
//! structural problems that would otherwise make it drop or misplace a task.

/// Errors raised by the scheduling engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// A task in the collection has an empty id, so results cannot be merged back.
    #[error("task id must be non-empty")]
    MissingId,

    /// Two tasks in the collection share an id.
    #[error("duplicate task id: {0}")]
    DuplicateId(String),

    /// A task referenced by an event is not part of the collection.
    #[error("task not found in collection: {0}")]
    UnknownTask(String),

    /// Working-calendar configuration is unusable.
    #[error("invalid calendar: {0}")]
    InvalidCalendar(String),

    /// A timestamp or timezone could not be parsed.
    #[error("invalid time: {0}")]
    InvalidTime(String),
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_duplicate_id() {
        let err = ScheduleError::DuplicateId("t1".into());
        assert_eq!(err.to_string(), "duplicate task id: t1");
    }

    #[test]
    fn display_invalid_calendar() {
        let err = ScheduleError::InvalidCalendar("start_hour must be before end_hour".into());
        assert_eq!(
            err.to_string(),
            "invalid calendar: start_hour must be before end_hour"
        );
    }
}
