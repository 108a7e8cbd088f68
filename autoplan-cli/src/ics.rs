use autoplan_core::{AgendaDay, Priority};
use chrono::{DateTime, Utc};

pub struct CalendarEvent {
    pub uid: String,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub summary: String,
    pub description: String,
}

/// Turn a day-grouped plan into time-blocked events, one per task.
pub fn agenda_to_events(days: &[AgendaDay<'_>], prefix: &str) -> Vec<CalendarEvent> {
    days.iter()
        .flat_map(|d| d.entries.iter())
        .map(|e| {
            let priority = match e.task.effective_priority() {
                Priority::High => "high",
                Priority::Medium => "medium",
                Priority::Low => "low",
            };
            let mut description = format!(
                "TaskId: {}\nPriority: {}\nMinutes: {}\n",
                e.task.id,
                priority,
                e.task.resolved_duration()
            );
            if let Some(deadline) = e.task.deadline {
                description.push_str(&format!("Deadline: {}\n", deadline.to_rfc3339()));
            }
            if let Some(notes) = &e.task.description {
                description.push_str(notes);
                description.push('\n');
            }

            CalendarEvent {
                // Stable per task so re-imports update instead of duplicating.
                uid: format!("autoplan-{}@autoplan", e.task.id),
                start_utc: e.start,
                end_utc: e.end,
                summary: format!("{}{}", prefix, e.task.title),
                description,
            }
        })
        .collect()
}

/// Render events as an iCalendar (RFC 5545) document.
///
/// Lines end in CRLF and times are written in UTC (`...Z`), so importers never
/// have to resolve a zone.
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    const STAMP: &str = "%Y%m%dT%H%M%SZ";

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Autoplan//EN".to_string(),
    ];
    for e in events {
        lines.extend([
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", e.uid),
            format!("DTSTART:{}", e.start_utc.format(STAMP)),
            format!("DTEND:{}", e.end_utc.format(STAMP)),
            format!("SUMMARY:{}", escape_text(&e.summary)),
            format!("DESCRIPTION:{}", escape_text(&e.description)),
            "END:VEVENT".to_string(),
        ]);
    }
    lines.push("END:VCALENDAR".to_string());

    let mut doc = lines.join("\r\n");
    doc.push_str("\r\n");
    doc
}

/// TEXT value escaping: backslash, newline, comma and semicolon.
fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            ',' | ';' => {
                out.push('\\');
                out.push(c);
            }
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
