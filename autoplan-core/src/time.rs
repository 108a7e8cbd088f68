//! Time utilities: timezone-aware parsing and wall-clock localization.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};

/// Parse a timezone name like "America/Chicago".
pub fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| ScheduleError::InvalidTime(format!("invalid timezone: {tz}")))
}

/// Parse a local time like "2026-02-20 23:59" in an IANA tz, returning UTC.
pub fn parse_local_to_utc(local: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let ndt = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M")
        .map_err(|e| ScheduleError::InvalidTime(format!("invalid local datetime '{local}': {e}")))?;

    let local_dt = tz.from_local_datetime(&ndt).single().ok_or_else(|| {
        ScheduleError::InvalidTime(format!("ambiguous or invalid local time (DST?): {local} {tz}"))
    })?;

    Ok(local_dt.with_timezone(&Utc))
}

/// Parse either an RFC 3339 timestamp or a "YYYY-MM-DD HH:MM" local time in `tz`.
pub fn parse_instant(s: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_local_to_utc(s, tz)
}

/// Resolve a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap move forward minute by minute to the first one that exists.
pub fn localize(tz: Tz, ndt: NaiveDateTime) -> DateTime<Utc> {
    let mut probe = ndt;
    // Gaps are at most a few hours; a day of probing is a hard ceiling.
    for _ in 0..(24 * 60) {
        if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
            return dt.with_timezone(&Utc);
        }
        probe += Duration::minutes(1);
    }
    Utc.from_utc_datetime(&ndt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chicago_local() {
        // Feb is CST (UTC-6)
        let utc = parse_local_to_utc("2026-02-20 23:59", chrono_tz::America::Chicago).unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-02-21T05:59:00+00:00");
    }

    #[test]
    fn test_parse_instant_accepts_rfc3339() {
        let utc = parse_instant("2026-02-20T09:00:00-06:00", Tz::UTC).unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-02-20T15:00:00+00:00");
    }

    #[test]
    fn test_parse_tz_rejects_unknown() {
        assert!(parse_tz("Mars/Olympus").is_err());
        assert_eq!(parse_tz("Europe/Madrid").unwrap(), chrono_tz::Europe::Madrid);
    }

    #[test]
    fn test_localize_skips_dst_gap() {
        // 2026-03-08 02:30 does not exist in Chicago; first valid minute is 03:00 CDT.
        let ndt = NaiveDateTime::parse_from_str("2026-03-08 02:30", "%Y-%m-%d %H:%M").unwrap();
        let utc = localize(chrono_tz::America::Chicago, ndt);
        assert_eq!(utc.to_rfc3339(), "2026-03-08T08:00:00+00:00");
    }
}
