use anyhow::{Context, Result};
use autoplan_core::{WorkCalendar, WorkCalendarConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_autoplan_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub calendar: WorkCalendarConfig,
}

impl Config {
    /// Validated working calendar for this configuration.
    pub fn work_calendar(&self) -> Result<WorkCalendar> {
        WorkCalendar::try_from(self.calendar.clone()).context("config.toml [calendar]")
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_autoplan_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    // Validate before printing so a broken file is reported, not echoed.
    cfg.work_calendar()?;
    println!("# {}", config_path()?.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn parses_partial_calendar_section() {
        let cfg: Config = toml::from_str(
            r#"
[calendar]
start_hour = 8
end_hour = 16
working_days = ["Mon", "Tue", "Wed", "Thu"]
timezone = "America/Chicago"
"#,
        )
        .unwrap();

        let cal = cfg.work_calendar().unwrap();
        assert_eq!(cal.start_hour(), 8);
        assert_eq!(cal.end_hour(), 16);
        assert_eq!(cal.break_minutes(), 15);
        assert_eq!(cal.working_days().len(), 4);
        assert!(!cal.working_days().contains(&Weekday::Fri));
    }

    #[test]
    fn empty_config_is_default_calendar() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.work_calendar().unwrap(), WorkCalendar::default());
    }

    #[test]
    fn inverted_hours_are_rejected() {
        let cfg: Config = toml::from_str("[calendar]\nstart_hour = 18\nend_hour = 9\n").unwrap();
        assert!(cfg.work_calendar().is_err());
    }
}
