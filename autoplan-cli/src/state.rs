use anyhow::{Context, Result};
use autoplan_core::Task;
use std::fs;
use std::path::{Path, PathBuf};

/// `$AUTOPLAN_HOME`, or `~/.autoplan`.
pub fn autoplan_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("AUTOPLAN_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".autoplan"))
}

pub fn ensure_autoplan_home() -> Result<PathBuf> {
    let dir = autoplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Read a JSON array of tasks. A missing file is an empty collection.
pub fn read_tasks(path: &Path) -> Result<Vec<Task>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&s).with_context(|| format!("parse tasks in {}", path.display()))
}

pub fn write_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(tasks).context("serialize tasks")?;
    fs::write(path, json + "\n").with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Next free numeric id: one past the largest numeric id in use.
pub fn next_task_id(tasks: &[Task]) -> String {
    let max = tasks.iter().filter_map(|t| t.id.parse::<u64>().ok()).max().unwrap_or(0);
    (max + 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoplan_core::Priority;

    #[test]
    fn tasks_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.json");

        assert!(read_tasks(&path).unwrap().is_empty());

        let tasks = vec![
            Task::new("1", "write report").with_priority(Priority::High).with_estimate(90),
            Task::new("2", "email").completed(),
        ];
        write_tasks(&path, &tasks).unwrap();
        assert_eq!(read_tasks(&path).unwrap(), tasks);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(read_tasks(&path).is_err());
    }

    #[test]
    fn next_id_skips_non_numeric() {
        let tasks = vec![Task::new("3", "a"), Task::new("abc", "b"), Task::new("10", "c")];
        assert_eq!(next_task_id(&tasks), "11");
        assert_eq!(next_task_id(&[]), "1");
    }
}
