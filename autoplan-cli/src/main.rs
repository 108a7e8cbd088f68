use anyhow::{Context, Result, bail};
use autoplan_core::{
    AllocateOptions, Priority, ReschedulePolicy, ScheduleAllocator, ScheduleStats, Task,
    TaskUpdate, WorkCalendar, agenda, diff_schedules, time::parse_instant,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod ics;
mod state;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("AUTOPLAN_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "autoplan",
    version = VERSION,
    about = "Automatic task scheduling over a working calendar"
)]
struct Cli {
    /// More logging on stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Tasks(TaskCommand),

    /// Config file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Commands that read or write a task file against the configured calendar.
#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Assign start times to pending tasks and write them back
    Schedule {
        /// JSON file holding the task collection
        #[arg(long)]
        tasks: PathBuf,

        /// Anchor instant (RFC 3339 or "YYYY-MM-DD HH:MM" in the calendar zone). Default: now
        #[arg(long)]
        now: Option<String>,

        /// Re-place tasks that already have a start, not only unscheduled ones
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Pack deadline-bearing tasks sequentially instead of pinning them to their deadline day
        #[arg(long, default_value_t = false)]
        ignore_deadlines: bool,

        /// Print the changes without writing the file
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Add a task and let the reschedule policy place it
    Add {
        #[arg(long)]
        tasks: PathBuf,

        #[arg(long)]
        title: String,

        /// Task id (default: next numeric id)
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// high | medium | low
        #[arg(long)]
        priority: Option<Priority>,

        /// Deadline (RFC 3339 or "YYYY-MM-DD HH:MM" in the calendar zone)
        #[arg(long)]
        deadline: Option<String>,

        /// Estimated minutes
        #[arg(long)]
        estimate: Option<u32>,

        #[arg(long)]
        now: Option<String>,

        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Mark a task completed and pull later work forward
    Complete {
        #[arg(long)]
        tasks: PathBuf,

        #[arg(long)]
        id: String,

        #[arg(long)]
        now: Option<String>,

        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Summary of pending work
    Stats {
        #[arg(long)]
        tasks: PathBuf,

        #[arg(long)]
        now: Option<String>,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the plan grouped by day
    Agenda {
        #[arg(long)]
        tasks: PathBuf,
    },

    /// Export planned tasks as an ICS calendar
    ExportIcs {
        #[arg(long)]
        tasks: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Prefix for event titles
        #[arg(long, default_value = "")]
        prefix: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config.toml if none exists
    Init,

    /// Print the effective configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(),
            ConfigCommand::Show => config::show_config(),
        },
        Command::Tasks(command) => {
            let cal = config::load_config()?.work_calendar()?;
            run(command, &cal)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "autoplan_core=debug,autoplan=debug",
        _ => "autoplan_core=trace,autoplan=trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn run(command: TaskCommand, cal: &WorkCalendar) -> Result<()> {
    match command {
        TaskCommand::Schedule {
            tasks,
            now,
            all,
            ignore_deadlines,
            dry_run,
        } => {
            let now = resolve_now(now.as_deref(), cal)?;
            let current = state::read_tasks(&tasks)?;
            let opts = AllocateOptions::new(now)
                .include_scheduled(all)
                .respect_deadlines(!ignore_deadlines);

            let planned = ScheduleAllocator::new(cal).allocate(&current, opts)?;
            let updates = diff_schedules(&current, &planned);
            print_updates(&updates, cal);
            if !updates.is_empty() {
                save(&tasks, &planned, dry_run)?;
            }
        }

        TaskCommand::Add {
            tasks,
            title,
            id,
            description,
            priority,
            deadline,
            estimate,
            now,
            dry_run,
        } => {
            let now = resolve_now(now.as_deref(), cal)?;
            let mut current = state::read_tasks(&tasks)?;

            let id = id.unwrap_or_else(|| state::next_task_id(&current));
            if current.iter().any(|t| t.id == id) {
                bail!("task id already in use: {id}");
            }

            let mut task = Task::new(id, title);
            task.description = description;
            task.priority = priority;
            task.estimated_minutes = estimate;
            task.deadline = deadline
                .as_deref()
                .map(|d| parse_instant(d, cal.timezone()))
                .transpose()
                .context("--deadline")?;

            current.push(task.clone());
            let replanned = ReschedulePolicy::new(cal).on_task_added(&current, &task, now)?;
            println!("Added {} ({})", task.id, task.title);
            print_updates(&diff_schedules(&current, &replanned), cal);
            save(&tasks, &replanned, dry_run)?;
        }

        TaskCommand::Complete {
            tasks,
            id,
            now,
            dry_run,
        } => {
            let now = resolve_now(now.as_deref(), cal)?;
            let mut current = state::read_tasks(&tasks)?;

            let Some(idx) = current.iter().position(|t| t.id == id) else {
                bail!("no task with id {id} in {}", tasks.display());
            };
            if current[idx].completed {
                println!("Task {id} is already completed");
                return Ok(());
            }
            current[idx].completed = true;
            let completed = current[idx].clone();

            let replanned =
                ReschedulePolicy::new(cal).on_task_completed(&current, &completed, now)?;
            println!("Completed {} ({})", completed.id, completed.title);
            print_updates(&diff_schedules(&current, &replanned), cal);
            save(&tasks, &replanned, dry_run)?;
        }

        TaskCommand::Stats { tasks, now, json } => {
            let now = resolve_now(now.as_deref(), cal)?;
            let current = state::read_tasks(&tasks)?;
            let stats = ScheduleStats::compute(&current, cal, now);

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Pending tasks:  {}", stats.total_tasks);
                println!("  scheduled:    {}", stats.scheduled_tasks);
                println!("  unscheduled:  {}", stats.unscheduled_tasks);
                println!(
                    "Total work:     {}h ({} working days)",
                    stats.total_hours, stats.total_days
                );
                match stats.estimated_completion {
                    Some(done) => println!("Done by:        {}", format_local(done, cal)),
                    None => println!("Done by:        -"),
                }
            }
        }

        TaskCommand::Agenda { tasks } => {
            let current = state::read_tasks(&tasks)?;
            let days = agenda(&current, cal);
            if days.is_empty() {
                println!("Nothing planned. Run: autoplan schedule --tasks {}", tasks.display());
                return Ok(());
            }

            for day in &days {
                println!("## {}", day.day.format("%a %Y-%m-%d"));
                for e in &day.entries {
                    println!(
                        "- {}-{} [{:?}] {} ({})",
                        cal.local(e.start).format("%H:%M"),
                        cal.local(e.end).format("%H:%M"),
                        e.task.effective_priority(),
                        e.task.title,
                        e.task.id
                    );
                }
                println!();
            }
        }

        TaskCommand::ExportIcs { tasks, out, prefix } => {
            let current = state::read_tasks(&tasks)?;
            let days = agenda(&current, cal);
            let ics = ics::events_to_ics(&ics::agenda_to_events(&days, &prefix));

            match out {
                Some(path) => {
                    std::fs::write(&path, ics)
                        .with_context(|| format!("write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{ics}"),
            }
        }
    }

    Ok(())
}

fn resolve_now(now: Option<&str>, cal: &WorkCalendar) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => parse_instant(s, cal.timezone()).context("--now"),
        None => Ok(Utc::now()),
    }
}

fn save(path: &Path, tasks: &[Task], dry_run: bool) -> Result<()> {
    if dry_run {
        println!("(dry run: {} not written)", path.display());
        return Ok(());
    }
    state::write_tasks(path, tasks)?;
    tracing::debug!(path = %path.display(), tasks = tasks.len(), "tasks written");
    Ok(())
}

fn print_updates(updates: &[TaskUpdate], cal: &WorkCalendar) {
    if updates.is_empty() {
        println!("No schedule changes.");
        return;
    }
    for u in updates {
        let start = u
            .scheduled_start
            .map(|s| format_local(s, cal))
            .unwrap_or_else(|| "-".to_string());
        let minutes = u.duration_minutes.map(|m| format!("{m}m")).unwrap_or_default();
        println!("{:>8}  {}  {}", u.id, start, minutes);
    }
}

fn format_local(at: DateTime<Utc>, cal: &WorkCalendar) -> String {
    at.with_timezone(&cal.timezone()).format("%a %Y-%m-%d %H:%M %Z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_and_task_commands_route_apart() {
        let cli = Cli::try_parse_from(["autoplan", "config", "show"]).unwrap();
        assert!(matches!(cli.command, Command::Config { command: ConfigCommand::Show }));

        let cli = Cli::try_parse_from(["autoplan", "-v", "schedule", "--tasks", "t.json", "--all"])
            .unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(
            cli.command,
            Command::Tasks(TaskCommand::Schedule { all: true, dry_run: false, .. })
        ));
    }
}
