use clap::{Parser, Subcommand};
use workpace_core::model::{Priority, TaskStatus};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Act on behalf of this owner instead of the configured one
    #[arg(long, value_name = "OWNER", global = true)]
    pub user: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: workpace add "Write report" --planned 60 --priority high
    Add {
        title: Option<String>,
        /// Planned time in minutes
        #[arg(long, value_name = "MINUTES")]
        planned: Option<u32>,
        /// Time already spent in minutes
        #[arg(long, value_name = "MINUTES")]
        actual: Option<u32>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Due date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List tasks, newest first
    ///
    /// Example: workpace list
    List,
    /// Show details of a task
    ///
    /// Example: workpace show task-1
    Show { id: String },
    /// Edit fields of a task
    ///
    /// Example: workpace edit task-1 --actual 45 --status in-progress
    /// Example: workpace edit task-1 --due none
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_name = "MINUTES")]
        planned: Option<u32>,
        #[arg(long, value_name = "MINUTES")]
        actual: Option<u32>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Due date (YYYY-MM-DD), or "none" to clear it
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Mark a task as completed
    ///
    /// Example: workpace done task-1
    Done { id: String },
    /// Delete a task
    ///
    /// Example: workpace delete task-1
    Delete { id: String },
    /// Track time spent on a task
    ///
    /// Example: workpace track start task-1
    /// Example: workpace track log task-1 25
    Track {
        #[command(subcommand)]
        action: TrackCommand,
    },
    /// Show efficiency reports
    ///
    /// Example: workpace report weekly
    Report {
        #[command(subcommand)]
        report: ReportCommand,
    },
    /// Show progress toward the efficiency goal
    ///
    /// Example: workpace goal --target 90
    Goal {
        /// Target efficiency in percent (0-100)
        #[arg(long, value_name = "PERCENT")]
        target: Option<f64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TrackCommand {
    /// Start the timer on a task, stopping any other running timer
    Start { id: String },
    /// Stop the timer and add the elapsed minutes
    Stop { id: String },
    /// Add minutes spent on a task by hand
    Log { id: String, minutes: u32 },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ReportCommand {
    /// Tasks created today
    Daily,
    /// Tasks created this week
    Weekly,
    /// All tasks
    Overall,
    /// All tasks, with status and priority breakdown
    Stats,
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Owner,
    WeekStart,
    TargetEfficiency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field = canonicalize_flag_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "owner" | "user" => ConfigOverrideTarget::Owner,
        "week_start" | "weekstart" => ConfigOverrideTarget::WeekStart,
        "target_efficiency" | "target" => ConfigOverrideTarget::TargetEfficiency,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("{CONFIG_OVERRIDE_FLAG} {canonical_field} needs a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
