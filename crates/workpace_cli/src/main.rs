mod cli;

use clap::Parser;
use clap::error::ErrorKind;
use cli::{
    Cli, Command, ConfigOverrideTarget, ReportCommand, TrackCommand, parse_config_override,
};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use workpace_core::config::{self, Config, ConfigOverrides};
use workpace_core::error::AppError;
use workpace_core::metrics::{
    EfficiencySnapshot, GoalStanding, TaskStats, Window, clamp_target, parse_weekday,
};
use workpace_core::model::{Task, parse_due_date};
use workpace_core::report_api::{self, GoalReport, WindowReport};
use workpace_core::task_api::{self, NewTask, TaskUpdate, TrackingOutcome};

const LOG_ENV_VAR: &str = "WORKPACE_LOG";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Planned")]
    planned: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Due")]
    due: String,
}

impl TaskRow {
    fn from_task(task: &Task) -> Self {
        let status = if task.is_tracking() {
            format!("{} (tracking)", task.status)
        } else {
            task.status.to_string()
        };
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status,
            priority: task.priority.to_string(),
            planned: format_minutes(u64::from(task.planned_time)),
            actual: format_minutes(u64::from(task.actual_time)),
            due: task
                .due_date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl MetricRow {
    fn new(metric: &'static str, value: String) -> Self {
        Self { metric, value }
    }
}

fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn print_table<I, T>(rows: I)
where
    I: IntoIterator<Item = T>,
    T: Tabled,
{
    println!("{}", Table::new(rows).with(Style::psql()));
}

fn print_task_or_json(json: bool, verb: &str, task: &Task) -> Result<(), AppError> {
    if json {
        print_json(task)
    } else {
        println!("{verb} task: {} ({})", task.title, task.id);
        Ok(())
    }
}

fn print_task_details(task: &Task) {
    let mut rows = vec![
        MetricRow::new("id", task.id.clone()),
        MetricRow::new("title", task.title.clone()),
        MetricRow::new("status", task.status.to_string()),
        MetricRow::new("priority", task.priority.to_string()),
        MetricRow::new("planned", format_minutes(u64::from(task.planned_time))),
        MetricRow::new("actual", format_minutes(u64::from(task.actual_time))),
        MetricRow::new("created", task.created_at.to_string()),
    ];
    if !task.description.is_empty() {
        rows.push(MetricRow::new("description", task.description.clone()));
    }
    if let Some(due_date) = task.due_date {
        rows.push(MetricRow::new("due", due_date.to_string()));
    }
    if let Some(completed_at) = task.completed_at {
        rows.push(MetricRow::new("completed", completed_at.to_string()));
    }
    if let Some(started_at) = task.tracking_started_at {
        rows.push(MetricRow::new("tracking since", started_at.to_string()));
    }
    print_table(rows);
}

fn snapshot_rows(snapshot: &EfficiencySnapshot) -> Vec<MetricRow> {
    vec![
        MetricRow::new("efficiency", format!("{:.2}%", snapshot.efficiency)),
        MetricRow::new(
            "completed",
            format!("{} / {}", snapshot.completed_tasks, snapshot.total_tasks),
        ),
        MetricRow::new("planned", format_minutes(snapshot.total_planned_time)),
        MetricRow::new("actual", format_minutes(snapshot.total_actual_time)),
    ]
}

fn print_window_report(report: &WindowReport) {
    let heading = match report.window {
        Window::Daily => "Daily efficiency",
        Window::Weekly => "Weekly efficiency",
        Window::Overall => "Overall efficiency",
    };
    match report.range {
        Some(range) => println!("{heading} ({} .. {})", range.start.date(), range.end.date()),
        None => println!("{heading}"),
    }
    print_table(snapshot_rows(&report.snapshot));
}

fn print_stats(stats: &TaskStats) {
    println!("Task statistics");
    let mut rows = snapshot_rows(&stats.snapshot);
    rows.extend([
        MetricRow::new("completion rate", format!("{:.2}%", stats.completion_rate)),
        MetricRow::new("in progress", stats.in_progress_tasks.to_string()),
        MetricRow::new("pending", stats.pending_tasks.to_string()),
        MetricRow::new("high priority", stats.high_priority_tasks.to_string()),
        MetricRow::new("medium priority", stats.medium_priority_tasks.to_string()),
        MetricRow::new("low priority", stats.low_priority_tasks.to_string()),
    ]);
    print_table(rows);
}

fn print_goal(report: &GoalReport) {
    let goal = &report.goal;
    println!("Current efficiency: {:.1}%", goal.efficiency);
    println!("Target efficiency: {:.0}%", goal.target);
    println!("Progress: {:.1}%", goal.progress);
    if goal.achieved {
        println!("Goal achieved!");
    } else {
        println!("Need {:.1}% more", goal.gap);
    }
    let standing = match goal.standing {
        GoalStanding::Excellent => "Excellent",
        GoalStanding::GoodProgress => "Good progress",
        GoalStanding::NeedsImprovement => "Needs improvement",
    };
    println!("Standing: {standing}");
}

fn print_tracking(json: bool, verb: &str, outcome: &TrackingOutcome) -> Result<(), AppError> {
    if json {
        return print_json(outcome);
    }

    for stopped in &outcome.stopped {
        println!("Stopped tracking: {} ({})", stopped.title, stopped.id);
    }
    if outcome.minutes > 0 {
        println!(
            "{verb} tracking: {} ({}) +{}",
            outcome.task.title,
            outcome.task.id,
            format_minutes(u64::from(outcome.minutes))
        );
    } else {
        println!("{verb} tracking: {} ({})", outcome.task.title, outcome.task.id);
    }
    Ok(())
}

fn parse_due_argument(raw: &str) -> Result<Option<time::Date>, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_due_date(trimmed).map(Some)
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn overrides_from_cli(cli: &Cli) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for raw in &cli.config_override {
        let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Owner => overrides.owner = Some(parsed.value),
            ConfigOverrideTarget::WeekStart => {
                let weekday = parse_weekday(&parsed.value).ok_or_else(|| {
                    AppError::invalid_input(format!("unknown week_start '{}'", parsed.value))
                })?;
                overrides.week_start = Some(weekday);
            }
            ConfigOverrideTarget::TargetEfficiency => {
                let target = parsed.value.parse::<f64>().map_err(|_| {
                    AppError::invalid_input("target_efficiency must be a number")
                })?;
                overrides.target_efficiency = Some(clamp_target(target));
            }
        }
    }

    if let Some(user) = cli.user.as_ref() {
        overrides.owner = Some(user.clone());
    }

    Ok(overrides)
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!(error = %err, "falling back to default configuration");
        eprintln!("WARNING: {err}");
    }
    let overrides = overrides_from_cli(cli)?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli)?;
    let owner = config.owner();

    match cli.command {
        Command::Add {
            title,
            planned,
            actual,
            priority,
            status,
            due,
            description,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };
            let due_date = match due.as_deref() {
                Some(raw) => parse_due_argument(raw)?,
                None => None,
            };

            let task = task_api::add_task(
                owner,
                NewTask {
                    title,
                    description,
                    status,
                    priority,
                    planned_time: planned.unwrap_or(0),
                    actual_time: actual,
                    due_date,
                },
            )?;
            print_task_or_json(cli.json, "Added", &task)?;
        }
        Command::List => {
            let tasks = task_api::list_tasks(owner)?;
            if cli.json {
                print_json(&tasks)?;
            } else if tasks.is_empty() {
                println!("No tasks yet.");
            } else {
                print_table(tasks.iter().map(TaskRow::from_task));
            }
        }
        Command::Show { id } => {
            let task = task_api::get_task(owner, &id)?;
            if cli.json {
                print_json(&task)?;
            } else {
                print_task_details(&task);
            }
        }
        Command::Edit {
            id,
            title,
            planned,
            actual,
            priority,
            status,
            due,
            description,
        } => {
            let due_date = due.as_deref().map(parse_due_argument).transpose()?;
            let update = TaskUpdate {
                title,
                description,
                status,
                priority,
                planned_time: planned,
                actual_time: actual,
                due_date,
            };
            let task = task_api::update_task(owner, &id, update)?;
            print_task_or_json(cli.json, "Updated", &task)?;
        }
        Command::Done { id } => {
            let task = task_api::complete_task(owner, &id)?;
            print_task_or_json(cli.json, "Completed", &task)?;
        }
        Command::Delete { id } => {
            let task = task_api::delete_task(owner, &id)?;
            print_task_or_json(cli.json, "Deleted", &task)?;
        }
        Command::Track { action } => match action {
            TrackCommand::Start { id } => {
                let outcome = task_api::start_tracking(owner, &id)?;
                print_tracking(cli.json, "Started", &outcome)?;
            }
            TrackCommand::Stop { id } => {
                let outcome = task_api::stop_tracking(owner, &id)?;
                print_tracking(cli.json, "Stopped", &outcome)?;
            }
            TrackCommand::Log { id, minutes } => {
                let task = task_api::log_time(owner, &id, minutes)?;
                if cli.json {
                    print_json(&task)?;
                } else {
                    println!(
                        "Logged {} on task: {} ({}), total {}",
                        format_minutes(u64::from(minutes)),
                        task.title,
                        task.id,
                        format_minutes(u64::from(task.actual_time))
                    );
                }
            }
        },
        Command::Report { report } => match report {
            ReportCommand::Stats => {
                let stats = report_api::stats_report(owner)?;
                if cli.json {
                    print_json(&stats)?;
                } else {
                    print_stats(&stats);
                }
            }
            ReportCommand::Daily | ReportCommand::Weekly | ReportCommand::Overall => {
                let report = match report {
                    ReportCommand::Daily => report_api::daily_report(owner)?,
                    ReportCommand::Weekly => report_api::weekly_report(owner, config.week_start())?,
                    _ => report_api::overall_report(owner)?,
                };
                if cli.json {
                    print_json(&report)?;
                } else {
                    print_window_report(&report);
                }
            }
        },
        Command::Goal { target } => {
            let target = target.unwrap_or_else(|| config.target_efficiency());
            let report = report_api::goal_report(owner, target)?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_goal(&report);
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
