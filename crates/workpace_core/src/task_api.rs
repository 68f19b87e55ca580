use crate::error::AppError;
use crate::model::{Priority, Task, TaskStatus};
use crate::storage::json_store;
use serde::Serialize;
use std::path::Path;
use time::{Date, OffsetDateTime};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub planned_time: u32,
    pub actual_time: Option<u32>,
    pub due_date: Option<Date>,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub planned_time: Option<u32>,
    pub actual_time: Option<u32>,
    /// `Some(None)` clears the due date.
    pub due_date: Option<Option<Date>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackingOutcome {
    pub task: Task,
    /// Whole minutes added to `actual_time` by this call.
    pub minutes: u32,
    /// Timers of other tasks stopped to make room for this one.
    pub stopped: Vec<Task>,
}

pub fn add_task(owner: &str, new_task: NewTask) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    add_task_with_path(&path, owner, new_task, OffsetDateTime::now_utc())
}

pub fn list_tasks(owner: &str) -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    list_tasks_with_path(&path, owner)
}

pub fn get_task(owner: &str, id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    get_task_with_path(&path, owner, id)
}

pub fn update_task(owner: &str, id: &str, update: TaskUpdate) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    update_task_with_path(&path, owner, id, update, OffsetDateTime::now_utc())
}

pub fn complete_task(owner: &str, id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    complete_task_with_path(&path, owner, id, OffsetDateTime::now_utc())
}

pub fn delete_task(owner: &str, id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    delete_task_with_path(&path, owner, id)
}

pub fn start_tracking(owner: &str, id: &str) -> Result<TrackingOutcome, AppError> {
    let path = json_store::store_path()?;
    start_tracking_with_path(&path, owner, id, OffsetDateTime::now_utc())
}

pub fn stop_tracking(owner: &str, id: &str) -> Result<TrackingOutcome, AppError> {
    let path = json_store::store_path()?;
    stop_tracking_with_path(&path, owner, id, OffsetDateTime::now_utc())
}

pub fn log_time(owner: &str, id: &str, minutes: u32) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    log_time_with_path(&path, owner, id, minutes)
}

fn add_task_with_path(
    path: &Path,
    owner: &str,
    new_task: NewTask,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let owner = require_owner(owner)?;
    let title = new_task.title.trim();
    if title.is_empty() {
        return Err(AppError::invalid_input("title is required"));
    }
    if new_task.planned_time == 0 {
        return Err(AppError::invalid_input("planned time must be greater than 0"));
    }

    let mut task = Task {
        id: format!("task-{}", now.unix_timestamp_nanos()),
        owner_id: owner.to_string(),
        title: title.to_string(),
        description: new_task.description.unwrap_or_default(),
        status: TaskStatus::Pending,
        priority: new_task.priority.unwrap_or_default(),
        planned_time: new_task.planned_time,
        actual_time: new_task.actual_time.unwrap_or(0),
        due_date: new_task.due_date,
        created_at: now,
        completed_at: None,
        tracking_started_at: None,
    };
    task.set_status(new_task.status.unwrap_or(TaskStatus::Pending), now);

    let mut tasks = json_store::load_tasks(path)?;
    tasks.push(task.clone());
    json_store::save_tasks(path, &tasks)?;

    info!(task_id = %task.id, owner = %task.owner_id, planned = task.planned_time, "task added");
    Ok(task)
}

fn list_tasks_with_path(path: &Path, owner: &str) -> Result<Vec<Task>, AppError> {
    let owner = require_owner(owner)?;
    let mut tasks: Vec<Task> = json_store::load_tasks(path)?
        .into_iter()
        .filter(|task| task.owner_id == owner)
        .collect();
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(tasks)
}

fn get_task_with_path(path: &Path, owner: &str, id: &str) -> Result<Task, AppError> {
    let owner = require_owner(owner)?;
    let trimmed_id = require_id(id)?;

    json_store::load_tasks(path)?
        .into_iter()
        .find(|task| task.id == trimmed_id && task.owner_id == owner)
        .ok_or_else(|| AppError::not_found("task not found"))
}

fn update_task_with_path(
    path: &Path,
    owner: &str,
    id: &str,
    update: TaskUpdate,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let owner = require_owner(owner)?;
    let trimmed_id = require_id(id)?;

    let mut tasks = json_store::load_tasks(path)?;
    let task = find_owned_mut(&mut tasks, owner, trimmed_id)?;

    if let Some(title) = update.title.as_deref().map(str::trim)
        && !title.is_empty()
    {
        task.title = title.to_string();
    }
    if let Some(description) = update.description {
        task.description = description;
    }
    if let Some(priority) = update.priority {
        task.priority = priority;
    }
    if let Some(planned_time) = update.planned_time
        && planned_time > 0
    {
        task.planned_time = planned_time;
    }
    if let Some(actual_time) = update.actual_time {
        task.actual_time = actual_time;
    }
    if let Some(due_date) = update.due_date {
        task.due_date = due_date;
    }
    if let Some(status) = update.status {
        if status == TaskStatus::Completed {
            stop_timer(task, now);
        }
        task.set_status(status, now);
    }

    let updated = task.clone();
    json_store::save_tasks(path, &tasks)?;

    info!(task_id = %updated.id, status = %updated.status, "task updated");
    Ok(updated)
}

fn complete_task_with_path(
    path: &Path,
    owner: &str,
    id: &str,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let update = TaskUpdate {
        status: Some(TaskStatus::Completed),
        ..TaskUpdate::default()
    };
    update_task_with_path(path, owner, id, update, now)
}

fn delete_task_with_path(path: &Path, owner: &str, id: &str) -> Result<Task, AppError> {
    let owner = require_owner(owner)?;
    let trimmed_id = require_id(id)?;

    let mut tasks = json_store::load_tasks(path)?;
    let index = tasks
        .iter()
        .position(|task| task.id == trimmed_id && task.owner_id == owner)
        .ok_or_else(|| AppError::not_found("task not found"))?;

    let removed = tasks.remove(index);
    json_store::save_tasks(path, &tasks)?;

    info!(task_id = %removed.id, "task deleted");
    Ok(removed)
}

fn start_tracking_with_path(
    path: &Path,
    owner: &str,
    id: &str,
    now: OffsetDateTime,
) -> Result<TrackingOutcome, AppError> {
    let owner = require_owner(owner)?;
    let trimmed_id = require_id(id)?;

    let mut tasks = json_store::load_tasks(path)?;
    let task = find_owned_mut(&mut tasks, owner, trimmed_id)?;
    if task.is_completed() {
        return Err(AppError::invalid_input("task already completed"));
    }
    if task.is_tracking() {
        return Err(AppError::invalid_input("task is already being tracked"));
    }
    task.tracking_started_at = Some(now);

    let mut stopped = Vec::new();
    for other in tasks
        .iter_mut()
        .filter(|task| task.owner_id == owner && task.id != trimmed_id)
    {
        if other.is_tracking() {
            let minutes = stop_timer(other, now);
            info!(task_id = %other.id, minutes, "tracking stopped");
            stopped.push(other.clone());
        }
    }

    let started = find_owned_mut(&mut tasks, owner, trimmed_id)?.clone();
    json_store::save_tasks(path, &tasks)?;

    info!(task_id = %started.id, "tracking started");
    Ok(TrackingOutcome {
        task: started,
        minutes: 0,
        stopped,
    })
}

fn stop_tracking_with_path(
    path: &Path,
    owner: &str,
    id: &str,
    now: OffsetDateTime,
) -> Result<TrackingOutcome, AppError> {
    let owner = require_owner(owner)?;
    let trimmed_id = require_id(id)?;

    let mut tasks = json_store::load_tasks(path)?;
    let task = find_owned_mut(&mut tasks, owner, trimmed_id)?;
    if !task.is_tracking() {
        return Err(AppError::invalid_input("task is not being tracked"));
    }

    let minutes = stop_timer(task, now);
    let stopped = task.clone();
    json_store::save_tasks(path, &tasks)?;

    info!(task_id = %stopped.id, minutes, "tracking stopped");
    Ok(TrackingOutcome {
        task: stopped,
        minutes,
        stopped: Vec::new(),
    })
}

fn log_time_with_path(path: &Path, owner: &str, id: &str, minutes: u32) -> Result<Task, AppError> {
    let owner = require_owner(owner)?;
    let trimmed_id = require_id(id)?;
    if minutes == 0 {
        return Err(AppError::invalid_input("minutes must be greater than 0"));
    }

    let mut tasks = json_store::load_tasks(path)?;
    let task = find_owned_mut(&mut tasks, owner, trimmed_id)?;
    task.actual_time = task.actual_time.saturating_add(minutes);
    let updated = task.clone();
    json_store::save_tasks(path, &tasks)?;

    info!(task_id = %updated.id, minutes, "time logged");
    Ok(updated)
}

/// Clear a running timer and credit its whole elapsed minutes.
fn stop_timer(task: &mut Task, now: OffsetDateTime) -> u32 {
    let Some(started_at) = task.tracking_started_at.take() else {
        return 0;
    };

    let elapsed = (now - started_at).whole_minutes().max(0);
    let minutes = u32::try_from(elapsed).unwrap_or(u32::MAX);
    task.actual_time = task.actual_time.saturating_add(minutes);
    minutes
}

fn find_owned_mut<'a>(
    tasks: &'a mut [Task],
    owner: &str,
    id: &str,
) -> Result<&'a mut Task, AppError> {
    tasks
        .iter_mut()
        .find(|task| task.id == id && task.owner_id == owner)
        .ok_or_else(|| AppError::not_found("task not found"))
}

fn require_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed)
}

fn require_owner(owner: &str) -> Result<&str, AppError> {
    let trimmed = owner.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("owner is required"));
    }
    Ok(trimmed)
}
