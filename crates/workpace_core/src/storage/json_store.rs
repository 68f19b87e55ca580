use super::TaskStore;
use crate::error::AppError;
use crate::metrics::{DateRange, select};
use crate::model::Task;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "tasks.json";
const STORE_ENV_VAR: &str = "WORKPACE_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredTasks {
    schema_version: u32,
    tasks: Vec<Task>,
}

/// Task store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(store_path()?))
    }
}

impl TaskStore for JsonStore {
    fn find_tasks(
        &self,
        owner_id: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<Task>, AppError> {
        let mut tasks = load_tasks(&self.path)?;
        tasks.retain(|task| task.owner_id == owner_id);
        Ok(select(&tasks, range))
    }
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("workpace").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("workpace")
            .join(STORE_FILE_NAME))
    }
}

pub fn load_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    if !path.exists() {
        debug!(path = %path.display(), "task store missing, starting empty");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let stored: StoredTasks = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    debug!(path = %path.display(), count = stored.tasks.len(), "loaded tasks");
    Ok(stored.tasks)
}

pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredTasks {
        schema_version: SCHEMA_VERSION,
        tasks: tasks.to_vec(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    debug!(path = %path.display(), count = tasks.len(), "saved tasks");
    Ok(())
}
