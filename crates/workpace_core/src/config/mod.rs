use crate::error::AppError;
use crate::metrics::{DEFAULT_TARGET_EFFICIENCY, clamp_target, parse_weekday};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::Weekday;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "WORKPACE_CONFIG_PATH";
pub const DEFAULT_OWNER: &str = "local";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub owner: Option<String>,
    /// Lowercase weekday name the weekly window starts on.
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default)]
    pub target_efficiency: Option<f64>,
}

impl Config {
    pub fn owner(&self) -> &str {
        self.owner.as_deref().unwrap_or(DEFAULT_OWNER)
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
            .as_deref()
            .and_then(parse_weekday)
            .unwrap_or(Weekday::Sunday)
    }

    pub fn target_efficiency(&self) -> f64 {
        self.target_efficiency
            .map(clamp_target)
            .unwrap_or(DEFAULT_TARGET_EFFICIENCY)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigOverrides {
    pub owner: Option<String>,
    pub week_start: Option<Weekday>,
    pub target_efficiency: Option<f64>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("workpace")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("workpace")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    normalize_config(config)
        .map_err(|err| AppError::invalid_data(format!("{}: {}", path.display(), err.message())))
}

fn normalize_config(mut config: Config) -> Result<Config, AppError> {
    config.owner = config
        .owner
        .map(|owner| owner.trim().to_string())
        .filter(|owner| !owner.is_empty());

    if let Some(raw) = config.week_start.take() {
        let weekday = parse_weekday(&raw)
            .ok_or_else(|| AppError::invalid_data(format!("unknown week_start '{raw}'")))?;
        config.week_start = Some(weekday_name(weekday).to_string());
    }

    config.target_efficiency = config.target_efficiency.map(clamp_target);
    Ok(config)
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sunday => "sunday",
        Weekday::Monday => "monday",
        Weekday::Tuesday => "tuesday",
        Weekday::Wednesday => "wednesday",
        Weekday::Thursday => "thursday",
        Weekday::Friday => "friday",
        Weekday::Saturday => "saturday",
    }
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(owner) = overrides.owner.as_deref().map(str::trim)
        && !owner.is_empty()
    {
        merged.owner = Some(owner.to_string());
    }
    if let Some(week_start) = overrides.week_start {
        merged.week_start = Some(weekday_name(week_start).to_string());
    }
    if let Some(target) = overrides.target_efficiency {
        merged.target_efficiency = Some(clamp_target(target));
    }

    merged
}
