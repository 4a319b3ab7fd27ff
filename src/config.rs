//! Desk configuration.
//!
//! Capacities are static: the routine queue capacity is applied to each
//! doctor when the doctor is added, the heap capacity when the engine is built.

use crate::error::{DeskError, DeskResult};
use crate::logging::default_log_level;
use crate::models::Severity;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROUTINE_QUEUE_CAPACITY: usize = 50;
pub const DEFAULT_EMERGENCY_HEAP_CAPACITY: usize = 200;

/// Severity used when an emergency serve is undone. The heap entry's real
/// severity is gone by then, so the reinserted token gets this value.
pub const UNDO_SERVE_FALLBACK_SEVERITY: Severity = 5;

pub const ENV_QUEUE_CAPACITY: &str = "TRIAGE_DESK_QUEUE_CAPACITY";
pub const ENV_HEAP_CAPACITY: &str = "TRIAGE_DESK_HEAP_CAPACITY";
pub const ENV_LOG_LEVEL: &str = "TRIAGE_DESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TRIAGE_DESK_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskConfig {
    pub routine_queue_capacity: usize,
    pub emergency_heap_capacity: usize,
    pub log_level: String,
    /// Rolling log files go here; `None` logs to stderr.
    /// Without an explicit level, the default depends on this target.
    pub log_dir: Option<PathBuf>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        DeskConfig {
            routine_queue_capacity: DEFAULT_ROUTINE_QUEUE_CAPACITY,
            emergency_heap_capacity: DEFAULT_EMERGENCY_HEAP_CAPACITY,
            log_level: default_log_level(false).to_string(),
            log_dir: None,
        }
    }
}

impl DeskConfig {
    /// Build a config with explicit capacities and default logging.
    pub fn with_capacities(routine_queue_capacity: usize, emergency_heap_capacity: usize) -> Self {
        DeskConfig {
            routine_queue_capacity,
            emergency_heap_capacity,
            ..Default::default()
        }
    }

    /// Defaults overridden by `TRIAGE_DESK_*` environment variables.
    pub fn from_env() -> DeskResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> DeskResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = DeskConfig::default();

        if let Some(raw) = lookup(ENV_QUEUE_CAPACITY) {
            config.routine_queue_capacity = parse_capacity(ENV_QUEUE_CAPACITY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_HEAP_CAPACITY) {
            config.emergency_heap_capacity = parse_capacity(ENV_HEAP_CAPACITY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LOG_DIR) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.log_dir = Some(PathBuf::from(trimmed));
            }
        }
        config.log_level = match lookup(ENV_LOG_LEVEL) {
            Some(raw) => raw.trim().to_string(),
            None => default_log_level(config.log_dir.is_some()).to_string(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DeskResult<()> {
        if self.routine_queue_capacity == 0 {
            return Err(DeskError::InvalidConfig(
                "routine queue capacity must be positive".to_string(),
            ));
        }
        if self.emergency_heap_capacity == 0 {
            return Err(DeskError::InvalidConfig(
                "emergency heap capacity must be positive".to_string(),
            ));
        }
        if let Some(dir) = &self.log_dir {
            if !Path::new(dir).is_absolute() {
                return Err(DeskError::InvalidConfig(format!(
                    "log dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

fn parse_capacity(key: &str, raw: &str) -> DeskResult<usize> {
    raw.trim().parse::<usize>().map_err(|err| {
        DeskError::InvalidConfig(format!("{key}: `{}` is not a capacity: {err}", raw.trim()))
    })
}
