use serde_json::Error as SerdeJsonError;
use std::io;
use std::path::Path;

use crate::ScheduleConfig;
use crate::editor::ValidationError;

pub mod file;

pub use file::{DEFAULT_CONFIG_PATH, JsonFileStore};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed configuration: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
    #[error("no configuration found at {0}")]
    NotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Whole-record persistence for the timetable.
pub trait ConfigStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> StorageResult<Option<ScheduleConfig>>;
    fn save(&self, config: &ScheduleConfig) -> StorageResult<()>;
    fn exists(&self) -> bool;
    fn location(&self) -> &Path;
}
