use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::{ConfigStore, StorageError, StorageResult};
use crate::ScheduleConfig;

pub const DEFAULT_CONFIG_PATH: &str = "schedule_config.json";

/// Stores the timetable as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> StorageResult<Option<ScheduleConfig>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut config: ScheduleConfig = serde_json::from_reader(BufReader::new(file))?;
        let installed = config.normalize()?;
        if !installed.is_empty() {
            warn!(
                path = %self.path.display(),
                ?installed,
                "active periods without a time entry received defaults"
            );
        }
        info!(path = %self.path.display(), "configuration loaded");
        Ok(Some(config))
    }

    /// Writes to a sibling temp file first, then renames over the target.
    fn save(&self, config: &ScheduleConfig) -> StorageResult<()> {
        let tmp = NamedTempFile::new_in(self.parent_dir())?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, config)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| StorageError::Io(err.error))?;
        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
