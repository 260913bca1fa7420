//! Explicit application state shared by the CLI and HTTP front ends.
//!
//! Every user action is one synchronous call on [`Session`]; failures are
//! returned to the caller and never leave the record half-updated.

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ScheduleConfig;
use crate::editor::ValidationError;
use crate::persistence::{ConfigStore, StorageError};
use crate::render::{self, Density, DocumentFormat, RenderError, RenderedDocument, TableView};

/// Home view figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub teacher: String,
    pub subjects: String,
    pub institution: String,
    pub school_year: String,
    /// Weekdays other than the rest day.
    pub active_days: usize,
    pub daily_periods: u8,
    pub active_periods: usize,
    pub config_saved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub path: String,
    pub saved: bool,
}

pub struct Session {
    config: ScheduleConfig,
    store: Box<dyn ConfigStore + Send + Sync>,
}

impl Session {
    /// Loads the persisted record, falling back to defaults. A load failure
    /// is handed back for the caller to report; the session is still usable.
    pub fn open<S>(store: S) -> (Self, Option<StorageError>)
    where
        S: ConfigStore + Send + Sync + 'static,
    {
        let (config, error) = match store.load() {
            Ok(Some(config)) => (config, None),
            Ok(None) => {
                info!(path = %store.location().display(), "no saved configuration, using defaults");
                (ScheduleConfig::defaults(), None)
            }
            Err(err) => {
                warn!(path = %store.location().display(), error = %err, "falling back to defaults");
                (ScheduleConfig::defaults(), Some(err))
            }
        };
        (Self::with_config(store, config), error)
    }

    pub fn with_config<S>(store: S, config: ScheduleConfig) -> Self
    where
        S: ConfigStore + Send + Sync + 'static,
    {
        Self {
            config,
            store: Box::new(store),
        }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ScheduleConfig {
        &mut self.config
    }

    /// Swaps in a whole record once it satisfies the record invariants;
    /// the current record is kept on failure.
    pub fn replace_config(&mut self, mut config: ScheduleConfig) -> Result<(), ValidationError> {
        config.normalize()?;
        self.config = config;
        Ok(())
    }

    pub fn summary(&self) -> Summary {
        let config = &self.config;
        Summary {
            teacher: config.teacher.clone(),
            subjects: config.subjects.clone(),
            institution: config.institution.clone(),
            school_year: config.school_year.clone(),
            active_days: config
                .weekdays
                .iter()
                .filter(|&&day| day != config.rest_day)
                .count(),
            daily_periods: config.daily_periods,
            active_periods: config.active_periods.len(),
            config_saved: self.store.exists(),
        }
    }

    pub fn table(&self, show_empty: bool, density: Density) -> TableView {
        render::render_table(&self.config, show_empty, density)
    }

    /// Renders a PDF stamped with the local time.
    pub fn render_document(&self, format: DocumentFormat) -> Result<RenderedDocument, RenderError> {
        render::render_document(&self.config, format, Local::now().naive_local())
    }

    pub fn load_example(&mut self) {
        self.config.load_example_data();
        info!("example timetable loaded");
    }

    pub fn save(&self) -> Result<(), StorageError> {
        self.store.save(&self.config)
    }

    /// Re-reads the persisted record; the current one is kept on failure.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        match self.store.load()? {
            Some(config) => {
                self.config = config;
                Ok(())
            }
            None => Err(StorageError::NotFound(
                self.store.location().display().to_string(),
            )),
        }
    }

    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            path: self.store.location().display().to_string(),
            saved: self.store.exists(),
        }
    }
}
