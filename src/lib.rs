pub mod config;
pub mod day;
pub mod editor;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod period;
pub mod persistence;
pub mod render;
pub mod session;

pub use config::{Cell, SENTINEL_FREE_PERIOD, SENTINEL_UNAVAILABLE, ScheduleConfig};
pub use day::{DayCode, UnknownDay};
pub use editor::ValidationError;
pub use period::{MAX_PERIODS, PeriodIndex, PeriodTime};
pub use persistence::{ConfigStore, JsonFileStore, StorageError};
pub use render::document::{DocumentLayout, PageProfile, RowKind, build_layout};
pub use render::{
    Density, DocumentFormat, Markup, RenderError, RenderedDocument, Slot, TableView, format_slot,
    render_document, render_table,
};
pub use session::{Session, StoreStatus, Summary};
