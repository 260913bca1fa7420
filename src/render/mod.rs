//! Projection of a [`ScheduleConfig`] into a table view or a PDF document.
//!
//! Both outputs share [`Slot`] classification and [`format_slot`], so the
//! content and field order of a lesson is identical across every format; the
//! formats only differ in their [`Markup`].

pub mod document;
mod pdf;
pub mod table;

pub use document::{DocumentFormat, RenderedDocument, render_document};
pub use table::{Density, TableView, render_table};

use std::borrow::Cow;

use crate::config::{Cell, ScheduleConfig};
use crate::day::DayCode;
use crate::period::PeriodIndex;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("nothing to render: no lessons in the visible timetable")]
    NothingToRender,
    #[error("invalid page geometry: {0}")]
    Geometry(String),
    #[error("the document serializer produced no output")]
    EmptyOutput,
    #[error("pdf error: {0}")]
    Pdf(String),
    #[error("table error: {0}")]
    Table(#[from] polars::prelude::PolarsError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// What a (day, period) slot holds, as far as rendering is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    Empty,
    Sentinel(&'a str),
    Lesson(&'a Cell),
}

impl<'a> Slot<'a> {
    pub fn classify(cell: Option<&'a Cell>) -> Self {
        match cell {
            None => Slot::Empty,
            Some(cell) if cell.class_name.is_empty() => Slot::Empty,
            Some(cell) if cell.is_sentinel() => Slot::Sentinel(&cell.class_name),
            Some(cell) => Slot::Lesson(cell),
        }
    }

    pub fn of(config: &'a ScheduleConfig, day: DayCode, period: PeriodIndex) -> Self {
        Self::classify(config.stored_cell(day, period))
    }
}

/// Delimiters wrapped around the fields of a rendered lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markup {
    pub bold_open: &'static str,
    pub bold_close: &'static str,
    /// Between the time range and the class.
    pub after_time: &'static str,
    /// Between the class and the location.
    pub before_location: &'static str,
    pub location_prefix: &'static str,
    /// Escape `&` and `<` in user text so it cannot open a tag.
    pub escape: bool,
}

impl Markup {
    pub const PLAIN: Markup = Markup {
        bold_open: "",
        bold_close: "",
        after_time: " ",
        before_location: " ",
        location_prefix: "",
        escape: false,
    };

    pub const EMPHASIS: Markup = Markup {
        bold_open: "**",
        bold_close: "**",
        after_time: "\n",
        before_location: "\n",
        location_prefix: "",
        escape: false,
    };

    pub const PIN: Markup = Markup {
        bold_open: "**",
        bold_close: "**",
        after_time: " ",
        before_location: " ",
        location_prefix: "📍",
        escape: false,
    };

    pub const DOCUMENT: Markup = Markup {
        bold_open: "<b>",
        bold_close: "</b>",
        after_time: "<br/>",
        before_location: "<br/>",
        location_prefix: "",
        escape: true,
    };

    /// Plain text fed to the document painter.
    pub const DOCUMENT_PLAIN: Markup = Markup {
        escape: true,
        ..Markup::PLAIN
    };

    /// User text as it must appear inside this markup.
    pub fn text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.escape && text.contains(['&', '<']) {
            Cow::Owned(text.replace('&', "&amp;").replace('<', "&lt;"))
        } else {
            Cow::Borrowed(text)
        }
    }

    pub fn bold(&self, text: &str) -> String {
        format!("{}{}{}", self.bold_open, self.text(text), self.bold_close)
    }
}

/// Renders one slot. Blank slots render as `""`, sentinels as themselves.
pub fn format_slot(config: &ScheduleConfig, period: PeriodIndex, slot: Slot<'_>, markup: Markup) -> String {
    match slot {
        Slot::Empty => String::new(),
        Slot::Sentinel(text) => markup.text(text).into_owned(),
        Slot::Lesson(cell) => {
            let time = config.period_time(period).label();
            let mut text = format!(
                "{}{}{}",
                markup.bold(&time),
                markup.after_time,
                markup.text(&cell.class_name)
            );
            if let Some(location) = cell.location() {
                text.push_str(markup.before_location);
                text.push_str(markup.location_prefix);
                text.push_str(&markup.text(&location));
            }
            text
        }
    }
}
