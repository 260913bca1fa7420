use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use super::{Markup, RenderError, Slot, format_slot, pdf};
use crate::config::ScheduleConfig;

pub const MIME_TYPE: &str = "application/pdf";
pub const DOCUMENT_TITLE: &str = "WEEKLY TIMETABLE";

/// Printable document profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Standard,
    Pocket,
    #[serde(rename = "a4")]
    A4Print,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 3] = [
        DocumentFormat::Standard,
        DocumentFormat::Pocket,
        DocumentFormat::A4Print,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Standard => "standard",
            DocumentFormat::Pocket => "pocket",
            DocumentFormat::A4Print => "a4",
        }
    }

    pub fn profile(&self) -> PageProfile {
        match self {
            DocumentFormat::Standard => PageProfile {
                page_width_mm: 297.0,
                page_height_mm: 210.0,
                margin_pt: 15.0,
                font_size: 8.0,
                leading: 10.0,
                day_column_pt: 80.0,
                period_column_pt: 110.0,
            },
            DocumentFormat::Pocket => PageProfile {
                page_width_mm: 105.0,
                page_height_mm: 74.0,
                margin_pt: 2.0,
                font_size: 5.5,
                leading: 6.0,
                day_column_pt: 35.0,
                period_column_pt: 45.0,
            },
            DocumentFormat::A4Print => PageProfile {
                page_width_mm: 210.0,
                page_height_mm: 297.0,
                margin_pt: 20.0,
                font_size: 10.0,
                leading: 12.0,
                day_column_pt: 80.0,
                period_column_pt: 110.0,
            },
        }
    }

    fn markup(&self) -> Markup {
        match self {
            DocumentFormat::Pocket => Markup::DOCUMENT_PLAIN,
            DocumentFormat::Standard | DocumentFormat::A4Print => Markup::DOCUMENT,
        }
    }

    /// `schedule_<format>_<YYYYmmdd_HHMMSS>.pdf`
    pub fn file_name(&self, timestamp: NaiveDateTime) -> String {
        format!(
            "schedule_{}_{}.pdf",
            self.as_str(),
            timestamp.format("%Y%m%d_%H%M%S")
        )
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        DocumentFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == lower)
            .ok_or_else(|| format!("unknown document format '{s}' (expected standard, pocket or a4)"))
    }
}

/// Page geometry and typography. Lengths in points unless suffixed `_mm`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageProfile {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_pt: f32,
    pub font_size: f32,
    pub leading: f32,
    pub day_column_pt: f32,
    pub period_column_pt: f32,
}

pub(crate) fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

impl PageProfile {
    pub fn printable_width(&self) -> f32 {
        mm_to_pt(self.page_width_mm) - 2.0 * self.margin_pt
    }

    pub fn printable_height(&self) -> f32 {
        mm_to_pt(self.page_height_mm) - 2.0 * self.margin_pt
    }

    fn validate(&self) -> Result<(), RenderError> {
        let values = [
            self.page_width_mm,
            self.page_height_mm,
            self.font_size,
            self.leading,
        ];
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(RenderError::Geometry(format!(
                "page {}x{} mm with font {} pt and leading {} pt",
                self.page_width_mm, self.page_height_mm, self.font_size, self.leading
            )));
        }
        if self.printable_width() <= 0.0 || self.printable_height() <= 0.0 {
            return Err(RenderError::Geometry(format!(
                "margins of {} pt leave no printable area on a {}x{} mm page",
                self.margin_pt, self.page_width_mm, self.page_height_mm
            )));
        }
        Ok(())
    }

    /// Day column plus one column per period, shrunk to the printable width.
    fn column_widths(&self, periods: usize) -> Vec<f32> {
        let mut widths = vec![self.day_column_pt];
        widths.extend(std::iter::repeat_n(self.period_column_pt, periods));
        let total: f32 = widths.iter().sum();
        let available = self.printable_width();
        if total > available {
            let scale = available / total;
            widths.iter_mut().for_each(|w| *w *= scale);
        }
        widths
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Banner,
    Spacer,
    Header,
    Data,
}

/// One table row. Cell text uses the `<b>`/`<br/>` document markup.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRow {
    pub kind: RowKind,
    pub cells: Vec<String>,
    pub font_size: f32,
}

impl LayoutRow {
    /// Banner and spacer rows span every column.
    pub fn spans_all(&self) -> bool {
        matches!(self.kind, RowKind::Banner | RowKind::Spacer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub format: DocumentFormat,
    pub profile: PageProfile,
    pub title: String,
    pub column_widths: Vec<f32>,
    pub rows: Vec<LayoutRow>,
}

impl DocumentLayout {
    pub fn rows_of(&self, kind: RowKind) -> impl Iterator<Item = &LayoutRow> {
        self.rows.iter().filter(move |row| row.kind == kind)
    }
}

/// Lays out the table for `format` without serializing it.
pub fn build_layout(
    config: &ScheduleConfig,
    format: DocumentFormat,
    profile: PageProfile,
) -> Result<DocumentLayout, RenderError> {
    profile.validate()?;

    let markup = format.markup();
    let font_size = profile.font_size;
    let banner = |text: String, size: f32| LayoutRow {
        kind: RowKind::Banner,
        cells: vec![text],
        font_size: size,
    };

    let mut rows = Vec::new();
    if format == DocumentFormat::Pocket {
        rows.push(banner(Markup::DOCUMENT.bold(&config.teacher), font_size + 1.0));
    } else {
        rows.push(banner(Markup::DOCUMENT.bold(DOCUMENT_TITLE), font_size));
        rows.push(banner(Markup::DOCUMENT.bold(&config.teacher), font_size));
        let text = |value: &str| Markup::DOCUMENT.text(value).into_owned();
        rows.push(banner(text(&config.subjects), font_size));
        rows.push(banner(text(&config.institution), font_size));
        rows.push(banner(text(&format!("S.Y. {}", config.school_year)), font_size));
        rows.push(LayoutRow {
            kind: RowKind::Spacer,
            cells: vec![String::new()],
            font_size,
        });
    }

    let header = std::iter::once("Day".to_string())
        .chain(
            config
                .active_periods
                .iter()
                .map(|period| format!("{} period", period.ordinal())),
        )
        .map(|label| Markup::DOCUMENT.bold(&label))
        .collect();
    rows.push(LayoutRow {
        kind: RowKind::Header,
        cells: header,
        font_size,
    });

    for day in config.visible_days() {
        let cells = std::iter::once(Markup::DOCUMENT.bold(day.as_str()))
            .chain(
                config
                    .active_periods
                    .iter()
                    .map(|&period| format_slot(config, period, Slot::of(config, day, period), markup)),
            )
            .collect();
        rows.push(LayoutRow {
            kind: RowKind::Data,
            cells,
            font_size,
        });
    }

    if !config.has_lessons() {
        return Err(RenderError::NothingToRender);
    }

    Ok(DocumentLayout {
        format,
        profile,
        title: format!("{} - {}", DOCUMENT_TITLE, config.teacher),
        column_widths: profile.column_widths(config.active_periods.len()),
        rows,
    })
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub format: DocumentFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    pub fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }
}

/// Renders `config` as a PDF in the fixed profile of `format`.
pub fn render_document(
    config: &ScheduleConfig,
    format: DocumentFormat,
    timestamp: NaiveDateTime,
) -> Result<RenderedDocument, RenderError> {
    render_document_with_profile(config, format, format.profile(), timestamp)
}

pub fn render_document_with_profile(
    config: &ScheduleConfig,
    format: DocumentFormat,
    profile: PageProfile,
    timestamp: NaiveDateTime,
) -> Result<RenderedDocument, RenderError> {
    let layout = build_layout(config, format, profile).inspect_err(|err| {
        warn!(%format, error = %err, "document layout rejected");
    })?;
    let bytes = pdf::paint(&layout)?;
    if bytes.is_empty() {
        return Err(RenderError::EmptyOutput);
    }
    let file_name = format.file_name(timestamp);
    info!(%format, file = %file_name, size = bytes.len(), "document rendered");
    Ok(RenderedDocument {
        format,
        file_name,
        bytes,
    })
}
