use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use super::{Markup, RenderError, Slot, format_slot};
use crate::config::ScheduleConfig;
use crate::day::DayCode;

pub const DAY_COLUMN: &str = "Day";

/// On-screen density preset of the table view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    #[default]
    Standard,
    Compact,
    Pocket,
}

impl Density {
    pub const ALL: [Density; 3] = [Density::Standard, Density::Compact, Density::Pocket];

    pub fn as_str(&self) -> &'static str {
        match self {
            Density::Standard => "standard",
            Density::Compact => "compact",
            Density::Pocket => "pocket",
        }
    }

    pub fn markup(&self) -> Markup {
        match self {
            Density::Standard => Markup::EMPHASIS,
            Density::Compact => Markup::PIN,
            Density::Pocket => Markup::PLAIN,
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Density {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Density::ALL
            .into_iter()
            .find(|density| density.as_str() == lower)
            .ok_or_else(|| format!("unknown density '{s}' (expected standard, compact or pocket)"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub day: DayCode,
    pub cells: Vec<String>,
}

/// Rendered table: a header plus one row per visible day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub density: Density,
    pub show_empty: bool,
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
}

/// Builds the table view. `show_empty` does not change cell text: blank
/// slots are always `""` and sentinels always render as themselves.
pub fn render_table(config: &ScheduleConfig, show_empty: bool, density: Density) -> TableView {
    let markup = density.markup();
    let header = std::iter::once(DAY_COLUMN.to_string())
        .chain(config.active_periods.iter().map(|period| period.ordinal()))
        .collect();
    let rows = config
        .visible_days()
        .into_iter()
        .map(|day| TableRow {
            day,
            cells: config
                .active_periods
                .iter()
                .map(|&period| format_slot(config, period, Slot::of(config, day, period), markup))
                .collect(),
        })
        .collect();
    TableView {
        density,
        show_empty,
        header,
        rows,
    }
}

impl TableView {
    /// Row `[day, cells...]` as plain strings.
    fn records(&self) -> impl Iterator<Item = Vec<&str>> {
        self.rows.iter().map(|row| {
            std::iter::once(row.day.as_str())
                .chain(row.cells.iter().map(String::as_str))
                .collect()
        })
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .header
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<&str> = self.records().map(|record| record[idx]).collect();
                Series::new(name.as_str().into(), values).into_column()
            })
            .collect::<Vec<Column>>();
        DataFrame::new(columns)
    }

    /// Boxed text table, multi-line cells kept on separate lines.
    pub fn to_text(&self) -> Result<String, RenderError> {
        let df = self.to_dataframe()?;
        Ok(render_text_table(&df)?)
    }

    /// Markdown table with line breaks turned into `<br/>`.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("| {} |\n", self.header.join(" | "));
        out.push_str(&format!("| {} |\n", vec!["---"; self.header.len()].join(" | ")));
        for record in self.records() {
            let cells: Vec<String> = record.iter().map(|cell| cell.replace('\n', "<br/>")).collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), RenderError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.header)?;
        for record in self.records() {
            writer.write_record(&record)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Prints a string-typed frame as a `+---+` boxed table.
pub fn render_text_table(df: &DataFrame) -> PolarsResult<String> {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    // cells[row][col] holds the lines of one cell
    let mut cells: Vec<Vec<Vec<String>>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let mut row = Vec::with_capacity(columns.len());
        for col in columns {
            let text = match col.get(row_idx)? {
                AnyValue::Null => String::new(),
                AnyValue::String(s) => s.to_string(),
                av => av.to_string(),
            };
            row.push(text.lines().map(ToOwned::to_owned).collect::<Vec<_>>());
        }
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, lines) in row.iter().enumerate() {
            for line in lines {
                widths[ci] = widths[ci].max(line.chars().count());
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_line = |out: &mut String, parts: &[&str]| {
        out.push('|');
        for (ci, part) in parts.iter().enumerate() {
            let pad = widths[ci].saturating_sub(part.chars().count());
            out.push(' ');
            out.push_str(part);
            out.push_str(&" ".repeat(pad));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    let header: Vec<&str> = col_names.iter().map(String::as_str).collect();
    push_line(&mut out, &header);
    out.push_str(&sep);
    out.push('\n');

    for row in &cells {
        let height = row.iter().map(Vec::len).max().unwrap_or(0).max(1);
        for line_idx in 0..height {
            let parts: Vec<&str> = row
                .iter()
                .map(|lines| lines.get(line_idx).map(String::as_str).unwrap_or(""))
                .collect();
            push_line(&mut out, &parts);
        }
    }

    out.push_str(&sep);
    out.push('\n');
    Ok(out)
}
