use printpdf::{
    BuiltinFont, Color, Greyscale, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};

use super::RenderError;
use super::document::{DocumentLayout, LayoutRow};

const GRID_THICKNESS_PT: f32 = 0.25;
const GRID_GREY: f32 = 0.5;
const PAD_X_PT: f32 = 6.0;
const PAD_Y_PT: f32 = 3.0;
// Rough Helvetica advance widths, in ems.
const REGULAR_EM: f32 = 0.50;
const BOLD_EM: f32 = 0.55;

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn pdf_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(err.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Run {
    pub text: String,
    pub bold: bool,
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<").replace("&amp;", "&")
}

/// Splits `<b>`/`</b>`/`<br/>` markup into lines of runs. User text arrives
/// escaped, so only the painter's own tags are recognized.
pub(crate) fn parse_markup(markup: &str) -> Vec<Vec<Run>> {
    let mut lines = vec![Vec::new()];
    let mut bold = false;
    let mut rest = markup;
    while !rest.is_empty() {
        let next_tag = ["<b>", "</b>", "<br/>"]
            .into_iter()
            .filter_map(|tag| rest.find(tag).map(|pos| (pos, tag)))
            .min_by_key(|(pos, _)| *pos);
        let (text, tag) = match next_tag {
            Some((pos, tag)) => (&rest[..pos], Some(tag)),
            None => (rest, None),
        };
        if !text.is_empty() {
            if let Some(line) = lines.last_mut() {
                line.push(Run {
                    text: unescape(text),
                    bold,
                });
            }
        }
        match tag {
            Some(tag) => {
                match tag {
                    "<b>" => bold = true,
                    "</b>" => bold = false,
                    _ => lines.push(Vec::new()),
                }
                rest = &rest[text.len() + tag.len()..];
            }
            None => break,
        }
    }
    lines
}

fn text_width(text: &str, bold: bool, font_size: f32) -> f32 {
    let em = if bold { BOLD_EM } else { REGULAR_EM };
    text.chars().count() as f32 * em * font_size
}

fn runs_width(runs: &[Run], font_size: f32) -> f32 {
    runs.iter()
        .map(|run| text_width(&run.text, run.bold, font_size))
        .sum()
}

/// Greedy word wrap of one markup line into lines no wider than `max_width`.
fn wrap_line(runs: Vec<Run>, max_width: f32, font_size: f32) -> Vec<Vec<Run>> {
    let mut out: Vec<Vec<Run>> = vec![Vec::new()];
    let mut width = 0.0;
    for run in runs {
        for (idx, word) in run.text.split(' ').enumerate() {
            let piece = if idx == 0 { word.to_string() } else { format!(" {word}") };
            let piece_width = text_width(&piece, run.bold, font_size);
            let current_empty = out.last().is_none_or(|line| line.is_empty());
            let piece = if width + piece_width > max_width && !current_empty {
                out.push(Vec::new());
                width = 0.0;
                piece.trim_start().to_string()
            } else {
                piece
            };
            width += text_width(&piece, run.bold, font_size);
            if let Some(line) = out.last_mut() {
                match line.last_mut() {
                    Some(last) if last.bold == run.bold => last.text.push_str(&piece),
                    _ => line.push(Run {
                        text: piece,
                        bold: run.bold,
                    }),
                }
            }
        }
    }
    out
}

fn cell_lines(markup: &str, width: f32, font_size: f32) -> Vec<Vec<Run>> {
    let max_width = (width - 2.0 * PAD_X_PT).max(font_size);
    parse_markup(markup)
        .into_iter()
        .flat_map(|line| wrap_line(line, max_width, font_size))
        .collect()
}

struct PlacedCell {
    x: f32,
    width: f32,
    lines: Vec<Vec<Run>>,
}

struct PlacedRow {
    height: f32,
    font_size: f32,
    leading: f32,
    cells: Vec<PlacedCell>,
}

fn place_row(row: &LayoutRow, widths: &[f32], left: f32, leading: f32) -> PlacedRow {
    let spans: Vec<(f32, f32)> = if row.spans_all() {
        vec![(left, widths.iter().sum())]
    } else {
        widths
            .iter()
            .scan(left, |x, &w| {
                let start = *x;
                *x += w;
                Some((start, w))
            })
            .collect()
    };
    let leading = leading.max(row.font_size);
    let cells: Vec<PlacedCell> = spans
        .into_iter()
        .zip(row.cells.iter())
        .map(|((x, width), text)| PlacedCell {
            x,
            width,
            lines: cell_lines(text, width, row.font_size),
        })
        .collect();
    let max_lines = cells.iter().map(|c| c.lines.len()).max().unwrap_or(1).max(1);
    PlacedRow {
        height: max_lines as f32 * leading + 2.0 * PAD_Y_PT,
        font_size: row.font_size,
        leading,
        cells,
    }
}

struct Painter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    page_width_mm: f32,
    page_height_mm: f32,
    pages: usize,
}

impl Painter {
    fn new(layout: &DocumentLayout) -> Result<Self, RenderError> {
        let profile = &layout.profile;
        let (doc, page, layer) = PdfDocument::new(
            layout.title.as_str(),
            Mm(profile.page_width_mm),
            Mm(profile.page_height_mm),
            "Timetable",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);
        let painter = Self {
            doc,
            layer,
            regular,
            bold,
            page_width_mm: profile.page_width_mm,
            page_height_mm: profile.page_height_mm,
            pages: 1,
        };
        painter.prepare_layer();
        Ok(painter)
    }

    fn prepare_layer(&self) {
        self.layer
            .set_outline_color(Color::Greyscale(Greyscale::new(GRID_GREY, None)));
        self.layer.set_outline_thickness(GRID_THICKNESS_PT);
        self.layer
            .set_fill_color(Color::Greyscale(Greyscale::new(0.0, None)));
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(self.page_width_mm),
            Mm(self.page_height_mm),
            format!("Timetable {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.prepare_layer();
    }

    fn rect(&self, x: f32, top: f32, width: f32, height: f32) {
        let corners = [
            (x, top),
            (x + width, top),
            (x + width, top - height),
            (x, top - height),
        ];
        self.layer.add_line(Line {
            points: corners
                .into_iter()
                .map(|(px, py)| (Point::new(pt_to_mm(px), pt_to_mm(py)), false))
                .collect(),
            is_closed: true,
        });
    }

    fn paint_row(&self, row: &PlacedRow, top: f32) {
        for cell in &row.cells {
            self.rect(cell.x, top, cell.width, row.height);

            let block = cell.lines.len() as f32 * row.leading;
            let block_top = top - (row.height - block) / 2.0;
            for (idx, line) in cell.lines.iter().enumerate() {
                let line_top = block_top - idx as f32 * row.leading;
                let baseline = line_top - (row.leading + row.font_size) / 2.0 + row.font_size * 0.2;
                let mut x = cell.x + (cell.width - runs_width(line, row.font_size)) / 2.0;
                for run in line {
                    let font = if run.bold { &self.bold } else { &self.regular };
                    self.layer.use_text(
                        run.text.as_str(),
                        row.font_size,
                        pt_to_mm(x),
                        pt_to_mm(baseline),
                        font,
                    );
                    x += text_width(&run.text, run.bold, row.font_size);
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<u8>, RenderError> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

/// Paints the grid table page by page and serializes it.
pub(crate) fn paint(layout: &DocumentLayout) -> Result<Vec<u8>, RenderError> {
    let profile = &layout.profile;
    let page_top = super::document::mm_to_pt(profile.page_height_mm) - profile.margin_pt;
    let table_width: f32 = layout.column_widths.iter().sum();
    let left = profile.margin_pt + (profile.printable_width() - table_width).max(0.0) / 2.0;

    let mut painter = Painter::new(layout)?;
    let mut top = page_top;
    for row in &layout.rows {
        let placed = place_row(row, &layout.column_widths, left, profile.leading);
        let used = page_top - top;
        if used > 0.0 && top - placed.height < profile.margin_pt {
            painter.new_page();
            top = page_top;
        }
        painter.paint_row(&placed, top);
        top -= placed.height;
    }
    painter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, bold: bool) -> Run {
        Run {
            text: text.to_string(),
            bold,
        }
    }

    #[test]
    fn parses_bold_and_breaks() {
        let lines = parse_markup("<b>10:15-11:15</b><br/>2E<br/>MB PT A15");
        assert_eq!(
            lines,
            vec![
                vec![run("10:15-11:15", true)],
                vec![run("2E", false)],
                vec![run("MB PT A15", false)],
            ]
        );
    }

    #[test]
    fn plain_text_is_one_regular_line() {
        assert_eq!(parse_markup("DISP."), vec![vec![run("DISP.", false)]]);
        assert_eq!(parse_markup(""), vec![Vec::<Run>::new()]);
    }

    #[test]
    fn escaped_user_text_stays_literal() {
        use crate::render::Markup;

        let teacher = Markup::DOCUMENT.bold("A<br/>B & <b>C</b>");
        assert_eq!(
            parse_markup(&teacher),
            vec![vec![run("A<br/>B & <b>C</b>", true)]]
        );
        assert_eq!(unescape("&amp;lt;"), "&lt;");
    }

    #[test]
    fn wraps_long_lines_on_spaces() {
        let lines = wrap_line(vec![run("aaaa bbbb cccc", false)], 25.0, 10.0);
        assert_eq!(
            lines,
            vec![
                vec![run("aaaa", false)],
                vec![run("bbbb", false)],
                vec![run("cccc", false)],
            ]
        );
    }
}
