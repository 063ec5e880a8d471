use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use std::ops::Range;

use super::{ExportError, ExportSettings, ExportTable};

const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica glyph width relative to the font size.
const CHAR_WIDTH_EM: f32 = 0.5;
const LINE_SPACING: f32 = 1.25;
const CELL_PADDING_MM: f32 = 1.5;
const FOOTER_MM: f32 = 8.0;
const MAX_LINES_PER_CELL: usize = 3;
const MIN_WEIGHT: usize = 4;
const MAX_WEIGHT: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl PageGeometry {
    #[must_use]
    pub fn a4(landscape: bool) -> Self {
        let (width_mm, height_mm) = if landscape { (297.0, 210.0) } else { (210.0, 297.0) };
        Self {
            width_mm,
            height_mm,
            margin_mm: 12.0,
        }
    }

    fn table_width(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    fn top(&self) -> f32 {
        self.height_mm - self.margin_mm
    }
}

/// Layout of a table over PDF pages, computed before anything is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfPlan {
    pub geometry: PageGeometry,
    pub font_size: f32,
    pub column_widths: Vec<f32>,
    /// Wrapped header lines per column.
    pub header: Vec<Vec<String>>,
    /// Wrapped lines per cell.
    pub rows: Vec<Vec<Vec<String>>>,
    /// Row ranges per page. Always at least one page.
    pub pages: Vec<Range<usize>>,
}

impl PdfPlan {
    fn line_height(&self) -> f32 {
        self.font_size * PT_TO_MM * LINE_SPACING
    }

    fn block_height(&self, cells: &[Vec<String>]) -> f32 {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        lines as f32 * self.line_height() + 2.0 * CELL_PADDING_MM
    }

    #[must_use]
    pub fn header_height(&self) -> f32 {
        self.block_height(&self.header)
    }

    #[must_use]
    pub fn row_height(&self, row: usize) -> f32 {
        self.rows
            .get(row)
            .map_or(0.0, |cells| self.block_height(cells))
    }

    #[must_use]
    pub fn planned_rows(&self) -> usize {
        self.pages.iter().map(ExactSizeIterator::len).sum()
    }
}

fn chars_fitting(width_mm: f32, font_size: f32) -> usize {
    let char_mm = font_size * PT_TO_MM * CHAR_WIDTH_EM;
    (((width_mm - 2.0 * CELL_PADDING_MM) / char_mm).floor() as usize).max(1)
}

/// Word-wraps `text` to `max_chars` columns, breaking long words. Lines past
/// `max_lines` are dropped and the last kept line ends in "...".
fn wrap_text(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines: Vec<String> = vec![];
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while !word.is_empty() {
            let used = current.chars().count();
            let separator = usize::from(used > 0);
            if used + separator + word.len() <= max_chars {
                if separator == 1 {
                    current.push(' ');
                }
                current.extend(word.drain(..));
            } else if used > 0 {
                lines.push(std::mem::take(&mut current));
            } else {
                current.extend(word.drain(..max_chars));
                lines.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let keep = max_chars.saturating_sub(3);
            *last = last.chars().take(keep).collect::<String>() + "...";
        }
    }
    lines
}

/// Splits rows into pages so that every page fits below a repeated header.
fn paginate(row_heights: &[f32], available: f32) -> Vec<Range<usize>> {
    let mut pages = vec![];
    let mut start = 0;
    let mut used = 0.0;
    for (index, height) in row_heights.iter().enumerate() {
        if used + height > available && index > start {
            pages.push(start..index);
            start = index;
            used = 0.0;
        }
        used += height;
    }
    pages.push(start..row_heights.len());
    pages
}

/// Column widths proportional to the longest text of each column.
fn column_widths(table: &ExportTable, total_width: f32) -> Vec<f32> {
    let weights: Vec<usize> = (0..table.column_count())
        .map(|col| {
            std::iter::once(&table.headers[col])
                .chain(table.rows.iter().filter_map(|row| row.get(col)))
                .map(|text| text.chars().count())
                .max()
                .unwrap_or(0)
                .clamp(MIN_WEIGHT, MAX_WEIGHT)
        })
        .collect();
    let sum: usize = weights.iter().sum();
    weights
        .iter()
        .map(|weight| total_width * *weight as f32 / sum.max(1) as f32)
        .collect()
}

#[must_use]
pub fn plan_pdf(table: &ExportTable, geometry: PageGeometry, font_size: f32) -> PdfPlan {
    let font_size = font_size.max(4.0);
    let widths = column_widths(table, geometry.table_width());
    let wrap_row = |cells: &[String]| -> Vec<Vec<String>> {
        cells
            .iter()
            .zip(&widths)
            .map(|(text, width)| wrap_text(text, chars_fitting(*width, font_size), MAX_LINES_PER_CELL))
            .collect()
    };

    let mut plan = PdfPlan {
        geometry,
        font_size,
        header: wrap_row(table.headers.as_slice()),
        rows: table.rows.iter().map(|row| wrap_row(row.as_slice())).collect(),
        column_widths: widths.clone(),
        pages: vec![],
    };

    let available =
        geometry.height_mm - 2.0 * geometry.margin_mm - FOOTER_MM - plan.header_height();
    let heights: Vec<f32> = (0..plan.rows.len()).map(|row| plan.row_height(row)).collect();
    plan.pages = paginate(&heights, available);
    plan
}

fn rule(layer: &PdfLayerReference, from: (f32, f32), to: (f32, f32)) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    });
}

/// Draws one header or body line of cells with its top edge at `top`.
fn draw_block(
    layer: &PdfLayerReference,
    plan: &PdfPlan,
    cells: &[Vec<String>],
    top: f32,
    font: &IndirectFontRef,
) -> f32 {
    let height = plan.block_height(cells);
    let ascent = plan.font_size * PT_TO_MM;
    let mut x = plan.geometry.margin_mm;
    for (lines, width) in cells.iter().zip(&plan.column_widths) {
        for (index, line) in lines.iter().enumerate() {
            let baseline = top - CELL_PADDING_MM - ascent - index as f32 * plan.line_height();
            layer.use_text(line.as_str(), plan.font_size, Mm(x + CELL_PADDING_MM), Mm(baseline), font);
        }
        x += width;
    }
    let bottom = top - height;
    rule(layer, (plan.geometry.margin_mm, bottom), (x, bottom));
    bottom
}

fn pdf_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Pdf(e.to_string())
}

fn draw_column_rules(layer: &PdfLayerReference, plan: &PdfPlan, top: f32, bottom: f32) {
    let mut x = plan.geometry.margin_mm;
    rule(layer, (x, top), (x, bottom));
    for width in &plan.column_widths {
        x += width;
        rule(layer, (x, top), (x, bottom));
    }
}

/// A4 document in Helvetica with the header repeated on every page and a
/// page number footer.
pub fn to_pdf(table: &ExportTable, settings: &ExportSettings) -> Result<Vec<u8>, ExportError> {
    let plan = plan_pdf(table, PageGeometry::a4(settings.pdf_landscape), settings.pdf_font_size);
    let geometry = plan.geometry;
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Data export",
        Mm(geometry.width_mm),
        Mm(geometry.height_mm),
        "Layer 1",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;

    let page_count = plan.pages.len();
    for (page_index, rows) in plan.pages.iter().enumerate() {
        let layer = if page_index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(geometry.width_mm), Mm(geometry.height_mm), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        let top = geometry.top();
        let table_right = geometry.margin_mm + plan.column_widths.iter().sum::<f32>();
        rule(&layer, (geometry.margin_mm, top), (table_right, top));
        let mut y = draw_block(&layer, &plan, &plan.header, top, &bold);
        for row in rows.clone() {
            y = draw_block(&layer, &plan, &plan.rows[row], y, &regular);
        }
        draw_column_rules(&layer, &plan, top, y);

        layer.use_text(
            format!("Page {} of {page_count}", page_index + 1),
            plan.font_size,
            Mm(geometry.margin_mm),
            Mm(geometry.margin_mm - FOOTER_MM / 2.0),
            &regular,
        );
    }

    doc.save_to_bytes().map_err(pdf_error)
}
