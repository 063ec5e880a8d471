use rust_xlsxwriter::{Color, Format, FormatBorder, FormatPattern, Workbook};

use super::{ExportError, ExportFormat, ExportTable};

const SHEET_NAME: &str = "Data";
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;
const MIN_WIDTH: usize = 8;
const MAX_WIDTH: usize = 60;

/// Character width of the widest cell in each column, header included.
fn content_widths(table: &ExportTable) -> Vec<f64> {
    (0..table.column_count())
        .map(|col| {
            let widest = std::iter::once(&table.headers[col])
                .chain(table.rows.iter().filter_map(|row| row.get(col)))
                .map(|text| text.chars().count())
                .max()
                .unwrap_or(0);
            (widest.clamp(MIN_WIDTH, MAX_WIDTH) + 2) as f64
        })
        .collect()
}

/// Single "Data" sheet. The header is bold on a light gray fill, every cell
/// has thin borders.
pub fn to_xlsx(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    if table.row_count() + 1 > MAX_ROWS || table.column_count() > MAX_COLUMNS {
        return Err(ExportError::TooLarge {
            format: ExportFormat::Xlsx,
            rows: table.row_count(),
            columns: table.column_count(),
        });
    }

    let header_format = Format::new()
        .set_bold()
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(0xCCCCCC))
        .set_border(FormatBorder::Thin);
    let cell_format = Format::new().set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    // Bounds were checked above, so the index conversions cannot truncate.
    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    for (row_index, row) in table.rows.iter().enumerate() {
        for (col, text) in row.iter().enumerate() {
            worksheet.write_string_with_format(
                row_index as u32 + 1,
                col as u16,
                text,
                &cell_format,
            )?;
        }
    }
    for (col, width) in content_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width)?;
    }

    Ok(workbook.save_to_buffer()?)
}
