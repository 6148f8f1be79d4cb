use crate::errors::{AppError, AppResult};
use crate::export::model::{PRESENT, ProgramTable};
use crate::export::notify_export_success;
use crate::ui::messages::info;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::collections::HashSet;
use std::path::Path;
use unicode_width::UnicodeWidthStr;

const MAX_SHEET_NAME: usize = 31;

/// One worksheet per program.
pub(crate) fn export_xlsx(tables: &[ProgramTable], path: &Path) -> AppResult<()> {
    info(format!("Exporting to XLSX: {}", path.display()));

    let mut workbook = Workbook::new();
    let mut used_names = HashSet::new();

    for table in tables {
        let name = unique_sheet_name(&table.program_name, &mut used_names);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name).map_err(xlsx_error)?;
        write_table(worksheet, table)?;
    }

    workbook.save(path).map_err(xlsx_error)?;

    notify_export_success("XLSX", path);
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &ProgramTable) -> AppResult<()> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, header.as_str(), &header_format)
            .map_err(xlsx_error)?;
    }
    worksheet.set_freeze_panes(1, 0).map_err(xlsx_error)?;

    let mut widths: Vec<usize> = table
        .headers
        .iter()
        .map(|h| UnicodeWidthStr::width(h.as_str()))
        .collect();

    // name .. gift, then one column per session, then attended and rate
    let first_session = 6;
    let attended_col = first_session + table.total_sessions as usize;

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let band = if i % 2 == 0 {
            Color::RGB(0xEAF3FB)
        } else {
            Color::RGB(0xFFFFFF)
        };

        for (col, value) in row.cells().iter().enumerate() {
            let mut fmt = Format::new()
                .set_background_color(band)
                .set_pattern(FormatPattern::Solid)
                .set_border(FormatBorder::Thin);

            if (first_session..attended_col).contains(&col) {
                let color = if value == PRESENT { 0x1E7B34 } else { 0xA6A6A6 };
                fmt = fmt.set_align(FormatAlign::Center).set_font_color(Color::RGB(color));
            }

            if col == attended_col {
                worksheet
                    .write_with_format(r, col as u16, row.total_attended as f64, &fmt.set_align(FormatAlign::Right))
                    .map_err(xlsx_error)?;
            } else {
                worksheet
                    .write_with_format(r, col as u16, value.as_str(), &fmt)
                    .map_err(xlsx_error)?;
            }

            widths[col] = widths[col].max(UnicodeWidthStr::width(value.as_str()));
        }
    }

    for (col, w) in widths.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, *w as f64 + 2.0)
            .map_err(xlsx_error)?;
    }

    Ok(())
}

/// Worksheet names: no `[]:*?/\`, at most 31 characters, unique.
fn unique_sheet_name(program_name: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = program_name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let base: String = if cleaned.is_empty() {
        "Program".to_string()
    } else {
        cleaned.chars().take(MAX_SHEET_NAME).collect()
    };

    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        candidate = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
        n += 1;
    }

    used.insert(candidate.to_lowercase());
    candidate
}

fn xlsx_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(format!("XLSX export error: {e}"))
}
