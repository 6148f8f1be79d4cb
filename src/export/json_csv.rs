use crate::errors::{AppError, AppResult};
use crate::export::model::ProgramTable;
use crate::export::notify_export_success;
use crate::ui::messages::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Array of program tables, pretty-printed.
pub(crate) fn export_json(tables: &[ProgramTable], path: &Path) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    let json_data = serde_json::to_string_pretty(tables)?;

    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;

    notify_export_success("JSON", path);
    Ok(())
}

/// One section per program: title line, header row, data rows, blank line.
pub(crate) fn export_csv(tables: &[ProgramTable], path: &Path) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    let mut file = File::create(path)?;
    for table in tables {
        file.write_all(&csv_section(table)?)?;
        file.write_all(b"\n")?;
    }
    file.flush()?;

    notify_export_success("CSV", path);
    Ok(())
}

fn csv_section(table: &ProgramTable) -> AppResult<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());

    wtr.write_record([table.title()]).map_err(csv_error)?;
    wtr.write_record(&table.headers).map_err(csv_error)?;
    for row in table.cell_rows() {
        wtr.write_record(&row).map_err(csv_error)?;
    }

    wtr.into_inner()
        .map_err(|e| AppError::Export(format!("CSV write error: {e}")))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Export(format!("CSV write error: {e}"))
}
