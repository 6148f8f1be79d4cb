use crate::errors::{AppError, AppResult};
use crate::export::model::ProgramTable;
use crate::export::notify_export_success;
use crate::export::pdf::PdfDocument;
use crate::ui::messages::info;
use std::path::Path;

/// One titled table per program, each starting on its own page.
pub(crate) fn export_pdf(tables: &[ProgramTable], path: &Path) -> AppResult<()> {
    info(format!("Exporting to PDF: {}", path.display()));

    let mut pdf = PdfDocument::new();
    for table in tables {
        pdf.add_table(&table.title(), &table.headers, &table.cell_rows());
    }

    let pages = pdf.page_count();
    pdf.save(path)
        .map_err(|e| AppError::Export(format!("PDF export error: {e}")))?;

    notify_export_success(&format!("PDF ({pages} page(s))"), path);
    Ok(())
}
