use crate::config::Config;
use crate::core::roster::load_rosters;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::{GiftLabels, build_all_programs_tables_with, export_file_name};
use crate::export::pdf_export::export_pdf;
use crate::export::xlsx::export_xlsx;
use crate::store::RecordStore;
use crate::ui::messages::warning;
use crate::utils::date::today;
use crate::utils::path::expand_tilde;
use std::path::{Path, PathBuf};

/// High-level export entry point.
pub struct ExportLogic;

impl ExportLogic {
    /// Export one program (`program = Some(id)`) or all programs.
    ///
    /// `file` must be absolute when given; otherwise the file goes to
    /// `export_dir` under the `{program}_{date}.{ext}` name. Returns the path
    /// written, or `None` when there was nothing to export.
    pub fn export(
        store: &mut dyn RecordStore,
        cfg: &Config,
        format: ExportFormat,
        program: Option<i64>,
        file: Option<&str>,
        force: bool,
    ) -> AppResult<Option<PathBuf>> {
        let rosters = load_rosters(store, program)?;
        if rosters.is_empty() {
            warning("No programs to export.");
            return Ok(None);
        }

        let path = match file {
            Some(f) => {
                let p = Path::new(f);
                if !p.is_absolute() {
                    return Err(AppError::InvalidInput(format!(
                        "output file path must be absolute: {f}"
                    )));
                }
                p.to_path_buf()
            }
            None => {
                let name = program.and_then(|_| rosters.first()).map(|r| r.program.name.as_str());
                expand_tilde(&cfg.export_dir).join(export_file_name(name, format.extension(), today()))
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        ensure_writable(&path, force)?;

        let labels = GiftLabels {
            received: cfg.gift_received_label.clone(),
            pending: cfg.gift_pending_label.clone(),
        };
        let tables = build_all_programs_tables_with(&rosters, &labels);

        match format {
            ExportFormat::Csv => export_csv(&tables, &path)?,
            ExportFormat::Json => export_json(&tables, &path)?,
            ExportFormat::Xlsx => export_xlsx(&tables, &path)?,
            ExportFormat::Pdf => export_pdf(&tables, &path)?,
        }

        let message = format!("{} program(s) as {}", tables.len(), format.as_str());
        if let Err(e) = store.log("export", &path.to_string_lossy(), &message) {
            warning(format!("Export written but not logged: {e}"));
        }

        Ok(Some(path))
    }
}
