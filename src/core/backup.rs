use crate::config::{Backend, Config};
use crate::errors::{AppError, AppResult};
use crate::store::cache::{ATTENDANCE_FILE, HIERARCHY_FILE};
use crate::store::RecordStore;
use crate::ui::messages::{confirm, info, success, warning};
use crate::utils::path::expand_tilde;
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the active data files to `dest_file`.
    ///
    /// The SQLite backend copies the database file (zipped with `compress`);
    /// the cache backend always writes a zip holding both cache files.
    /// Returns the path written, or `None` when the user declined to
    /// overwrite an existing file.
    pub fn backup(
        store: &mut dyn RecordStore,
        cfg: &Config,
        dest_file: &str,
        compress: bool,
    ) -> AppResult<Option<PathBuf>> {
        let dest = Path::new(dest_file);
        if !dest.is_absolute() {
            return Err(AppError::InvalidInput(format!(
                "backup path must be absolute: {dest_file}"
            )));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let final_path = match cfg.backend {
            Backend::Sqlite => {
                let src = expand_tilde(&cfg.database);
                if !src.exists() {
                    return Err(AppError::NotFound(format!("database {}", src.display())));
                }
                let target = if compress {
                    dest.with_extension("zip")
                } else {
                    dest.to_path_buf()
                };
                if !may_overwrite(&target)? {
                    return Ok(None);
                }

                if compress {
                    zip_files(&target, &[src.as_path()])?;
                } else {
                    fs::copy(&src, &target)?;
                }
                target
            }
            Backend::Cache => {
                let dir = expand_tilde(&cfg.cache_dir);
                let files = [dir.join(HIERARCHY_FILE), dir.join(ATTENDANCE_FILE)];
                if let Some(missing) = files.iter().find(|f| !f.exists()) {
                    return Err(AppError::NotFound(format!("cache file {}", missing.display())));
                }
                if !compress {
                    info("Cache backups are always written as zip archives.");
                }
                let target = dest.with_extension("zip");
                if !may_overwrite(&target)? {
                    return Ok(None);
                }
                zip_files(&target, &[files[0].as_path(), files[1].as_path()])?;
                target
            }
            Backend::Seed => {
                return Err(AppError::InvalidInput(
                    "the seed backend has no data files to back up".into(),
                ));
            }
        };

        success(format!("Backup created: {}", final_path.display()));

        let message = if compress {
            "Backup created and compressed"
        } else {
            "Backup created"
        };
        if let Err(e) = store.log("backup", &final_path.to_string_lossy(), message) {
            warning(format!("Backup written but not logged: {e}"));
        }

        Ok(Some(final_path))
    }
}

fn may_overwrite(path: &Path) -> AppResult<bool> {
    if !path.exists() {
        return Ok(true);
    }
    warning(format!("The file '{}' already exists.", path.display()));
    if confirm("Do you want to overwrite it?")? {
        Ok(true)
    } else {
        info("Backup cancelled by user.");
        Ok(false)
    }
}

/// Write `files` into a new zip archive at `zip_path`, each under its file name.
fn zip_files(zip_path: &Path, files: &[&Path]) -> AppResult<()> {
    let file = fs::File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| AppError::InvalidInput(format!("not a file: {}", path.display())))?;

        zip.start_file(name, options).map_err(std::io::Error::other)?;
        let mut f = fs::File::open(path)?;
        std::io::copy(&mut f, &mut zip)?;
    }

    zip.finish().map_err(std::io::Error::other)?;
    Ok(())
}
