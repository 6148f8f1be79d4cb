use crate::cli::parser::{Cli, Commands};
use crate::config::{Backend, Config};
use crate::errors::AppResult;
use crate::store::seed::seed_snapshot;
use crate::store::{CacheStore, RecordStore, SqliteStore};
use crate::ui::messages::{info, success, warning};
use crate::utils::path::expand_tilde;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (not in test mode)
///  - the SQLite database and its migrations, or the cache directory
///  - optionally the demo data set (`--seed`)
pub fn handle(cli: &Cli) -> AppResult<()> {
    let seed = matches!(cli.command, Commands::Init { seed: true });

    let mut cfg = Config::init_all(cli.db.as_deref(), cli.test)?;
    // --db is already resolved by init_all
    if let Some(dir) = &cli.cache_dir {
        cfg.cache_dir = dir.clone();
    }
    if let Some(backend) = cli.backend {
        cfg.backend = backend;
    }

    println!("⚙️  Initializing rAttendance…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Backend    : {}", cfg.backend.as_str());

    match cfg.backend {
        Backend::Sqlite => init_sqlite(&cfg, seed)?,
        Backend::Cache => init_cache(&cfg, seed)?,
        Backend::Seed => info("The seed backend is read-only; nothing to initialize."),
    }

    println!("🎉 rAttendance initialization completed!");
    Ok(())
}

fn init_sqlite(cfg: &Config, seed: bool) -> AppResult<()> {
    let db_path = expand_tilde(&cfg.database);
    let mut store = SqliteStore::open(&db_path.to_string_lossy(), cfg.busy_timeout_ms)?;
    success(format!("Database initialized at {}", db_path.display()));

    if let Err(e) = store.log(
        "init",
        "Database initialized",
        &format!("Database initialized at {}", db_path.display()),
    ) {
        warning(format!("Failed to write internal log: {e}"));
    }

    if seed {
        if store.import_snapshot(&seed_snapshot())? {
            success("Demo data loaded.");
            if let Err(e) = store.log("seed", "", "Demo programs, participants and records loaded") {
                warning(format!("Failed to write internal log: {e}"));
            }
        } else {
            warning("The database already holds programs; demo data not loaded.");
        }
    }
    Ok(())
}

fn init_cache(cfg: &Config, seed: bool) -> AppResult<()> {
    let cache = CacheStore::new(expand_tilde(&cfg.cache_dir));
    std::fs::create_dir_all(cache.dir())?;

    if cache.exists() {
        info(format!("Cache already present in {}", cache.dir().display()));
    } else if seed {
        cache.save(&seed_snapshot())?;
        success(format!("Demo data written to {}", cache.dir().display()));
    } else {
        success(format!(
            "Cache directory ready at {} (filled from demo data on first read)",
            cache.dir().display()
        ));
    }
    Ok(())
}
