use crate::cli::parser::Commands;
use crate::config::{Backend, Config};
use crate::core::integrity::check_store;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::info as info_msg;
use crate::utils::colors::{CYAN, GREEN, RED, RESET};
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check,
        info,
    } = cmd
    {
        let db_path = expand_tilde(&cfg.database).to_string_lossy().to_string();
        let sqlite = cfg.backend == Backend::Sqlite;

        let pool = if sqlite && (*migrate || *info || *check) {
            Some(DbPool::with_timeout(&db_path, cfg.busy_timeout_ms)?)
        } else {
            None
        };

        if (*migrate || *info) && !sqlite {
            info_msg(format!(
                "--migrate and --info apply to the sqlite backend (current: {}).",
                cfg.backend.as_str()
            ));
        }

        //
        // 1) MIGRATE
        //
        if *migrate && let Some(pool) = &pool {
            println!("{}▶ Running migrations…{}", CYAN, RESET);
            run_pending_migrations(&pool.conn)?;
            println!("{}✔ Migration completed.{}\n", GREEN, RESET);
        }

        //
        // 2) INFO
        //
        if *info && let Some(pool) = &pool {
            stats::print_db_info(pool, &db_path)?;
        }

        //
        // 3) CHECK
        //
        if *check {
            if let Some(pool) = &pool {
                println!("{}▶ Running SQLite integrity check…{}", CYAN, RESET);
                let problems = stats::sqlite_integrity_check(pool)?;
                if problems.is_empty() {
                    println!("{}✔ Integrity check passed.{}", GREEN, RESET);
                } else {
                    for p in &problems {
                        println!("{}✘ {}{}", RED, p, RESET);
                    }
                }
            }

            println!("{}▶ Checking attendance records…{}", CYAN, RESET);
            let mut store = open_store(cfg)?;
            let issues = check_store(store.as_mut())?;
            if issues.is_empty() {
                println!("{}✔ No attendance inconsistencies found.{}\n", GREEN, RESET);
            } else {
                for issue in &issues {
                    println!("{}✘ {}{}", RED, issue, RESET);
                }
                println!();
            }
        }
    }

    Ok(())
}
