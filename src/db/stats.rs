use crate::db::pool::DbPool;
use crate::db::queries::count_rows;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}", CYAN, RESET, db_path);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROW COUNTS
    //
    for table in ["programs", "participants", "attendance"] {
        let count = count_rows(&pool.conn, table)?;
        println!("{}• {}:{} {}{}{}", CYAN, table, RESET, GREEN, count, RESET);
    }

    //
    // 3) ATTENDANCE DATE RANGE
    //
    let bounds: Option<(Option<String>, Option<String>)> = pool
        .conn
        .query_row(
            "SELECT MIN(substr(attended_at, 1, 10)), MAX(substr(attended_at, 1, 10)) FROM attendance",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (first, last) = bounds.unwrap_or((None, None));
    let dash = format!("{GREY}--{RESET}");

    println!("{}• Signatures recorded:{}", CYAN, RESET);
    println!("    from: {}", first.unwrap_or_else(|| dash.clone()));
    println!("    to:   {}", last.unwrap_or(dash));

    println!();
    Ok(())
}

/// Run SQLite's own consistency check; returns the reported problems.
pub fn sqlite_integrity_check(pool: &DbPool) -> AppResult<Vec<String>> {
    let mut stmt = pool.conn.prepare("PRAGMA integrity_check")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut problems = Vec::new();
    for r in rows {
        let line = r?;
        if line != "ok" {
            problems.push(line);
        }
    }
    Ok(problems)
}
