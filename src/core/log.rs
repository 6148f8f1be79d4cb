use crate::db::log::load_log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::table::{strip_ansi, visible_width};
use ansi_term::Colour;

const OP_WIDTH: usize = 60;

/// Colour of an audit operation.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "attend" => Colour::Green,
        "attendance_del" => Colour::Red,
        "program_add" | "participant_add" => Colour::Cyan,
        "program_edit" | "participant_edit" => Colour::Yellow,
        "gift" => Colour::RGB(255, 105, 180),
        "export" | "backup" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "init" | "seed" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

/// "op (target)" with only the operation coloured, cut to `OP_WIDTH`
/// visible characters.
fn op_target_cell(operation: &str, target: &str) -> String {
    let color = color_for_operation(operation);
    let plain = if target.is_empty() {
        operation.to_string()
    } else {
        format!("{operation} ({target})")
    };

    let plain = if plain.chars().count() > OP_WIDTH {
        let mut s: String = plain.chars().take(OP_WIDTH - 3).collect();
        s.push_str("...");
        s
    } else {
        plain
    };

    match plain.split_once(' ') {
        Some((op, rest)) => format!("{} {}", color.paint(op), rest),
        None => color.paint(plain.as_str()).to_string(),
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &DbPool) -> AppResult<()> {
        let entries = load_log(&pool.conn)?;
        if entries.is_empty() {
            info("The log is empty.");
            return Ok(());
        }

        let rows: Vec<(i64, String, String, String)> = entries
            .into_iter()
            .map(|e| {
                let date = chrono::DateTime::parse_from_rfc3339(&e.date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or(e.date);
                let cell = op_target_cell(&e.operation, &e.target);
                (e.id, date, cell, e.message)
            })
            .collect();

        let id_w = rows.iter().map(|r| r.0.to_string().len()).max().unwrap_or(1);
        let date_w = rows.iter().map(|r| r.1.len()).max().unwrap_or(10);
        let op_w = rows
            .iter()
            .map(|r| strip_ansi(&r.2).chars().count())
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH);

        println!("📜 Internal log:\n");

        for (id, date, cell, message) in rows {
            let padding = " ".repeat(op_w.saturating_sub(visible_width(&cell)));
            println!("{id:>id_w$}: {date:<date_w$} | {cell}{padding} => {message}");
        }

        Ok(())
    }
}
