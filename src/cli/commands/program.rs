use crate::cli::parser::ProgramCmd;
use crate::config::Config;
use crate::core::roster::load_roster;
use crate::core::stats::program_stats;
use crate::errors::{AppError, AppResult};
use crate::models::program::{NewProgram, Program, ProgramChanges};
use crate::store::{RecordStore, open_store};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{CYAN, RESET};
use crate::utils::date::require_date;
use crate::utils::percent;
use crate::utils::table::{Column, Table};
use std::collections::HashMap;

pub fn handle(cmd: &ProgramCmd, cfg: &Config) -> AppResult<()> {
    let mut store = open_store(cfg)?;
    let store = store.as_mut();

    match cmd {
        ProgramCmd::List => list(store),
        ProgramCmd::Show { id } => show(store, *id),
        ProgramCmd::Add {
            name,
            description,
            sessions,
            start,
            end,
        } => {
            let input = NewProgram {
                name: name.trim().to_string(),
                description: description.clone(),
                total_sessions: *sessions,
                start_date: require_date(start)?,
                end_date: require_date(end)?,
            };
            let program = store.create_program(&input)?;
            success(format!(
                "Program {} created: {} ({} sessions)",
                program.id, program.name, program.total_sessions
            ));
            audit(store, "program_add", &program, "created");
            Ok(())
        }
        ProgramCmd::Edit {
            id,
            name,
            description,
            sessions,
            start,
            end,
        } => {
            let changes = ProgramChanges {
                name: name.clone(),
                description: description.clone(),
                total_sessions: *sessions,
                start_date: start.as_deref().map(require_date).transpose()?,
                end_date: end.as_deref().map(require_date).transpose()?,
            };
            if changes.is_empty() {
                return Err(AppError::InvalidInput("nothing to change".into()));
            }

            let before = store.get_program(*id)?;
            let program = store.update_program(*id, &changes)?;
            success(format!("Program {} updated.", program.id));
            if program.total_sessions < before.total_sessions {
                warning(format!(
                    "Sessions above {} are no longer counted; run `db --check` to list affected records.",
                    program.total_sessions
                ));
            }
            audit(store, "program_edit", &program, "updated");
            Ok(())
        }
    }
}

fn audit(store: &mut dyn RecordStore, op: &str, program: &Program, what: &str) {
    let target = format!("program {}", program.id);
    if let Err(e) = store.log(op, &target, &format!("{} {what}", program.name)) {
        warning(format!("Failed to write internal log: {e}"));
    }
}

fn list(store: &mut dyn RecordStore) -> AppResult<()> {
    let programs = store.list_programs()?;
    if programs.is_empty() {
        info("No programs found.");
        return Ok(());
    }

    let mut enrolled: HashMap<i64, usize> = HashMap::new();
    for p in store.list_participants(None)? {
        *enrolled.entry(p.program_id).or_default() += 1;
    }

    let mut table = Table::new(vec![
        Column::right("ID"),
        Column::left("Name"),
        Column::right("Sessions"),
        Column::left("Start"),
        Column::left("End"),
        Column::right("Participants"),
    ]);
    for p in &programs {
        table.add_row(vec![
            p.id.to_string(),
            p.name.clone(),
            p.total_sessions.to_string(),
            p.start_str(),
            p.end_str(),
            enrolled.get(&p.id).copied().unwrap_or(0).to_string(),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}

fn show(store: &mut dyn RecordStore, id: i64) -> AppResult<()> {
    let roster = load_roster(store, id)?;
    let stats = program_stats(&roster);
    let p = &roster.program;

    header(&p.name);
    if !p.description.is_empty() {
        println!("{}", p.description);
    }
    println!("{CYAN}• Dates:{RESET} {} → {}", p.start_str(), p.end_str());
    println!("{CYAN}• Sessions:{RESET} {}", p.total_sessions);
    println!("{CYAN}• Participants:{RESET} {}", stats.participant_count);
    println!("{CYAN}• Records:{RESET} {}", stats.total_records);
    println!("{CYAN}• Attendance rate:{RESET} {}", percent(stats.overall_rate));
    println!("{CYAN}• Completion rate:{RESET} {}", percent(stats.completion_rate));
    println!();

    let mut table = Table::new(vec![
        Column::right("Session"),
        Column::right("Present"),
        Column::right("Rate"),
    ]);
    for s in &stats.sessions {
        table.add_row(vec![
            s.session_number.to_string(),
            s.attended.to_string(),
            percent(s.rate),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}
