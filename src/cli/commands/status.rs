use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::attendance::AttendanceLogic;
use crate::core::roster::{load_all_rosters, load_roster};
use crate::core::stats::{counted_sessions, is_complete, participant_attendance_rate, program_stats};
use crate::errors::AppResult;
use crate::models::roster::ProgramRoster;
use crate::store::{RecordStore, open_store, sort_by_name};
use crate::ui::messages::{header, info};
use crate::utils::colors::{CYAN, GREEN, RESET, color_for_rate};
use crate::utils::formatting::{session_list, session_strip};
use crate::utils::percent;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Status {
        program,
        participant,
    } = cmd
    {
        let mut store = open_store(cfg)?;
        let store = store.as_mut();

        match (program, participant) {
            (_, Some(pid)) => {
                let program_id = match program {
                    Some(id) => *id,
                    None => store.get_participant(*pid)?.program_id,
                };
                participant_status(store, *pid, program_id)?;
            }
            (Some(id), None) => program_status(&load_roster(store, *id)?),
            (None, None) => overview(store)?,
        }
    }
    Ok(())
}

fn participant_status(store: &mut dyn RecordStore, participant_id: i64, program_id: i64) -> AppResult<()> {
    let status = AttendanceLogic::list_attendance_status(store, participant_id, program_id)?;
    let total = status.program.total_sessions;

    header(format!("{} · {}", status.participant.name, status.program.name));
    let rate = status.attended.len() as f64 / total as f64;
    let color = color_for_rate(rate, status.is_complete());
    println!(
        "{CYAN}• Sessions:{RESET} {color}{}{RESET} {}/{}",
        session_strip(total, &status.attended),
        status.attended.len(),
        total
    );
    println!("{CYAN}• Attended:{RESET} {}", session_list(&status.attended));
    println!("{CYAN}• Remaining:{RESET} {}", session_list(&status.remaining));
    if status.is_complete() {
        println!("{GREEN}✔ All sessions attended.{RESET}");
    }
    Ok(())
}

/// Attendance grid of one program, participants by name.
fn program_status(roster: &ProgramRoster) {
    let program = &roster.program;
    header(format!("{} ({} sessions)", program.name, program.total_sessions));

    let mut participants = roster.participants.clone();
    if participants.is_empty() {
        info("No participants enrolled.");
        return;
    }
    sort_by_name(&mut participants);

    let mut table = Table::new(vec![
        Column::right("ID"),
        Column::left("Name"),
        Column::left("Sessions"),
        Column::right("Attended"),
        Column::right("Rate"),
    ]);
    for p in &participants {
        let attended = counted_sessions(p, roster);
        let rate = participant_attendance_rate(p, roster);
        let color = color_for_rate(rate, is_complete(p, roster));
        table.add_row(vec![
            p.id.to_string(),
            p.name.clone(),
            format!("{color}{}{RESET}", session_strip(program.total_sessions, &attended)),
            format!("{}/{}", attended.len(), program.total_sessions),
            format!("{color}{}{RESET}", percent(rate)),
        ]);
    }
    print!("{}", table.render());
}

fn overview(store: &mut dyn RecordStore) -> AppResult<()> {
    let rosters = load_all_rosters(store)?;
    if rosters.is_empty() {
        info("No programs found.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::right("ID"),
        Column::left("Program"),
        Column::right("Sessions"),
        Column::right("Participants"),
        Column::right("Attendance"),
        Column::right("Completed"),
    ]);
    for roster in &rosters {
        let stats = program_stats(roster);
        table.add_row(vec![
            stats.program_id.to_string(),
            stats.program_name.clone(),
            stats.total_sessions.to_string(),
            stats.participant_count.to_string(),
            percent(stats.overall_rate),
            percent(stats.completion_rate),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}
