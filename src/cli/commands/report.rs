use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::roster::load_rosters;
use crate::core::stats::{
    IncompleteEntry, ProgramStats, ReportTotals, incomplete_participants, program_stats, report_totals,
};
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::{header, info};
use crate::utils::colors::{CYAN, GREEN, RESET, YELLOW};
use crate::utils::percent;
use crate::utils::table::{Column, Table};
use serde::Serialize;

#[derive(Serialize)]
struct Report {
    totals: ReportTotals,
    programs: Vec<ProgramStats>,
    incomplete: Vec<IncompleteEntry>,
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report { program, json } = cmd {
        let mut store = open_store(cfg)?;
        let rosters = load_rosters(store.as_mut(), *program)?;

        let report = Report {
            totals: report_totals(&rosters),
            programs: rosters.iter().map(program_stats).collect(),
            incomplete: incomplete_participants(&rosters),
        };

        if *json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &Report) {
    let t = &report.totals;
    header("Attendance report");
    println!("{CYAN}• Programs:{RESET} {}", t.programs);
    println!("{CYAN}• Participants:{RESET} {}", t.participants);
    println!("{CYAN}• Attendance records:{RESET} {}", t.attendance_records);
    println!("{CYAN}• Completed:{RESET} {GREEN}{}{RESET}", t.complete_participants);
    println!("{CYAN}• Gifts handed out:{RESET} {}", t.gifts_received);

    for stats in &report.programs {
        header(format!("{} ({} sessions)", stats.program_name, stats.total_sessions));
        println!(
            "Attendance {} · completion {} · {} participant(s)",
            percent(stats.overall_rate),
            percent(stats.completion_rate),
            stats.participant_count
        );

        let mut table = Table::new(vec![Column::left("Session"), Column::right("Present"), Column::right("Rate")]);
        for s in &stats.sessions {
            table.add_row(vec![
                format!("Session {}", s.session_number),
                s.attended.to_string(),
                percent(s.rate),
            ]);
        }
        print!("{}", table.render());
    }

    header("Incomplete participants");
    if report.incomplete.is_empty() {
        info("Every participant completed their program.");
        return;
    }

    let mut table = Table::new(vec![
        Column::left("Program"),
        Column::right("ID"),
        Column::left("Name"),
        Column::right("Attended"),
    ]);
    for e in &report.incomplete {
        table.add_row(vec![
            e.program.name.clone(),
            e.participant.id.to_string(),
            e.participant.name.clone(),
            format!("{YELLOW}{}/{}{RESET}", e.attended, e.total),
        ]);
    }
    print!("{}", table.render());
}
