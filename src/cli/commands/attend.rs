use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::attendance::AttendanceLogic;
use crate::errors::AppResult;
use crate::models::attendance::AttendanceRecord;
use crate::store::open_store;
use crate::ui::messages::{info, success};
use crate::utils::table::{Column, Table};
use std::fs;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Attend {
        program,
        participant,
        session,
        all,
        signature,
        signature_file,
    } = cmd
    {
        let signature = match (signature, signature_file) {
            (Some(s), _) => s.clone(),
            (None, Some(path)) => fs::read_to_string(path)?.trim_end().to_string(),
            (None, None) => String::new(),
        };

        let mut store = open_store(cfg)?;
        let store = store.as_mut();

        if *all {
            let outcome =
                AttendanceLogic::record_all_remaining_sessions(store, *participant, *program, &signature)?;
            if outcome.records.is_empty() {
                info("Every session is already signed; nothing to do.");
                return Ok(());
            }
            success(format!("{} session(s) signed.", outcome.created_count));
            print_records(&outcome.records);
        } else if let [single] = session.as_slice() {
            let record = AttendanceLogic::record_single_session(store, *participant, *program, *single, &signature)?;
            success(format!(
                "Session {} signed for participant {}.",
                record.session_number, record.participant_id
            ));
            print_records(std::slice::from_ref(&record));
        } else {
            let outcome =
                AttendanceLogic::record_bulk_sessions(store, *participant, *program, session, &signature)?;
            success(format!(
                "{} session(s) signed, {} new.",
                outcome.records.len(),
                outcome.created_count
            ));
            print_records(&outcome.records);
        }
    }

    Ok(())
}

pub(crate) fn print_records(records: &[AttendanceRecord]) {
    let mut table = Table::new(vec![
        Column::right("ID"),
        Column::right("Participant"),
        Column::right("Program"),
        Column::right("Session"),
        Column::left("Attended at"),
    ]);
    for r in records {
        table.add_row(vec![
            r.id.to_string(),
            r.participant_id.to_string(),
            r.program_id.to_string(),
            r.session_number.to_string(),
            r.attended_at.clone(),
        ]);
    }
    print!("{}", table.render());
}
