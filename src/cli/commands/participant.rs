use crate::cli::parser::ParticipantCmd;
use crate::config::Config;
use crate::core::roster::load_roster;
use crate::core::stats::participant_detail;
use crate::errors::{AppError, AppResult};
use crate::models::participant::{NewParticipant, Participant, ParticipantChanges};
use crate::store::{RecordStore, open_store, sort_by_name};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{CYAN, RESET, colorize_flag, colorize_optional, color_for_rate};
use crate::utils::formatting::{session_list, session_strip};
use crate::utils::percent;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &ParticipantCmd, cfg: &Config) -> AppResult<()> {
    let mut store = open_store(cfg)?;
    let store = store.as_mut();

    match cmd {
        ParticipantCmd::List { program } => list(store, *program, cfg),
        ParticipantCmd::Show { id } => show(store, *id),
        ParticipantCmd::Add {
            program,
            name,
            email,
            phone,
            department,
            position,
        } => {
            let input = NewParticipant {
                program_id: *program,
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                phone: phone.trim().to_string(),
                department: department.clone(),
                position: position.clone(),
            };
            let p = store.create_participant(&input)?;
            success(format!(
                "Participant {} ({}) enrolled in program {}.",
                p.id, p.name, p.program_id
            ));
            audit(store, "participant_add", &p, "enrolled");
            Ok(())
        }
        ParticipantCmd::Edit {
            id,
            name,
            email,
            phone,
            department,
            position,
        } => {
            let changes = ParticipantChanges {
                name: name.clone(),
                email: email.clone(),
                phone: phone.clone(),
                department: department.clone(),
                position: position.clone(),
                gift_received: None,
            };
            if changes.is_empty() {
                return Err(AppError::InvalidInput("nothing to change".into()));
            }
            let p = store.update_participant(*id, &changes)?;
            success(format!("Participant {} updated.", p.id));
            audit(store, "participant_edit", &p, "updated");
            Ok(())
        }
    }
}

fn audit(store: &mut dyn RecordStore, op: &str, p: &Participant, what: &str) {
    let target = format!("participant {}", p.id);
    if let Err(e) = store.log(op, &target, &format!("{} {what}", p.name)) {
        warning(format!("Failed to write internal log: {e}"));
    }
}

fn list(store: &mut dyn RecordStore, program: Option<i64>, cfg: &Config) -> AppResult<()> {
    let mut participants = store.list_participants(program)?;
    if let Some(id) = program {
        // validates the id and gives the title
        let p = store.get_program(id)?;
        header(format!("{} ({} sessions)", p.name, p.total_sessions));
        sort_by_name(&mut participants);
    }

    if participants.is_empty() {
        info("No participants found.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::right("ID"),
        Column::right("Program"),
        Column::left("Name"),
        Column::left("Email"),
        Column::left("Phone"),
        Column::left("Department"),
        Column::left("Position"),
        Column::left("Gift"),
    ]);
    for p in &participants {
        table.add_row(vec![
            p.id.to_string(),
            p.program_id.to_string(),
            p.name.clone(),
            colorize_optional(&p.email),
            colorize_optional(&p.phone),
            colorize_optional(p.department_str()),
            colorize_optional(p.position_str()),
            colorize_flag(p.gift_received, &cfg.gift_received_label, &cfg.gift_pending_label),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}

fn show(store: &mut dyn RecordStore, id: i64) -> AppResult<()> {
    let participant = store.get_participant(id)?;
    let roster = load_roster(store, participant.program_id)?;
    let detail = participant_detail(&participant, &roster);

    header(&participant.name);
    println!("{CYAN}• Program:{RESET} {} (id {})", detail.program_name, participant.program_id);
    println!("{CYAN}• Email:{RESET} {}", colorize_optional(&participant.email));
    println!("{CYAN}• Phone:{RESET} {}", colorize_optional(&participant.phone));
    println!("{CYAN}• Department:{RESET} {}", colorize_optional(participant.department_str()));
    println!("{CYAN}• Position:{RESET} {}", colorize_optional(participant.position_str()));
    println!(
        "{CYAN}• Gift:{RESET} {}",
        colorize_flag(participant.gift_received, "received", "not received")
    );

    let color = color_for_rate(detail.rate, detail.complete);
    println!(
        "{CYAN}• Sessions:{RESET} {color}{}{RESET} {}/{} ({})",
        session_strip(detail.total_sessions, &detail.attended),
        detail.attended.len(),
        detail.total_sessions,
        percent(detail.rate)
    );
    println!("{CYAN}• Attended:{RESET} {}", session_list(&detail.attended));
    println!("{CYAN}• Missed:{RESET} {}", session_list(&detail.missed));
    Ok(())
}
