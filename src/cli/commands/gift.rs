use crate::cli::parser::GiftCmd;
use crate::config::Config;
use crate::core::roster::load_rosters;
use crate::core::stats::gift_overview;
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{GREEN, RESET, colorize_flag};
use crate::utils::percent;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &GiftCmd, cfg: &Config) -> AppResult<()> {
    let mut store = open_store(cfg)?;

    match cmd {
        GiftCmd::Set {
            participant,
            received,
            not_received: _,
            toggle,
        } => {
            let value = if *toggle {
                !store.get_participant(*participant)?.gift_received
            } else {
                *received
            };

            let p = store.set_gift_status(*participant, value)?;
            let label = if p.gift_received {
                &cfg.gift_received_label
            } else {
                &cfg.gift_pending_label
            };
            success(format!("Gift status of {} (id {}): {label}", p.name, p.id));

            if let Err(e) = store.log("gift", &format!("participant {}", p.id), label) {
                warning(format!("Failed to write internal log: {e}"));
            }
        }
        GiftCmd::List { program, received } => {
            let rosters = load_rosters(store.as_mut(), *program)?;
            let entries = gift_overview(&rosters, *received);
            if entries.is_empty() {
                info("No participants found.");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::right("ID"),
                Column::left("Name"),
                Column::left("Program"),
                Column::right("Attended"),
                Column::right("Rate"),
                Column::left("Complete"),
                Column::left("Gift"),
            ]);
            for e in &entries {
                table.add_row(vec![
                    e.participant.id.to_string(),
                    e.participant.name.clone(),
                    e.program_name.clone(),
                    format!("{}/{}", e.attended, e.total_sessions),
                    percent(e.rate),
                    if e.eligible {
                        format!("{GREEN}yes{RESET}")
                    } else {
                        "no".to_string()
                    },
                    colorize_flag(e.gift_received, &cfg.gift_received_label, &cfg.gift_pending_label),
                ]);
            }
            print!("{}", table.render());

            let given = entries.iter().filter(|e| e.gift_received).count();
            println!("\n{given}/{} gift(s) handed out.", entries.len());
        }
    }

    Ok(())
}
