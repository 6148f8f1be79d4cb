use crate::cli::commands::attend::print_records;
use crate::cli::parser::AttendanceCmd;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::attendance::AttendanceFilter;
use crate::store::open_store;
use crate::ui::messages::{info, success, warning};
use crate::utils::date::parse_range;

pub fn handle(cmd: &AttendanceCmd, cfg: &Config) -> AppResult<()> {
    let mut store = open_store(cfg)?;

    match cmd {
        AttendanceCmd::List {
            program,
            participant,
            session,
            range,
        } => {
            let (from, to) = match range {
                Some(r) => {
                    let (a, b) = parse_range(r)?;
                    (Some(a), Some(b))
                }
                None => (None, None),
            };
            let filter = AttendanceFilter {
                program_id: *program,
                participant_id: *participant,
                session_number: *session,
                from,
                to,
            };

            let records = store.list_attendance(&filter)?;
            if records.is_empty() {
                info("No attendance records found.");
            } else {
                print_records(&records);
            }
        }
        AttendanceCmd::Del { id } => {
            store.delete_attendance(*id)?;
            success(format!("Attendance record {id} deleted."));
            if let Err(e) = store.log("attendance_del", &format!("record {id}"), "Attendance record deleted") {
                warning(format!("Failed to write internal log: {e}"));
            }
        }
    }

    Ok(())
}
