use crate::errors::AppResult;
use crate::models::attendance::AttendanceFilter;
use crate::models::program::Program;
use crate::models::roster::ProgramRoster;
use crate::store::RecordStore;

fn roster_of(store: &mut dyn RecordStore, program: Program) -> AppResult<ProgramRoster> {
    let participants = store.list_participants(Some(program.id))?;
    let records = store.list_attendance(&AttendanceFilter::for_program(program.id))?;
    Ok(ProgramRoster::new(program, participants, records))
}

pub fn load_roster(store: &mut dyn RecordStore, program_id: i64) -> AppResult<ProgramRoster> {
    let program = store.get_program(program_id)?;
    roster_of(store, program)
}

/// One roster per program, in program order.
pub fn load_all_rosters(store: &mut dyn RecordStore) -> AppResult<Vec<ProgramRoster>> {
    let mut out = Vec::new();
    for program in store.list_programs()? {
        out.push(roster_of(store, program)?);
    }
    Ok(out)
}

/// A single program when `program_id` is given, every program otherwise.
pub fn load_rosters(store: &mut dyn RecordStore, program_id: Option<i64>) -> AppResult<Vec<ProgramRoster>> {
    match program_id {
        Some(id) => Ok(vec![load_roster(store, id)?]),
        None => load_all_rosters(store),
    }
}
