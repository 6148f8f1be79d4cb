pub mod attendance;
pub mod participant;
pub mod program;
pub mod roster;
