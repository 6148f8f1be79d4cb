pub mod attendance;
pub mod backup;
pub mod integrity;
pub mod log;
pub mod roster;
pub mod stats;
