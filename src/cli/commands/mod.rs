pub mod attend;
pub mod attendance;
pub mod backup;
pub mod config;
pub mod db;
pub mod export;
pub mod gift;
pub mod init;
pub mod log;
pub mod participant;
pub mod program;
pub mod report;
pub mod status;
