use crate::cli::parser::Commands;
use crate::config::{Backend, Config};
use crate::core::log::LogLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        if cfg.backend != Backend::Sqlite {
            info("The internal log is kept in the SQLite database only.");
            return Ok(());
        }
        let pool = DbPool::with_timeout(&expand_tilde(&cfg.database).to_string_lossy(), cfg.busy_timeout_ms)?;
        LogLogic::print_log(&pool)?;
    }

    Ok(())
}
