use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::BackupLogic;
use crate::errors::AppResult;
use crate::store::open_store;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup { file, compress } = cmd {
        let mut store = open_store(cfg)?;
        BackupLogic::backup(store.as_mut(), cfg, file, *compress)?;
    }

    Ok(())
}
