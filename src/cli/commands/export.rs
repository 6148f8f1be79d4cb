use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::store::open_store;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        program,
        file,
        force,
    } = cmd
    {
        let mut store = open_store(cfg)?;
        ExportLogic::export(store.as_mut(), cfg, *format, *program, file.as_deref(), *force)?;
    }
    Ok(())
}
