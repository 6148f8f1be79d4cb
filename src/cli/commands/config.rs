use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{error, header, success, warning};
use std::path::Path;
use std::process::Command;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        edit_config,
        editor,
    } = cmd
    {
        if *print_config {
            header(format!("Configuration ({})", Config::config_file().display()));
            print!("{}", cfg.to_yaml()?);
        }

        if *edit_config {
            edit(&Config::config_file(), editor.as_deref());
        }
    }

    Ok(())
}

fn default_editor() -> String {
    ["EDITOR", "VISUAL"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| (if cfg!(target_os = "windows") { "notepad" } else { "nano" }).to_string())
}

/// Try the requested editor first, then the default one.
fn edit(path: &Path, requested: Option<&str>) {
    let fallback = default_editor();
    let mut candidates: Vec<&str> = requested.into_iter().collect();
    if !candidates.contains(&fallback.as_str()) {
        candidates.push(&fallback);
    }

    for (i, editor) in candidates.iter().enumerate() {
        if matches!(Command::new(editor).arg(path).status(), Ok(s) if s.success()) {
            success(format!("Configuration edited with '{editor}'."));
            return;
        }
        if i + 1 < candidates.len() {
            warning(format!("Editor '{editor}' failed; trying '{}'.", candidates[i + 1]));
        }
    }

    error(format!("Could not open {} in any editor.", path.display()));
}
