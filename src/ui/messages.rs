//! Coloured status lines for the terminal.
//!
//! Informational lines go to stdout; warnings and errors go to stderr so
//! that `--json` output stays parseable.

use std::fmt;
use std::io::{Write, stdin, stdout};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

#[derive(Clone, Copy)]
enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn style(self) -> (&'static str, &'static str) {
        match self {
            Level::Info => ("\x1b[34m", "ℹ️"),
            Level::Success => ("\x1b[32m", "✅"),
            Level::Warning => ("\x1b[33m", "⚠️"),
            Level::Error => ("\x1b[31m", "❌"),
        }
    }
}

fn line(level: Level, msg: impl fmt::Display) {
    let (color, icon) = level.style();
    let text = format!("{color}{BOLD}{icon} {RESET}{msg}");
    match level {
        Level::Info | Level::Success => println!("{text}"),
        Level::Warning | Level::Error => eprintln!("{text}"),
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    line(Level::Info, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    line(Level::Success, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    line(Level::Warning, msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    line(Level::Error, msg);
}

/// Section header, e.g. one per program in reports.
pub fn header<T: fmt::Display>(msg: T) {
    println!("\n\x1b[34m{BOLD}== {msg} =={RESET}");
}

/// Ask a yes/no question; anything but "y"/"yes" means no.
pub fn confirm<T: fmt::Display>(question: T) -> std::io::Result<bool> {
    print!("{question} [y/N]: ");
    stdout().flush()?;

    let mut answer = String::new();
    stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
