/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Attendance rate color:
/// complete → green
/// half or more → yellow
/// below half → red
pub fn color_for_rate(rate: f64, complete: bool) -> &'static str {
    if complete {
        GREEN
    } else if rate >= 0.5 {
        YELLOW
    } else {
        RED
    }
}

/// Grey out empty cells ("" or "--").
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" {
        format!("{GREY}--{RESET}")
    } else {
        value.to_string()
    }
}

pub fn colorize_flag(value: bool, yes: &str, no: &str) -> String {
    if value {
        format!("{GREEN}{yes}{RESET}")
    } else {
        format!("{GREY}{no}{RESET}")
    }
}
