//! Formatting utilities used for CLI and export outputs.

use std::collections::BTreeSet;

/// Rate in [0, 1] rendered as a whole percentage ("75%").
pub fn percent(rate: f64) -> String {
    format!("{}%", (rate * 100.0).round() as i64)
}

/// Rate in [0, 1] rendered with one decimal place ("66.7%"), as used in exports.
pub fn percent_one_decimal(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Session set rendered as "1, 3, 4" or "-" when empty.
pub fn session_list(sessions: &BTreeSet<u32>) -> String {
    if sessions.is_empty() {
        return "-".to_string();
    }
    sessions
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One character per session: '■' attended, '□' missing.
pub fn session_strip(total: u32, attended: &BTreeSet<u32>) -> String {
    (1..=total)
        .map(|s| if attended.contains(&s) { '■' } else { '□' })
        .collect()
}
