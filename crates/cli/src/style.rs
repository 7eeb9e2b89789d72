//! Terminal styling for git-smash reports and prompts.

use console::Style;

/// A finished step: green tick, then `msg`.
pub fn success(msg: &str) -> String {
    format!("{} {}", Style::new().green().apply_to("✓"), msg)
}

/// Something the operator should look at: yellow marker, then `msg`.
pub fn warn(msg: &str) -> String {
    format!("{} {}", Style::new().yellow().apply_to("⚠"), msg)
}

/// Section title above a table.
pub fn header(msg: &str) -> String {
    Style::new().bold().apply_to(msg).to_string()
}

/// Secondary detail, such as where the backup lives.
pub fn dim(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}

/// Branch names stand out in cyan.
pub fn branch(name: &str) -> String {
    Style::new().cyan().bold().apply_to(name).to_string()
}

/// First ten characters of a revision id.
pub fn short_rev(rev: &str) -> &str {
    &rev[..rev.len().min(10)]
}
