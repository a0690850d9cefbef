// SPDX-License-Identifier: MIT

//! Reads a user's on-disk shell history file for `ImportHistory`. Detection
//! and parsing are best-effort: a missing or unreadable file is a normal,
//! loggable outcome, not an error a caller should see.

use std::io;
use std::path::PathBuf;

/// Resolves a request shell name (possibly `"auto"` or empty) to a concrete
/// history file, per spec.md §4.7 ("resolve shell (detect when `auto` or
/// empty)").
pub fn read_shell_history(requested_shell: &str) -> io::Result<Vec<String>> {
    let shell = if requested_shell.is_empty() || requested_shell == "auto" {
        detect_shell()
    } else {
        requested_shell.to_string()
    };

    let path = history_path(&shell).ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("no known history file for shell '{shell}'"))
    })?;

    let raw = std::fs::read_to_string(&path)?;
    Ok(parse_history(&shell, &raw))
}

fn detect_shell() -> String {
    std::env::var("SHELL")
        .ok()
        .and_then(|s| s.rsplit('/').next().map(|s| s.to_string()))
        .unwrap_or_else(|| "bash".to_string())
}

fn history_path(shell: &str) -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    let filename = match shell {
        "zsh" => ".zsh_history",
        "fish" => ".local/share/fish/fish_history",
        _ => ".bash_history",
    };
    Some(home.join(filename))
}

/// zsh history lines carry a `: <epoch>:<duration>;<command>` prefix when
/// `EXTENDED_HISTORY` is set; strip it down to the bare command. bash and
/// fish history files are one raw command per line (fish's YAML-ish format
/// is handled well enough by our simple `- cmd:` stripping).
fn parse_history(shell: &str, raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            if shell == "fish" && line.starts_with("when:") {
                return None;
            }
            let cleaned = match shell {
                "zsh" => line.rsplit_once(';').map(|(_, cmd)| cmd).unwrap_or(line),
                "fish" => line.strip_prefix("- cmd:").map(str::trim).unwrap_or(line),
                _ => line,
            };
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "shell_history_tests.rs"]
mod tests;
