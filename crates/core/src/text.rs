// SPDX-License-Identifier: MIT

//! Small free functions for command-text handling, kept dependency-free to
//! match the rest of `clai-core`'s formatting helpers.

/// Truncates `s` to at most `n` bytes, appending `"..."` when truncation
/// actually shortens the string and there's room for the ellipsis.
///
/// - `n <= 0` → `""`
/// - `n <= 3` → the first `n` bytes of `s`, verbatim
/// - `n > 3` and `s` is longer than `n` → first `n - 3` bytes plus `"..."`
/// - otherwise → `s` unchanged
pub fn truncate(s: &str, n: i64) -> String {
    if n <= 0 {
        return String::new();
    }
    let n = n as usize;
    let char_count = s.chars().count();
    if char_count <= n {
        return s.to_string();
    }
    if n <= 3 {
        return take_chars(s, n);
    }
    let head = take_chars(s, n - 3);
    format!("{head}...")
}

/// First `count` chars of `s`.
fn take_chars(s: &str, count: usize) -> String {
    s.chars().take(count).collect()
}

/// Strips ANSI CSI escape sequences (`ESC [ ... <final byte>`) from `s`.
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

/// Normalizes a raw command to a loose template: collapses runs of
/// whitespace and replaces path-like and numeric tokens with placeholders,
/// so that textually distinct commands with the same shape hash the same.
pub fn normalize_command(raw: &str) -> String {
    let stripped = strip_ansi(raw);
    stripped
        .split_whitespace()
        .map(normalize_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_token(token: &str) -> String {
    if token.chars().all(|c| c.is_ascii_digit()) && !token.is_empty() {
        return "<N>".to_string();
    }
    if token.contains('/') && token.len() > 1 {
        return "<PATH>".to_string();
    }
    token.to_string()
}

/// Stable, non-cryptographic hash of a normalized command, used to group
/// commands by shape without persisting the normalized text itself.
pub fn hash_command(raw: &str) -> u64 {
    fnv1a(normalize_command(raw).as_bytes())
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
