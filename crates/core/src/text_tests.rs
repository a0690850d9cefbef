use super::*;

#[test]
fn truncate_non_positive_n_is_empty() {
    assert_eq!(truncate("hello", 0), "");
    assert_eq!(truncate("hello", -5), "");
}

#[test]
fn truncate_n_at_most_three_takes_prefix_verbatim() {
    assert_eq!(truncate("hello", 3), "hel");
    assert_eq!(truncate("hi", 3), "hi");
}

#[test]
fn truncate_n_over_three_adds_ellipsis_when_shortened() {
    assert_eq!(truncate("hello world", 8), "hello...");
}

#[test]
fn truncate_leaves_short_strings_unchanged() {
    assert_eq!(truncate("hi", 10), "hi");
    assert_eq!(truncate("hello", 5), "hello");
}

#[test]
fn strip_ansi_removes_csi_sequences() {
    let input = "\u{1b}[32mgreen\u{1b}[0m plain";
    assert_eq!(strip_ansi(input), "green plain");
}

#[test]
fn strip_ansi_passes_through_plain_text() {
    assert_eq!(strip_ansi("no escapes here"), "no escapes here");
}

#[test]
fn normalize_command_collapses_whitespace_and_numbers() {
    assert_eq!(normalize_command("sleep   42"), "sleep <N>");
}

#[test]
fn normalize_command_replaces_path_tokens() {
    assert_eq!(normalize_command("cd /home/user/project"), "cd <PATH>");
}

#[test]
fn normalize_command_strips_embedded_ansi() {
    assert_eq!(normalize_command("\u{1b}[1mls\u{1b}[0m -la"), "ls -la");
}

#[test]
fn hash_command_is_stable_and_shape_sensitive() {
    assert_eq!(hash_command("cd /a"), hash_command("cd /b"));
    assert_ne!(hash_command("cd /a"), hash_command("ls -la"));
}
