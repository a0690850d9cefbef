use super::*;

#[test]
fn parse_history_bash_is_one_command_per_line() {
    let raw = "ls -la\n\ngit status\n";
    let entries = parse_history("bash", raw);
    assert_eq!(entries, vec!["ls -la".to_string(), "git status".to_string()]);
}

#[test]
fn parse_history_zsh_strips_extended_history_prefix() {
    let raw = ": 1700000000:0;git push origin main\n";
    let entries = parse_history("zsh", raw);
    assert_eq!(entries, vec!["git push origin main".to_string()]);
}

#[test]
fn parse_history_zsh_without_prefix_passes_through() {
    let raw = "git log\n";
    let entries = parse_history("zsh", raw);
    assert_eq!(entries, vec!["git log".to_string()]);
}

#[test]
fn parse_history_fish_strips_cmd_marker_and_drops_when_lines() {
    let raw = "- cmd: cargo test\n  when: 1700000000\n- cmd: cargo build\n";
    let entries = parse_history("fish", raw);
    assert_eq!(entries, vec!["cargo test".to_string(), "cargo build".to_string()]);
}

#[test]
fn history_path_falls_back_to_bash_for_unknown_shell() {
    let path = history_path("nushell").unwrap();
    assert!(path.ends_with(".bash_history"));
}
