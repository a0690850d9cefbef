// SPDX-License-Identifier: MIT

//! Destructive-command detection for suggestion enrichment. This is treated
//! as an open set per spec.md §4.6: the patterns below are the ones the
//! test suite pins, not an exhaustive list.

/// Tag attached to a suggestion whose command text matches a known
/// destructive pattern.
pub const RISK_DESTRUCTIVE: &str = "destructive";

const DESTRUCTIVE_SUBSTRINGS: &[&str] = &[
    "rm -rf",
    "rm -fr",
    "git reset --hard",
    "git push --force",
    "git push -f",
    "drop table",
    "kubectl delete pod",
    "docker rmi",
    "docker image rm",
];

/// Returns `true` if `normalized_or_raw` looks like `chmod` granting
/// world-writable or fully-open permissions (e.g. `chmod 777`,
/// `chmod -R 777`, `chmod a+w`).
fn looks_like_broad_chmod(cmd: &str) -> bool {
    let Some(rest) = cmd.strip_prefix("chmod").map(str::trim) else { return false };
    let rest = rest.strip_prefix("-R").map(str::trim).unwrap_or(rest);
    rest.starts_with("777") || rest.contains("a+w") || rest.contains("ugo+w")
}

/// Returns `true` if `cmd` writes directly to a raw block device (e.g.
/// `dd ... of=/dev/sda`).
fn looks_like_raw_device_write(cmd: &str) -> bool {
    cmd.contains("of=/dev/sd") || cmd.contains("of=/dev/nvme") || cmd.contains("of=/dev/disk")
}

/// Tags `cmd` as [`RISK_DESTRUCTIVE`] when it matches the destructive
/// pattern set, or returns an empty string otherwise.
pub fn classify(cmd: &str) -> &'static str {
    let lower = cmd.to_ascii_lowercase();
    if DESTRUCTIVE_SUBSTRINGS.iter().any(|pat| lower.contains(pat)) {
        return RISK_DESTRUCTIVE;
    }
    if looks_like_broad_chmod(&lower) || looks_like_raw_device_write(&lower) {
        return RISK_DESTRUCTIVE;
    }
    ""
}

#[cfg(test)]
#[path = "risk_tests.rs"]
mod tests;
