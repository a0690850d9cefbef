// SPDX-License-Identifier: MIT

//! Startup validation: refuse to run as root, and enforce that the
//! runtime directory is private (mode 0o700) before any other resource is
//! touched.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use thiserror::Error;

const RUNTIME_DIR_MODE: u32 = 0o700;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("refusing to run as root")]
    RefusingAsRoot,
    #[error("runtime directory path exists but is not a directory: {0}")]
    NotADirectory(std::path::PathBuf),
    #[error("io error validating runtime directory {path}: {source}")]
    Io { path: std::path::PathBuf, #[source] source: std::io::Error },
}

/// Fails if the effective UID is 0. On platforms without that concept this
/// is always a no-op success.
pub fn refuse_root() -> Result<(), SecurityError> {
    if nix::unistd::Uid::effective().is_root() {
        return Err(SecurityError::RefusingAsRoot);
    }
    Ok(())
}

/// Ensures `dir` exists with mode exactly 0o700, creating it if missing and
/// tightening its mode if found looser. A path that exists but is not a
/// directory is a hard error.
pub fn ensure_private_dir(dir: &Path) -> Result<(), SecurityError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {
            let mode = meta.permissions().mode() & 0o777;
            if mode != RUNTIME_DIR_MODE {
                tracing::warn!(dir = %dir.display(), mode = format!("{mode:o}"), "tightening runtime directory permissions");
                std::fs::set_permissions(dir, std::fs::Permissions::from_mode(RUNTIME_DIR_MODE))
                    .map_err(|source| SecurityError::Io { path: dir.to_path_buf(), source })?;
            }
            Ok(())
        }
        Ok(_) => Err(SecurityError::NotADirectory(dir.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::create_dir_all(dir).map_err(|source| SecurityError::Io { path: dir.to_path_buf(), source })?;
            std::fs::set_permissions(dir, std::fs::Permissions::from_mode(RUNTIME_DIR_MODE))
                .map_err(|source| SecurityError::Io { path: dir.to_path_buf(), source })?;
            Ok(())
        }
        Err(source) => Err(SecurityError::Io { path: dir.to_path_buf(), source }),
    }
}

#[cfg(test)]
#[path = "security_tests.rs"]
mod tests;
