//! Pre-run checks for external tools a plan will shell out to.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Ensure every named binary is reachable through `$PATH`, failing on the
/// first one that is not. Runs before any task so a missing tool never
/// triggers a rollback.
pub fn check_binaries(binaries: &[&str]) -> Result<()> {
    for binary in binaries {
        if find_in_path(binary).is_none() {
            return Err(Error::PreflightMissingTool((*binary).to_string()));
        }
    }
    Ok(())
}

/// Walk `$PATH` looking for an executable file with the given name.
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
