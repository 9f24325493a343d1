//! Filesystem names, modes, and small path helpers shared across the crate.

use std::path::{Component, Path, PathBuf};

/// Primary configuration file looked up during root discovery.
pub const MANIFEST_FILE_NAME: &str = "scbake.toml";

/// Hidden state directory placed inside the project root.
pub const INTERNAL_DIR: &str = ".scbake";

/// Subdirectory of [`INTERNAL_DIR`] holding transactional backups.
pub const TMP_DIR: &str = "tmp";

/// Git repository marker honored as a secondary root indicator.
pub const GIT_DIR: &str = ".git";

/// Mode for directories the scaffolder creates.
pub const DIR_MODE: u32 = 0o750;

/// Mode for rendered output files.
pub const FILE_MODE: u32 = 0o644;

/// Mode for files only the owning user should read (manifest, backups).
pub const PRIVATE_FILE_MODE: u32 = 0o600;

/// Resolve `path` against the current working directory and normalize it
/// lexically. Unlike `canonicalize` this never touches the filesystem, so it
/// works for paths that do not exist yet.
pub fn abs_clean(path: &Path) -> std::io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(clean(&joined))
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component where one exists.
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if popped {
                    out.pop();
                } else if !matches!(out.components().next_back(), Some(Component::RootDir)) {
                    out.push(component.as_os_str());
                }
            }
            _ => out.push(component.as_os_str()),
        }
    }
    out
}

/// Truncate `text` to at most `max_bytes`, keeping whole characters.
pub fn truncate_string(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut truncated = String::new();
    for ch in text.chars() {
        if truncated.len() + ch.len_utf8() > max_bytes {
            break;
        }
        truncated.push(ch);
    }
    truncated
}

/// Create a directory chain with [`DIR_MODE`], tolerating pre-existing
/// directories.
pub fn create_dir_all_secure(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(path)
}
