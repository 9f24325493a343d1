//! Filesystem undo log for atomic scaffolding runs.
//!
//! A [`TransactionManager`] is scoped to one project root and lives for one
//! run. Tasks register every path they are about to create or overwrite via
//! [`TransactionManager::track`]; pre-existing files are copied into a
//! per-transaction backup directory, fresh paths are remembered for
//! deletion. [`TransactionManager::commit`] discards the journal,
//! [`TransactionManager::rollback`] deletes creations in LIFO order and
//! restores the backups.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};
use crate::fsutil;

/// Metadata required to restore one backed-up file.
#[derive(Debug)]
struct BackupEntry {
    backup_path: PathBuf,
    mode: u32,
}

#[derive(Debug, Default)]
struct Journal {
    /// Backup directory for this transaction, created lazily on first use.
    temp_dir: Option<PathBuf>,
    /// Original absolute path → backup metadata.
    backups: BTreeMap<PathBuf, BackupEntry>,
    /// Absolute paths created during the transaction, in creation order,
    /// for LIFO deletion.
    created: Vec<PathBuf>,
}

/// Tracks filesystem changes under one root and provides rollback.
///
/// All public operations serialize on an internal lock, so a concurrent
/// observer can never see a half-updated journal.
#[derive(Debug)]
pub struct TransactionManager {
    root_path: PathBuf,
    journal: Mutex<Journal>,
}

impl TransactionManager {
    /// Create a manager scoped to `root_path`. The manager refuses to touch
    /// anything outside this root.
    pub fn new(root_path: &Path) -> Result<Self> {
        Ok(Self {
            root_path: fsutil::abs_clean(root_path)?,
            journal: Mutex::new(Journal::default()),
        })
    }

    /// Register a path that is about to be modified or created. Backs the
    /// file up if it exists, or records it for deletion if it does not.
    /// Tracking the same path twice is a no-op.
    pub fn track(&self, path: &Path) -> Result<()> {
        let mut journal = self.lock();

        let abs_path = self.resolve_and_validate(path)?;
        if journal.backups.contains_key(&abs_path)
            || journal.created.iter().any(|p| p == &abs_path)
        {
            return Ok(());
        }

        let info = match fs::metadata(&abs_path) {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                journal.created.push(abs_path);
                return Ok(());
            }
            Err(err) => return Err(err.into()),
            Ok(info) => info,
        };

        // Directories are never backed up wholesale; rollback cleanup comes
        // from tracking the files created inside them.
        if info.is_dir() {
            return Ok(());
        }

        self.backup_file(&mut journal, abs_path, &info)
    }

    /// Finalize the transaction: delete the backup directory and prune the
    /// structural scaffolding. Call only after every task has succeeded.
    pub fn commit(&self) -> Result<()> {
        let mut journal = self.lock();

        if let Some(temp_dir) = journal.temp_dir.take() {
            fs::remove_dir_all(&temp_dir)?;
            self.cleanup_structure();
        }
        *journal = Journal::default();
        Ok(())
    }

    /// Undo all tracked changes: delete created paths in reverse insertion
    /// order, restore backups, then remove the backup scaffolding. Undo
    /// errors are collected rather than aborting, so every entry gets its
    /// chance; if any occurred the aggregate is returned and the filesystem
    /// is in the best recoverable state.
    pub fn rollback(&self) -> Result<()> {
        let mut journal = self.lock();
        let mut errs = Vec::new();

        // Phase 1: deepest-first deletion of creations. An entry may not
        // exist if its task failed before creating it.
        for path in journal.created.iter().rev() {
            match fs::symlink_metadata(path) {
                Err(_) => {}
                Ok(info) => {
                    let removed = if info.is_dir() {
                        fs::remove_dir_all(path)
                    } else {
                        fs::remove_file(path)
                    };
                    if let Err(err) = removed {
                        errs.push(format!(
                            "failed to delete created path {}: {err}",
                            path.display()
                        ));
                    }
                }
            }
        }

        // Phase 2: restore backups over whatever is currently on disk.
        for (original, backup) in &journal.backups {
            if let Err(err) = copy_file(&backup.backup_path, original, backup.mode) {
                errs.push(format!("failed to restore {}: {err}", original.display()));
            }
        }

        // Phase 3: remove the backup tree and prune scaffold parents.
        if let Some(temp_dir) = journal.temp_dir.take() {
            if let Err(err) = fs::remove_dir_all(&temp_dir) {
                errs.push(format!("failed to remove temp dir: {err}"));
            }
            self.cleanup_structure();
        }
        *journal = Journal::default();

        if errs.is_empty() {
            Ok(())
        } else {
            Err(Error::RollbackPartial(errs))
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Journal> {
        self.journal.lock().expect("transaction journal poisoned")
    }

    /// Resolve to an absolute cleaned path and enforce confinement. The
    /// check is component-wise (`strip_prefix`), never a string-prefix
    /// comparison, so `/tmp/root-evil` is not mistaken for `/tmp/root`.
    fn resolve_and_validate(&self, path: &Path) -> Result<PathBuf> {
        let abs_path = fsutil::abs_clean(path)?;
        if abs_path.strip_prefix(&self.root_path).is_err() {
            return Err(Error::PathEscape {
                path: abs_path,
                root: self.root_path.clone(),
            });
        }
        Ok(abs_path)
    }

    fn backup_file(
        &self,
        journal: &mut Journal,
        abs_path: PathBuf,
        info: &fs::Metadata,
    ) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = match &journal.temp_dir {
            Some(dir) => dir.clone(),
            None => {
                let dir = self.ensure_temp_dir()?;
                journal.temp_dir = Some(dir.clone());
                dir
            }
        };

        // The ordinal prefix keeps two tracked files with the same basename
        // from colliding in the flat backup directory.
        let basename = abs_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "backup".to_string());
        let backup_path = temp_dir.join(format!("{}_{}", journal.backups.len(), basename));

        let mode = info.permissions().mode() & 0o7777;
        copy_file(&abs_path, &backup_path, mode)?;

        journal.backups.insert(abs_path, BackupEntry { backup_path, mode });
        Ok(())
    }

    /// Create the per-transaction backup directory inside the project root,
    /// so restores stay on one filesystem.
    fn ensure_temp_dir(&self) -> Result<PathBuf> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| Error::Io(std::io::Error::other(err)))?
            .as_nanos();
        let path = self
            .root_path
            .join(fsutil::INTERNAL_DIR)
            .join(fsutil::TMP_DIR)
            .join(format!("tx-{nanos}"));
        fsutil::create_dir_all_secure(&path)?;
        Ok(path)
    }

    /// Best-effort prune of `.scbake/tmp` and `.scbake`. `remove_dir` only
    /// succeeds on empty directories, so concurrent transactions are left
    /// alone.
    fn cleanup_structure(&self) {
        let tmp_parent = self.root_path.join(fsutil::INTERNAL_DIR).join(fsutil::TMP_DIR);
        let internal_root = self.root_path.join(fsutil::INTERNAL_DIR);
        let _ = fs::remove_dir(tmp_parent);
        let _ = fs::remove_dir(internal_root);
    }
}

/// Copy `src` to `dst` truncating, then chmod `dst` to exactly `mode`
/// (the open mode is subject to umask, the explicit chmod is not). Paths
/// reaching here were validated by `track`.
fn copy_file(src: &Path, dst: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut source = fs::File::open(src)?;
    let mut dest = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(dst)?;
    std::io::copy(&mut source, &mut dest)?;
    dest.sync_all()?;
    drop(dest);
    fs::set_permissions(dst, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod tests;
