//! Per-key mutual exclusion for commits.
//!
//! A commit scans the directory, picks `max + 1` and writes the artifact. Two commits for the same
//! logical file must not interleave those steps, while commits for unrelated files must not wait
//! on each other. The table holds the set of keys currently being committed; a caller blocks on the
//! condvar until its key is free.
//!
//! The table only covers one process. [`FileLock`] extends the same exclusion to every process
//! sharing the storage root (the server and the `vstore` CLI) through an exclusive advisory lock
//! on a hidden per-file lock file in the namespace directory.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use fs4::FileExt;

use crate::naming::{lock_file_name, LogicalName};

/// Identity of a serialised region: one logical file in one directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct LockKey {
    directory: PathBuf,
    name: LogicalName,
}

impl LockKey {
    pub(crate) fn new(directory: &Path, name: &LogicalName) -> Self {
        Self {
            directory: directory.to_path_buf(),
            name: name.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct LockTable {
    held: Mutex<HashSet<LockKey>>,
    released: Condvar,
}

impl LockTable {
    /// Blocks until `key` is free, then holds it until the returned guard is dropped.
    pub(crate) fn acquire(&self, key: LockKey) -> KeyGuard<'_> {
        let mut held = self.held_keys();
        while held.contains(&key) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        held.insert(key.clone());

        KeyGuard { table: self, key }
    }

    #[cfg(test)]
    pub(crate) fn is_held(&self, key: &LockKey) -> bool {
        self.held_keys().contains(key)
    }

    // The set is only mutated by insert/remove, so a panic elsewhere cannot leave it torn.
    fn held_keys(&self) -> MutexGuard<'_, HashSet<LockKey>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds one key of a [`LockTable`]; releases it on drop, including on error and panic paths.
#[derive(Debug)]
pub(crate) struct KeyGuard<'a> {
    table: &'a LockTable,
    key: LockKey,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.table.held_keys().remove(&self.key);
        self.table.released.notify_all();
    }
}

/// Exclusive advisory lock on `<directory>/.lock-<stem><ext>`.
///
/// The lock belongs to the open file handle and is released when it is dropped (or the process
/// exits). Lock files are left in place; removing one while another process waits on it would
/// hand out two locks.
#[derive(Debug)]
pub(crate) struct FileLock {
    _file: File,
}

impl FileLock {
    /// Blocks until no other handle, in this or any other process, holds the lock for `name`.
    pub(crate) fn acquire(directory: &Path, name: &LogicalName) -> io::Result<Self> {
        let path = directory.join(lock_file_name(name));
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        file.lock_exclusive()?;

        Ok(Self { _file: file })
    }
}
