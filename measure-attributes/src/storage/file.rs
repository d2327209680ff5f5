// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::{lock, non_blank, validate_key, KeyValueStore};
use crate::error::StorageError;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::debug;

const RECOVERY_ATTEMPTS: usize = 50;
const RECOVERY_RETRY_DELAY: Duration = Duration::from_millis(10);
/// A recovery lock is held for a handful of syscalls; one this old was left
/// behind by a writer that died.
const STALE_RECOVERY_LOCK: Duration = Duration::from_secs(5);

fn is_stale(lock_path: &Path) -> bool {
    fs::metadata(lock_path)
        .and_then(|metadata| metadata.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age > STALE_RECOVERY_LOCK)
}

/// Stores each key in its own file inside a directory.
///
/// Values are written to a private temporary file and then published into
/// place, so readers never observe a partially written value. Within a
/// process, operations on the same key are serialized by a per-key lock;
/// across processes, [`KeyValueStore::get_or_insert_with`] publishes with a
/// hard link, which only succeeds for the first writer. A blank value left on
/// disk is deleted under a `.{key}.recovery` lock file before publishing.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileStore {
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        Arc::clone(lock(&self.key_locks).entry(key.to_owned()).or_default())
    }

    fn read(key: &str, path: &Path) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(path) {
            Ok(value) => Ok(non_blank(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(
            ".{key}.{}.{}.tmp",
            std::process::id(),
            uuid::Uuid::new_v4().simple()
        ))
    }

    fn write_temp(&self, key: &str, value: &str) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(key, e))?;
        let tmp = self.temp_path(key);
        let result = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(value.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::io(key, e));
        }
        Ok(tmp)
    }

    fn replace(key: &str, tmp: &Path, path: &Path) -> Result<(), StorageError> {
        fs::rename(tmp, path).map_err(|e| {
            let _ = fs::remove_file(tmp);
            StorageError::io(key, e)
        })
    }

    /// Links `tmp` into place unless a non-blank value is already there, and
    /// returns whichever value ends up published.
    fn publish(
        &self,
        key: &str,
        tmp: &Path,
        path: &Path,
        value: String,
    ) -> Result<String, StorageError> {
        for _ in 0..RECOVERY_ATTEMPTS {
            match fs::hard_link(tmp, path) {
                Ok(()) => return Ok(value),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if let Some(existing) = Self::read(key, path)? {
                        return Ok(existing);
                    }
                    self.remove_blank(key, path)?;
                }
                Err(e) => {
                    debug!(
                        key,
                        error = %e,
                        "Hard link publishing unavailable, falling back to rename"
                    );
                    Self::replace(key, tmp, path)?;
                    return Ok(value);
                }
            }
        }
        Err(StorageError::io(
            key,
            io::Error::new(io::ErrorKind::TimedOut, "blank value was never replaced"),
        ))
    }

    /// Deletes a blank value under an exclusive recovery lock file.
    ///
    /// Only the lock holder deletes, and everyone else only publishes with
    /// `hard_link`, so a value published by another writer is never removed.
    /// Callers that lose the lock wait briefly and retry the link.
    fn remove_blank(&self, key: &str, path: &Path) -> Result<(), StorageError> {
        let lock_path = self.dir.join(format!(".{key}.recovery"));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(_) => {
                let removed = match Self::read(key, path) {
                    Ok(None) => match fs::remove_file(path) {
                        Err(e) if e.kind() != io::ErrorKind::NotFound => {
                            Err(StorageError::io(key, e))
                        }
                        _ => Ok(()),
                    },
                    Ok(Some(_)) => Ok(()),
                    Err(e) => Err(e),
                };
                let _ = fs::remove_file(&lock_path);
                removed
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if is_stale(&lock_path) {
                    debug!(key, "Removing stale recovery lock");
                    let _ = fs::remove_file(&lock_path);
                } else {
                    thread::sleep(RECOVERY_RETRY_DELAY);
                }
                Ok(())
            }
            Err(e) => Err(StorageError::io(key, e)),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        Self::read(key, &path)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let key_lock = self.key_lock(key);
        let _guard = lock(&key_lock);
        let tmp = self.write_temp(key, value)?;
        Self::replace(key, &tmp, &path)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let key_lock = self.key_lock(key);
        let _guard = lock(&key_lock);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn get_or_insert_with(
        &self,
        key: &str,
        create: &mut dyn FnMut() -> String,
    ) -> Result<String, StorageError> {
        let path = self.path_for(key)?;
        let key_lock = self.key_lock(key);
        let _guard = lock(&key_lock);

        if let Some(existing) = Self::read(key, &path)? {
            return Ok(existing);
        }

        let value = create();
        let tmp = self.write_temp(key, &value)?;
        let published = self.publish(key, &tmp, &path, value);
        // Already gone when the rename fallback consumed it.
        let _ = fs::remove_file(&tmp);
        published
    }
}
