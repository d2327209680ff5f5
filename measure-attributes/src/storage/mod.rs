// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Durable key-value storage used by processors that need values to survive
//! a process restart.

mod file;

pub use file::FileStore;

use crate::error::StorageError;
use crate::id::IdProvider;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const INSTALLATION_ID_KEY: &str = "installation_id";
pub const USER_ID_KEY: &str = "user_id";

/// A string key-value store.
///
/// Blank values are never returned: a key holding only whitespace reads as
/// absent.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Returns the stored value for `key`, or stores and returns the output of
    /// `create` if there is none. The read-check-write sequence is atomic
    /// with respect to every other caller of this method for the same key,
    /// `create` runs at most once per call and only when the value is
    /// missing.
    fn get_or_insert_with(
        &self,
        key: &str,
        create: &mut dyn FnMut() -> String,
    ) -> Result<String, StorageError>;
}

/// Installation ID accessors available on every [`KeyValueStore`].
pub trait InstallationIdStorage {
    fn get_installation_id(&self) -> Result<Option<String>, StorageError>;

    fn set_installation_id(&self, id: &str) -> Result<(), StorageError>;

    fn get_or_create_installation_id(&self, ids: &dyn IdProvider) -> Result<String, StorageError>;
}

impl<T: KeyValueStore + ?Sized> InstallationIdStorage for T {
    fn get_installation_id(&self) -> Result<Option<String>, StorageError> {
        self.get(INSTALLATION_ID_KEY)
    }

    fn set_installation_id(&self, id: &str) -> Result<(), StorageError> {
        self.set(INSTALLATION_ID_KEY, id)
    }

    fn get_or_create_installation_id(&self, ids: &dyn IdProvider) -> Result<String, StorageError> {
        self.get_or_insert_with(INSTALLATION_ID_KEY, &mut || ids.create_id())
    }
}

pub(crate) fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}

/// Keys end up as file names, so they are restricted to a portable subset.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local store, mostly useful for tests and for hosts without a
/// writable directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(lock(&self.values).get(key).cloned().and_then(non_blank))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        lock(&self.values).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        lock(&self.values).remove(key);
        Ok(())
    }

    fn get_or_insert_with(
        &self,
        key: &str,
        create: &mut dyn FnMut() -> String,
    ) -> Result<String, StorageError> {
        validate_key(key)?;
        let mut values = lock(&self.values);
        if let Some(existing) = values.get(key).cloned().and_then(non_blank) {
            return Ok(existing);
        }
        let value = create();
        values.insert(key.to_owned(), value.clone());
        Ok(value)
    }
}
