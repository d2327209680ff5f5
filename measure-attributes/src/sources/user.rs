// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::keys;
use crate::map::AttributeMap;
use crate::processor::AttributeProcessor;
use crate::storage::{KeyValueStore, USER_ID_KEY};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::warn;

/// Attaches the application-provided user ID.
///
/// The value changes when the user logs in or out, so it is read on every
/// append rather than cached. When backed by a store, the ID is restored on
/// construction and persisted on every change.
pub struct UserAttributeProcessor {
    user_id: RwLock<Option<String>>,
    /// Held across the in-memory update and the store write, so memory and
    /// storage always end up holding the same value.
    updates: Mutex<()>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl UserAttributeProcessor {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let user_id = store.get(USER_ID_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to restore user id");
            None
        });
        Self {
            user_id: RwLock::new(user_id),
            updates: Mutex::new(()),
            store: Some(store),
        }
    }

    /// A processor that forgets the user ID when the process exits.
    pub fn in_memory() -> Self {
        Self {
            user_id: RwLock::new(None),
            updates: Mutex::new(()),
            store: None,
        }
    }

    pub fn user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Blank IDs are ignored.
    pub fn set_user_id(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        let user_id = user_id.trim();
        if user_id.is_empty() {
            warn!("Ignoring blank user id");
            return;
        }
        let _update = self.updates.lock().unwrap_or_else(PoisonError::into_inner);
        *self.user_id.write().unwrap_or_else(PoisonError::into_inner) = Some(user_id.to_owned());
        if let Some(store) = &self.store {
            if let Err(e) = store.set(USER_ID_KEY, user_id) {
                warn!(error = %e, "Failed to persist user id");
            }
        }
    }

    pub fn clear_user_id(&self) {
        let _update = self.updates.lock().unwrap_or_else(PoisonError::into_inner);
        *self.user_id.write().unwrap_or_else(PoisonError::into_inner) = None;
        if let Some(store) = &self.store {
            if let Err(e) = store.remove(USER_ID_KEY) {
                warn!(error = %e, "Failed to remove persisted user id");
            }
        }
    }
}

impl AttributeProcessor for UserAttributeProcessor {
    fn append_attributes(&self, attributes: &mut AttributeMap) {
        attributes.insert(keys::USER_ID, self.user_id());
    }
}
