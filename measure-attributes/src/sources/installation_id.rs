// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::id::IdProvider;
use crate::keys;
use crate::map::AttributeMap;
use crate::processor::AttributeSource;
use crate::storage::{InstallationIdStorage, KeyValueStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// The installation ID: created on the first launch with the SDK and read
/// back from storage on every later launch.
///
/// Meant to be wrapped in [`crate::ComputeOnce`] so that storage is touched
/// once per process.
pub struct InstallationIdAttributeSource {
    store: Arc<dyn KeyValueStore>,
    ids: Arc<dyn IdProvider>,
}

impl InstallationIdAttributeSource {
    pub fn new(store: Arc<dyn KeyValueStore>, ids: Arc<dyn IdProvider>) -> Self {
        Self { store, ids }
    }

    fn installation_id(&self) -> String {
        match self.store.get_or_create_installation_id(self.ids.as_ref()) {
            Ok(id) => {
                debug!(installation_id = %id, "Resolved installation id");
                id
            }
            Err(e) => {
                // The ID is still stable for this process thanks to caching,
                // it just won't survive a restart.
                let id = self.ids.create_id();
                warn!(
                    error = %e,
                    installation_id = %id,
                    "Failed to persist installation id, using an ephemeral one"
                );
                id
            }
        }
    }
}

impl AttributeSource for InstallationIdAttributeSource {
    fn compute_attributes(&self) -> AttributeMap {
        let mut attributes = AttributeMap::with_capacity(1);
        attributes.insert(keys::INSTALLATION_ID, self.installation_id());
        attributes
    }
}
