// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use uuid::Uuid;

/// Produces globally unique identifiers.
pub trait IdProvider: Send + Sync {
    fn create_id(&self) -> String;
}

/// Random (v4) UUIDs in their hyphenated lowercase form.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdProvider;

impl IdProvider for UuidIdProvider {
    fn create_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
