// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

impl StorageError {
    pub(crate) fn io(key: &str, source: io::Error) -> Self {
        StorageError::Io {
            key: key.to_owned(),
            source,
        }
    }
}
