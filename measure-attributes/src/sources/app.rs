// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::string_or_unknown;
use crate::config::AppConfig;
use crate::keys;
use crate::map::AttributeMap;
use crate::processor::AttributeSource;

/// Version of this library, reported as `measure_sdk_version`.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reads the application's package metadata.
pub trait AppInfoProvider: Send + Sync {
    fn version(&self) -> Option<String>;
    fn build(&self) -> Option<String>;
    fn unique_id(&self) -> Option<String>;
}

impl AppInfoProvider for AppConfig {
    fn version(&self) -> Option<String> {
        self.version.clone()
    }

    fn build(&self) -> Option<String> {
        self.build.clone()
    }

    fn unique_id(&self) -> Option<String> {
        self.unique_id.clone()
    }
}

/// App version, build, identifier and SDK version. Constant for the life of
/// the process.
pub struct AppAttributeSource<P = AppConfig> {
    provider: P,
}

impl<P: AppInfoProvider> AppAttributeSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: AppInfoProvider> AttributeSource for AppAttributeSource<P> {
    fn compute_attributes(&self) -> AttributeMap {
        let mut attributes = AttributeMap::with_capacity(4);
        attributes.insert(keys::APP_VERSION, string_or_unknown(self.provider.version()));
        attributes.insert(keys::APP_BUILD, string_or_unknown(self.provider.build()));
        attributes.insert(
            keys::APP_UNIQUE_ID,
            string_or_unknown(self.provider.unique_id()),
        );
        attributes.insert(keys::MEASURE_SDK_VERSION, SDK_VERSION);
        attributes
    }
}
