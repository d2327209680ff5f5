// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

const ENV_STORAGE_DIR: &str = "MEASURE_STORAGE_DIR";
const ENV_APP_VERSION: &str = "MEASURE_APP_VERSION";
const ENV_APP_BUILD: &str = "MEASURE_APP_BUILD";
const ENV_APP_UNIQUE_ID: &str = "MEASURE_APP_UNIQUE_ID";
const ENV_DEVICE_MANUFACTURER: &str = "MEASURE_DEVICE_MANUFACTURER";
const ENV_PLATFORM: &str = "MEASURE_PLATFORM";

const DEFAULT_STORAGE_DIR_NAME: &str = "measure";

/// Source of configuration values. Values are trimmed and empty values are
/// reported as unset.
pub trait QueryEnv {
    fn get_var(&self, var: &str) -> Option<String>;
}

pub struct RealEnv;

impl QueryEnv for RealEnv {
    fn get_var(&self, var: &str) -> Option<String> {
        env::var(var)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }
}

impl QueryEnv for HashMap<String, String> {
    fn get_var(&self, var: &str) -> Option<String> {
        self.get(var)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }
}

/// Static metadata about the instrumented application.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub version: Option<String>,
    pub build: Option<String>,
    pub unique_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributesConfig {
    /// Directory holding durable values such as the installation ID.
    pub storage_dir: PathBuf,
    pub app: AppConfig,
    pub device_manufacturer: Option<String>,
    pub platform: String,
}

impl Default for AttributesConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            app: AppConfig::default(),
            device_manufacturer: None,
            platform: default_platform(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    env::temp_dir().join(DEFAULT_STORAGE_DIR_NAME)
}

fn default_platform() -> String {
    env::consts::OS.to_owned()
}

pub struct FromEnv {}

impl FromEnv {
    pub fn config() -> AttributesConfig {
        Self::config_from(&RealEnv)
    }

    pub fn config_from<Q: QueryEnv>(query: &Q) -> AttributesConfig {
        AttributesConfig {
            storage_dir: query
                .get_var(ENV_STORAGE_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(default_storage_dir),
            app: AppConfig {
                version: query.get_var(ENV_APP_VERSION),
                build: query.get_var(ENV_APP_BUILD),
                unique_id: query.get_var(ENV_APP_UNIQUE_ID),
            },
            device_manufacturer: query.get_var(ENV_DEVICE_MANUFACTURER),
            platform: query
                .get_var(ENV_PLATFORM)
                .map(|p| p.to_lowercase())
                .unwrap_or_else(default_platform),
        }
    }
}
