// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod app;
mod device;
mod installation_id;
mod network;
mod user;

pub use app::{AppAttributeSource, AppInfoProvider, SDK_VERSION};
pub use device::{DeviceAttributeSource, DeviceInfoProvider, DeviceType, SystemDeviceInfo};
pub use installation_id::InstallationIdAttributeSource;
pub use network::{
    NetworkAttributeProcessor, NetworkGeneration, NetworkState, NetworkStateProvider, NetworkType,
};
pub use user::UserAttributeProcessor;

use crate::keys::values::UNKNOWN;
use crate::value::AttributeValue;

/// String attributes are never absent: a missing or blank value becomes
/// `unknown`.
pub(crate) fn string_or_unknown(value: Option<String>) -> AttributeValue {
    match value {
        Some(v) if !v.trim().is_empty() => AttributeValue::String(v),
        _ => AttributeValue::from(UNKNOWN),
    }
}
