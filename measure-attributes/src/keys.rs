// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Attribute names understood by the backend, and the fixed values some of
//! them can take.

pub const INSTALLATION_ID: &str = "installation_id";

pub const APP_VERSION: &str = "app_version";
pub const APP_BUILD: &str = "app_build";
pub const APP_UNIQUE_ID: &str = "app_unique_id";
pub const MEASURE_SDK_VERSION: &str = "measure_sdk_version";

pub const DEVICE_NAME: &str = "device_name";
pub const DEVICE_MODEL: &str = "device_model";
pub const DEVICE_MANUFACTURER: &str = "device_manufacturer";
pub const DEVICE_TYPE: &str = "device_type";
pub const DEVICE_IS_FOLDABLE: &str = "device_is_foldable";
pub const DEVICE_IS_PHYSICAL: &str = "device_is_physical";
pub const DEVICE_DENSITY_DPI: &str = "device_density_dpi";
pub const DEVICE_WIDTH_PX: &str = "device_width_px";
pub const DEVICE_HEIGHT_PX: &str = "device_height_px";
pub const DEVICE_DENSITY: &str = "device_density";
pub const DEVICE_LOCALE: &str = "device_locale";
pub const DEVICE_CPU_ARCH: &str = "device_cpu_arch";
pub const OS_NAME: &str = "os_name";
pub const OS_VERSION: &str = "os_version";
pub const PLATFORM: &str = "platform";

pub const USER_ID: &str = "user_id";

pub const NETWORK_TYPE: &str = "network_type";
pub const NETWORK_GENERATION: &str = "network_generation";
pub const NETWORK_PROVIDER: &str = "network_provider";

pub mod values {
    /// Substituted whenever a source cannot provide a string value.
    pub const UNKNOWN: &str = "unknown";

    pub const PHONE: &str = "phone";
    pub const TABLET: &str = "tablet";

    pub const NO_NETWORK: &str = "no_network";
    pub const CELLULAR: &str = "cellular";
    pub const WIFI: &str = "wifi";
    pub const VPN: &str = "vpn";

    pub const GENERATION_2G: &str = "2g";
    pub const GENERATION_3G: &str = "3g";
    pub const GENERATION_4G: &str = "4g";
    pub const GENERATION_5G: &str = "5g";
}
