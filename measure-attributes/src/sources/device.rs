// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::string_or_unknown;
use crate::config::AttributesConfig;
use crate::info;
use crate::keys;
use crate::map::AttributeMap;
use crate::processor::AttributeSource;
use std::sync::OnceLock;

/// Form factor, derived from the platform's UI idiom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceType {
    Phone,
    Tablet,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Phone => keys::values::PHONE,
            DeviceType::Tablet => keys::values::TABLET,
        }
    }
}

/// Platform reads for device attributes. Every method may return `None` when
/// the platform has no answer; the defaults do exactly that.
pub trait DeviceInfoProvider: Send + Sync {
    fn name(&self) -> Option<String> {
        None
    }
    fn model(&self) -> Option<String> {
        None
    }
    fn manufacturer(&self) -> Option<String> {
        None
    }
    fn device_type(&self) -> Option<DeviceType> {
        None
    }
    fn is_foldable(&self) -> Option<bool> {
        None
    }
    fn is_physical(&self) -> Option<bool> {
        None
    }
    fn density_dpi(&self) -> Option<i64> {
        None
    }
    fn width_px(&self) -> Option<i64> {
        None
    }
    fn height_px(&self) -> Option<i64> {
        None
    }
    fn density(&self) -> Option<f64> {
        None
    }
    fn locale(&self) -> Option<String> {
        None
    }
    fn os_name(&self) -> Option<String> {
        None
    }
    fn os_version(&self) -> Option<String> {
        None
    }
    fn platform(&self) -> Option<String> {
        None
    }
    fn cpu_arch(&self) -> Option<String> {
        None
    }
}

/// Device information read from the host operating system.
///
/// Screen metrics and form factor have no meaning on a host without a
/// display API and are left to platform-specific providers.
#[derive(Clone, Debug)]
pub struct SystemDeviceInfo {
    manufacturer: Option<String>,
    platform: String,
    /// OS name and version, read from the host on first use.
    os: OnceLock<(String, Option<String>)>,
}

impl SystemDeviceInfo {
    pub fn new(config: &AttributesConfig) -> Self {
        Self {
            manufacturer: config.device_manufacturer.clone(),
            platform: config.platform.clone(),
            os: OnceLock::new(),
        }
    }

    fn os(&self) -> &(String, Option<String>) {
        self.os.get_or_init(info::os::os_name_and_version)
    }
}

impl DeviceInfoProvider for SystemDeviceInfo {
    fn name(&self) -> Option<String> {
        info::os::hostname()
    }

    fn manufacturer(&self) -> Option<String> {
        self.manufacturer.clone()
    }

    fn locale(&self) -> Option<String> {
        info::locale::current()
    }

    fn os_name(&self) -> Option<String> {
        Some(self.os().0.clone())
    }

    fn os_version(&self) -> Option<String> {
        self.os().1.clone()
    }

    fn platform(&self) -> Option<String> {
        Some(self.platform.clone())
    }

    fn cpu_arch(&self) -> Option<String> {
        Some(info::os::cpu_arch())
    }
}

/// Device model, screen, locale, OS and CPU attributes. Constant for the
/// life of the process.
pub struct DeviceAttributeSource<P = SystemDeviceInfo> {
    provider: P,
}

impl<P: DeviceInfoProvider> DeviceAttributeSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: DeviceInfoProvider> AttributeSource for DeviceAttributeSource<P> {
    fn compute_attributes(&self) -> AttributeMap {
        let p = &self.provider;
        let mut attributes = AttributeMap::with_capacity(15);
        attributes.insert(keys::DEVICE_NAME, string_or_unknown(p.name()));
        attributes.insert(keys::DEVICE_MODEL, string_or_unknown(p.model()));
        attributes.insert(
            keys::DEVICE_MANUFACTURER,
            string_or_unknown(p.manufacturer()),
        );
        attributes.insert(
            keys::DEVICE_TYPE,
            string_or_unknown(p.device_type().map(|t| t.as_str().to_owned())),
        );
        attributes.insert(keys::DEVICE_IS_FOLDABLE, p.is_foldable());
        attributes.insert(keys::DEVICE_IS_PHYSICAL, p.is_physical());
        attributes.insert(keys::DEVICE_DENSITY_DPI, p.density_dpi());
        attributes.insert(keys::DEVICE_WIDTH_PX, p.width_px());
        attributes.insert(keys::DEVICE_HEIGHT_PX, p.height_px());
        attributes.insert(keys::DEVICE_DENSITY, p.density());
        attributes.insert(keys::DEVICE_LOCALE, string_or_unknown(p.locale()));
        attributes.insert(keys::OS_NAME, string_or_unknown(p.os_name()));
        attributes.insert(keys::OS_VERSION, string_or_unknown(p.os_version()));
        attributes.insert(keys::PLATFORM, string_or_unknown(p.platform()));
        attributes.insert(keys::DEVICE_CPU_ARCH, string_or_unknown(p.cpu_arch()));
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::AttributeValue;
    use serde_json::json;

    struct Tablet;

    impl DeviceInfoProvider for Tablet {
        fn name(&self) -> Option<String> {
            Some("Ada's iPad".into())
        }
        fn model(&self) -> Option<String> {
            Some("iPad13,4".into())
        }
        fn manufacturer(&self) -> Option<String> {
            Some("Apple".into())
        }
        fn device_type(&self) -> Option<DeviceType> {
            Some(DeviceType::Tablet)
        }
        fn is_foldable(&self) -> Option<bool> {
            Some(false)
        }
        fn is_physical(&self) -> Option<bool> {
            Some(true)
        }
        fn density_dpi(&self) -> Option<i64> {
            Some(320)
        }
        fn width_px(&self) -> Option<i64> {
            Some(2048)
        }
        fn height_px(&self) -> Option<i64> {
            Some(2732)
        }
        fn density(&self) -> Option<f64> {
            Some(2.0)
        }
        fn locale(&self) -> Option<String> {
            Some("en-US".into())
        }
        fn os_name(&self) -> Option<String> {
            Some("iPadOS".into())
        }
        fn os_version(&self) -> Option<String> {
            Some("17.4".into())
        }
        fn platform(&self) -> Option<String> {
            Some("ios".into())
        }
        fn cpu_arch(&self) -> Option<String> {
            Some("arm64".into())
        }
    }

    struct Nothing;

    impl DeviceInfoProvider for Nothing {}

    #[test]
    fn test_device_attributes() {
        let attributes = DeviceAttributeSource::new(Tablet).compute_attributes();
        assert_eq!(
            serde_json::to_value(attributes).unwrap(),
            json!({
                "device_name": "Ada's iPad",
                "device_model": "iPad13,4",
                "device_manufacturer": "Apple",
                "device_type": "tablet",
                "device_is_foldable": false,
                "device_is_physical": true,
                "device_density_dpi": 320,
                "device_width_px": 2048,
                "device_height_px": 2732,
                "device_density": 2.0,
                "device_locale": "en-US",
                "os_name": "iPadOS",
                "os_version": "17.4",
                "platform": "ios",
                "device_cpu_arch": "arm64",
            })
        );
    }

    #[test]
    fn test_every_key_present_when_sources_are_unavailable() {
        let attributes = DeviceAttributeSource::new(Nothing).compute_attributes();

        assert_eq!(attributes.len(), 15);
        assert_eq!(
            attributes.get(keys::DEVICE_TYPE),
            Some(&AttributeValue::from(keys::values::UNKNOWN))
        );
        assert_eq!(
            attributes.get(keys::DEVICE_CPU_ARCH),
            Some(&AttributeValue::from(keys::values::UNKNOWN))
        );
        assert_eq!(
            attributes.get(keys::DEVICE_DENSITY_DPI),
            Some(&AttributeValue::Null)
        );
        assert_eq!(
            attributes.get(keys::DEVICE_IS_PHYSICAL),
            Some(&AttributeValue::Null)
        );
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_system_device_info() {
        let config = AttributesConfig {
            device_manufacturer: Some("Acme".into()),
            platform: "linux".into(),
            ..Default::default()
        };
        let attributes =
            DeviceAttributeSource::new(SystemDeviceInfo::new(&config)).compute_attributes();

        assert_eq!(
            attributes.get(keys::DEVICE_MANUFACTURER),
            Some(&AttributeValue::from("Acme"))
        );
        assert_eq!(
            attributes.get(keys::PLATFORM),
            Some(&AttributeValue::from("linux"))
        );
        let arch = attributes
            .get(keys::DEVICE_CPU_ARCH)
            .and_then(AttributeValue::as_str)
            .unwrap();
        assert_ne!(arch, keys::values::UNKNOWN);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_os_is_read_from_the_host_once() {
        let provider = SystemDeviceInfo::new(&AttributesConfig::default());
        assert!(provider.os.get().is_none());

        let name = provider.os_name();
        assert!(provider.os.get().is_some());
        let version = provider.os_version();

        let (cached_name, cached_version) = provider.os();
        assert_eq!(name.as_ref(), Some(cached_name));
        assert_eq!(&version, cached_version);
    }
}
