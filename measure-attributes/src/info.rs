// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Host lookups backing [`crate::sources::SystemDeviceInfo`].

pub mod os {
    #[cfg(unix)]
    use std::ffi::CStr;

    #[cfg(not(target_arch = "wasm32"))]
    pub fn hostname() -> Option<String> {
        sys_info::hostname().ok()
    }
    #[cfg(target_arch = "wasm32")]
    pub fn hostname() -> Option<String> {
        None
    }

    /// OS name (e.g. `Ubuntu`, `Mac OS`) and version, if the version is known.
    pub fn os_name_and_version() -> (String, Option<String>) {
        let info = os_info::get();
        let version = match info.version() {
            os_info::Version::Unknown => None,
            version => Some(version.to_string()),
        };
        (info.os_type().to_string(), version)
    }

    /// CPU architecture as reported by the kernel (`uname -m`), falling back
    /// to the architecture this library was compiled for.
    pub fn cpu_arch() -> String {
        #[cfg(unix)]
        {
            // SAFETY: see `machine`.
            if let Some(machine) = unsafe { machine() } {
                return machine;
            }
        }
        std::env::consts::ARCH.to_owned()
    }

    /// # Safety
    ///   Unsafe because of FFI. `uname` only fails if `struct utsname` is
    ///   malformed, and we hand it a zeroed one, so the call cannot
    ///   realistically fail. The returned buffer is NUL-terminated.
    #[cfg(unix)]
    unsafe fn machine() -> Option<String> {
        let mut n: libc::utsname = std::mem::zeroed();
        match libc::uname(&mut n) {
            0 => {
                let machine = CStr::from_ptr(n.machine.as_ptr())
                    .to_string_lossy()
                    .into_owned();
                (!machine.is_empty()).then_some(machine)
            }
            _ => None,
        }
    }
}

pub mod locale {
    use std::env;

    const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

    /// The process locale from the POSIX environment, e.g. `en-US`.
    pub fn current() -> Option<String> {
        LOCALE_VARS
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find_map(|value| normalize(&value))
    }

    /// Turns a POSIX locale such as `en_US.UTF-8@euro` into `en-US`. The
    /// `C` and `POSIX` locales carry no language and yield `None`.
    pub fn normalize(value: &str) -> Option<String> {
        let base = value
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .trim();
        if base.is_empty() || base == "C" || base == "POSIX" {
            return None;
        }
        Some(base.replace('_', "-"))
    }

}
