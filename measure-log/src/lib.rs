// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Installs a process-wide `tracing` subscriber whose level and outputs can
//! be changed at runtime.

pub mod config;
pub mod logger;
mod writers;

pub use config::{logger_init_from_env, LogConfig, LogMethod};
pub use logger::{
    logger_configure_file, logger_configure_std, logger_disable_file, logger_disable_std,
    logger_set_log_level, FileConfig, LogLevel, LoggerError, StdConfig, StdTarget,
};
