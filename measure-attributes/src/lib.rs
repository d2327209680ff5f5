// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Contextual attributes attached to every telemetry event.
//!
//! Each [`AttributeProcessor`] contributes a category of attributes (app,
//! device, installation ID, user, network) to an event's [`AttributeMap`].
//! Values that cannot change during a process run are produced by an
//! [`AttributeSource`] and wrapped in [`ComputeOnce`], so the expensive reads
//! behind them happen a single time. An [`AttributePipeline`] applies a fixed,
//! ordered list of processors to each event.

pub mod config;
pub mod error;
pub mod id;
pub mod info;
pub mod keys;
pub mod map;
pub mod pipeline;
pub mod processor;
pub mod sources;
pub mod storage;
pub mod value;

pub use config::{AppConfig, AttributesConfig};
pub use error::StorageError;
pub use map::AttributeMap;
pub use pipeline::{standard_pipeline, AttributePipeline, AttributePipelineBuilder};
pub use processor::{AttributeProcessor, AttributeSource, ComputeOnce, FnProcessor};
pub use value::AttributeValue;
