// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::AttributesConfig;
use crate::id::UuidIdProvider;
use crate::map::AttributeMap;
use crate::processor::{AttributeProcessor, AttributeSource, ComputeOnce};
use crate::sources::{
    AppAttributeSource, DeviceAttributeSource, InstallationIdAttributeSource, SystemDeviceInfo,
    UserAttributeProcessor,
};
use crate::storage::{FileStore, KeyValueStore};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// An ordered, fixed list of processors applied to every outgoing event.
///
/// Processors run in the order they were added. When two processors write
/// the same key, the later one wins.
pub struct AttributePipeline {
    processors: Vec<Box<dyn AttributeProcessor>>,
}

impl AttributePipeline {
    pub fn builder() -> AttributePipelineBuilder {
        AttributePipelineBuilder::default()
    }

    pub fn new(processors: Vec<Box<dyn AttributeProcessor>>) -> Self {
        Self { processors }
    }

    /// Attributes of a new event, collected into a fresh map.
    pub fn attributes(&self) -> AttributeMap {
        let mut attributes = AttributeMap::new();
        self.append_attributes(&mut attributes);
        attributes
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl AttributeProcessor for AttributePipeline {
    fn append_attributes(&self, attributes: &mut AttributeMap) {
        for processor in &self.processors {
            processor.append_attributes(attributes);
        }
    }
}

impl fmt::Debug for AttributePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributePipeline")
            .field("processors", &self.processors.len())
            .finish()
    }
}

#[derive(Default)]
pub struct AttributePipelineBuilder {
    processors: Vec<Box<dyn AttributeProcessor>>,
}

impl AttributePipelineBuilder {
    pub fn with_processor(mut self, processor: impl AttributeProcessor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Adds a source whose attributes are computed on first use and cached
    /// for the life of the pipeline.
    pub fn with_source(self, source: impl AttributeSource + 'static) -> Self {
        self.with_processor(ComputeOnce::new(source))
    }

    pub fn build(self) -> AttributePipeline {
        AttributePipeline::new(self.processors)
    }
}

/// Builds the default pipeline: app, device, installation ID and user
/// attributes, with durable values kept in `config.storage_dir`.
///
/// The returned user processor is shared with the pipeline so the caller can
/// set and clear the user ID while events are being created.
pub fn standard_pipeline(
    config: &AttributesConfig,
) -> (AttributePipeline, Arc<UserAttributeProcessor>) {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.storage_dir));
    let user = Arc::new(UserAttributeProcessor::new(Arc::clone(&store)));

    let pipeline = AttributePipeline::builder()
        .with_source(AppAttributeSource::new(config.app.clone()))
        .with_source(DeviceAttributeSource::new(SystemDeviceInfo::new(config)))
        .with_source(InstallationIdAttributeSource::new(store, Arc::new(UuidIdProvider)))
        .with_processor(Arc::clone(&user))
        .build();

    debug!(
        storage_dir = %config.storage_dir.display(),
        processors = pipeline.len(),
        "Built attribute pipeline"
    );
    (pipeline, user)
}
