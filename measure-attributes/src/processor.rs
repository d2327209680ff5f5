// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::map::AttributeMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Contributes attributes to an event.
///
/// Implementations are invoked from whichever thread creates the event, so
/// they must be `Send + Sync` and must not block on anything slower than a
/// local storage read. They only ever add or overwrite their own keys.
pub trait AttributeProcessor: Send + Sync {
    fn append_attributes(&self, attributes: &mut AttributeMap);
}

/// Computes a set of attributes from scratch.
///
/// Sources are expected to be deterministic for a given environment, which
/// is what allows [`ComputeOnce`] to call them a single time. Unavailable
/// values must be replaced by a sentinel inside the source; there is no
/// error channel.
pub trait AttributeSource: Send + Sync {
    fn compute_attributes(&self) -> AttributeMap;
}

impl<P: AttributeProcessor + ?Sized> AttributeProcessor for Box<P> {
    fn append_attributes(&self, attributes: &mut AttributeMap) {
        (**self).append_attributes(attributes)
    }
}

impl<P: AttributeProcessor + ?Sized> AttributeProcessor for Arc<P> {
    fn append_attributes(&self, attributes: &mut AttributeMap) {
        (**self).append_attributes(attributes)
    }
}

/// Adapts a closure into an [`AttributeProcessor`].
pub struct FnProcessor<F>(pub F);

impl<F> AttributeProcessor for FnProcessor<F>
where
    F: Fn(&mut AttributeMap) + Send + Sync,
{
    fn append_attributes(&self, attributes: &mut AttributeMap) {
        (self.0)(attributes)
    }
}

/// Wraps an [`AttributeSource`] so that it is computed at most once for the
/// lifetime of the wrapper, then serves the cached map.
///
/// Threads racing on the first call all wait for the single computation.
/// Once computed, reading the cache does not take a lock.
pub struct ComputeOnce<S> {
    source: S,
    cached: OnceLock<AttributeMap>,
}

impl<S: AttributeSource> ComputeOnce<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cached: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_computed(&self) -> bool {
        self.cached.get().is_some()
    }

    /// Returns the cached attributes without triggering a computation.
    pub fn cached(&self) -> Option<&AttributeMap> {
        self.cached.get()
    }

    fn attributes(&self) -> &AttributeMap {
        self.cached.get_or_init(|| {
            let attributes = self.source.compute_attributes();
            debug!(
                source = std::any::type_name::<S>(),
                attributes.count = attributes.len(),
                "Computed cached attributes"
            );
            attributes
        })
    }
}

impl<S: AttributeSource> AttributeProcessor for ComputeOnce<S> {
    fn append_attributes(&self, attributes: &mut AttributeMap) {
        let cached = self.attributes();
        if cached.is_empty() {
            return;
        }
        attributes.merge(cached);
    }
}
