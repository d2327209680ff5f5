// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::value::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::hash_map;
use std::collections::HashMap;

/// Attribute name to value mapping attached to an event.
///
/// Keys are unique. Iteration order is unspecified; merging is deterministic
/// because the incoming value always replaces the existing one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap {
    inner: HashMap<String, AttributeValue>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: HashMap::with_capacity(capacity),
        }
    }

    /// Sets `key` to `value`, returning the value it replaced.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<AttributeValue>
    where
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        self.inner.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.inner.remove(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, AttributeValue> {
        self.inner.iter()
    }

    pub fn keys(&self) -> hash_map::Keys<'_, String, AttributeValue> {
        self.inner.keys()
    }

    /// Copies every entry of `other` into `self`. Values from `other` win on
    /// collision; keys that only exist in `self` are left alone.
    pub fn merge(&mut self, other: &AttributeMap) {
        self.inner.reserve(other.len());
        for (key, value) in other.iter() {
            self.inner.insert(key.clone(), value.clone());
        }
    }
}

impl From<HashMap<String, AttributeValue>> for AttributeMap {
    fn from(inner: HashMap<String, AttributeValue>) -> Self {
        Self { inner }
    }
}

impl From<AttributeMap> for HashMap<String, AttributeValue> {
    fn from(map: AttributeMap) -> Self {
        map.inner
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeMap
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for AttributeMap
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, AttributeValue);
    type IntoIter = hash_map::IntoIter<String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = (&'a String, &'a AttributeValue);
    type IntoIter = hash_map::Iter<'a, String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
