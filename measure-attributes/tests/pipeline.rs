// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use measure_attributes::config::AppConfig;
use measure_attributes::keys;
use measure_attributes::sources::{
    AppAttributeSource, DeviceAttributeSource, DeviceInfoProvider, DeviceType,
    InstallationIdAttributeSource,
};
use measure_attributes::storage::FileStore;
use measure_attributes::{
    standard_pipeline, AttributeMap, AttributePipeline, AttributeProcessor, AttributeSource,
    AttributeValue, AttributesConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

struct Phone;

impl DeviceInfoProvider for Phone {
    fn model(&self) -> Option<String> {
        Some("Pixel 8".into())
    }
    fn manufacturer(&self) -> Option<String> {
        Some("Google".into())
    }
    fn device_type(&self) -> Option<DeviceType> {
        Some(DeviceType::Phone)
    }
    fn os_name(&self) -> Option<String> {
        Some("android".into())
    }
}

fn app_config() -> AppConfig {
    AppConfig {
        version: Some("1.0.0".into()),
        build: Some("100".into()),
        unique_id: Some("sh.measure.sample".into()),
    }
}

#[test]
fn test_app_and_device_keys_are_disjoint() {
    let app = AppAttributeSource::new(app_config()).compute_attributes();
    let device = DeviceAttributeSource::new(Phone).compute_attributes();

    let pipeline = AttributePipeline::builder()
        .with_source(AppAttributeSource::new(app_config()))
        .with_source(DeviceAttributeSource::new(Phone))
        .build();
    let attributes = pipeline.attributes();

    assert_eq!(attributes.len(), app.len() + device.len());
    for (key, value) in app.iter().chain(device.iter()) {
        assert_eq!(attributes.get(key), Some(value), "mismatch for {key}");
    }
    assert_eq!(
        attributes.get(keys::DEVICE_TYPE),
        Some(&AttributeValue::from("phone"))
    );
}

#[test]
fn test_appending_is_idempotent() {
    let pipeline = AttributePipeline::builder()
        .with_source(AppAttributeSource::new(app_config()))
        .with_source(DeviceAttributeSource::new(Phone))
        .build();

    let mut attributes = AttributeMap::new();
    pipeline.append_attributes(&mut attributes);
    let first = attributes.clone();
    pipeline.append_attributes(&mut attributes);

    assert_eq!(attributes, first);
}

struct CountingSource {
    calls: Arc<AtomicUsize>,
}

impl AttributeSource for CountingSource {
    fn compute_attributes(&self) -> AttributeMap {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(std::time::Duration::from_millis(10));
        [("expensive", "value")].into_iter().collect()
    }
}

#[test]
fn test_shared_pipeline_computes_once_across_threads() {
    const THREADS: usize = 12;
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = Arc::new(
        AttributePipeline::builder()
            .with_source(CountingSource {
                calls: Arc::clone(&calls),
            })
            .build(),
    );
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                pipeline.attributes()
            })
        })
        .collect();

    for handle in handles {
        let attributes = handle.join().expect("Thread panicked");
        assert_eq!(
            attributes.get("expensive"),
            Some(&AttributeValue::from("value"))
        );
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_installation_id_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let config = AttributesConfig {
        storage_dir: temp_dir.path().to_path_buf(),
        app: app_config(),
        ..Default::default()
    };

    let (first_run, user) = standard_pipeline(&config);
    user.set_user_id("user-42");
    let first = first_run.attributes();
    drop(first_run);

    let (second_run, _) = standard_pipeline(&config);
    let second = second_run.attributes();

    let id = first
        .get(keys::INSTALLATION_ID)
        .and_then(AttributeValue::as_str)
        .unwrap();
    assert_eq!(id.len(), 36);
    assert_eq!(second.get(keys::INSTALLATION_ID), first.get(keys::INSTALLATION_ID));
    assert_eq!(
        second.get(keys::USER_ID),
        Some(&AttributeValue::from("user-42"))
    );
    assert_eq!(
        second.get(keys::APP_VERSION),
        Some(&AttributeValue::from("1.0.0"))
    );
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_concurrent_first_launch_agrees_on_installation_id() {
    const PROCESSES: usize = 6;
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let barrier = Arc::new(Barrier::new(PROCESSES));

    // Each thread builds its own store and pipeline, as a separate process
    // would on a first launch.
    let handles: Vec<_> = (0..PROCESSES)
        .map(|_| {
            let dir = dir.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let pipeline = AttributePipeline::builder()
                    .with_source(InstallationIdAttributeSource::new(
                        Arc::new(FileStore::new(dir)),
                        Arc::new(measure_attributes::id::UuidIdProvider),
                    ))
                    .build();
                barrier.wait();
                pipeline
                    .attributes()
                    .get(keys::INSTALLATION_ID)
                    .cloned()
                    .unwrap()
            })
        })
        .collect();

    let ids: Vec<AttributeValue> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();
    assert!(ids.iter().all(|id| id == &ids[0]), "ids diverged: {ids:?}");
}
