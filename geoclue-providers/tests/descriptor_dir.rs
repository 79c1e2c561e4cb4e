//! Loading providers from a descriptor directory on disk

use std::fs;
use std::path::Path;
use std::sync::Arc;

use geoclue_providers::{
    AccuracyLevel, ConnectivityStatus, Constraints, DescriptorDir, DescriptorSource, Interface,
    ProviderError, ProviderRegistry, SharedConnectivity, StaticConnectivity,
};
use tempfile::TempDir;

const HOSTIP: &str = r#"
[provider]
name = "Hostip"
service = "org.freedesktop.Geoclue.Providers.Hostip"
path = "/org/freedesktop/Geoclue/Providers/Hostip"
accuracy = "locality"
interfaces = ["position", "address"]
provides = ["cacheable"]
requires = ["network"]
"#;

const GPSD: &str = r#"
[provider]
name = "Gpsd"
service = "org.freedesktop.Geoclue.Providers.Gpsd"
path = "/org/freedesktop/Geoclue/Providers/Gpsd"
accuracy = "detailed"
interfaces = ["position", "velocity"]
provides = ["updates"]
requires = ["gps"]
"#;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn connectivity() -> SharedConnectivity {
    StaticConnectivity::shared(ConnectivityStatus::Online)
}

#[test]
fn test_one_valid_one_invalid() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "hostip.provider", HOSTIP);
    write(dir.path(), "broken.provider", "[provider\nname = ");

    let mut registry = ProviderRegistry::new();
    let report = registry.load(&DescriptorDir::new(dir.path()), &connectivity());

    assert_eq!(registry.len(), 1);
    assert_eq!(report.loaded.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].0.ends_with("broken.provider"));
    assert!(matches!(
        report.skipped[0].1,
        ProviderError::DescriptorParse { .. }
    ));

    let hostip = registry.iter().next().unwrap();
    assert_eq!(hostip.name(), "Hostip");
    assert!(hostip.is_cacheable());
}

#[test]
fn test_non_descriptor_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "gpsd.provider", GPSD);
    write(dir.path(), "README", "not a provider");
    write(dir.path(), "gpsd.provider.orig", GPSD);

    let source = DescriptorDir::new(dir.path());
    let listing = source.list().unwrap();
    assert_eq!(listing.accepted.len(), 1);
    assert_eq!(listing.ignored, vec!["README", "gpsd.provider.orig"]);

    let mut registry = ProviderRegistry::new();
    let report = registry.load(&source, &connectivity());
    assert!(report.is_clean());
    assert_eq!(report.ignored.len(), 2);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_custom_extension() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "gpsd.geoclue", GPSD);
    write(dir.path(), "hostip.provider", HOSTIP);

    let mut registry = ProviderRegistry::new();
    registry.load(
        &DescriptorDir::with_extension(dir.path(), ".geoclue"),
        &connectivity(),
    );
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.iter().next().unwrap().name(), "Gpsd");
}

#[test]
fn test_missing_directory_leaves_registry_empty() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");

    let mut registry = ProviderRegistry::new();
    let report = registry.load(&DescriptorDir::new(&missing), &connectivity());

    assert!(registry.is_empty());
    assert!(matches!(
        report.source_error,
        Some(ProviderError::DescriptorDir { .. })
    ));
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let mut registry = ProviderRegistry::new();
    let report = registry.load(&DescriptorDir::new(dir.path()), &connectivity());

    assert!(registry.is_empty());
    assert!(report.is_clean());
}

#[test]
fn test_selection_over_loaded_directory() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "gpsd.provider", GPSD);
    write(dir.path(), "hostip.provider", HOSTIP);

    let connectivity = connectivity();
    let mut registry = ProviderRegistry::new();
    registry.load(&DescriptorDir::new(dir.path()), &connectivity);

    let address = Constraints::any().with_interface(Interface::Address);
    let names: Vec<&str> = registry.filter(&address).iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["Hostip"]);

    let precise = Constraints::any()
        .with_min_accuracy(AccuracyLevel::Street)
        .with_updates(true);
    let names: Vec<&str> = registry.filter(&precise).iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["Gpsd"]);

    assert_eq!(Arc::strong_count(&connectivity), 3);
    registry.release();
    assert_eq!(Arc::strong_count(&connectivity), 1);
}
