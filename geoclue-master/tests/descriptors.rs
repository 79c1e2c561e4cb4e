//! Provider selection with descriptors read from disk

use std::fs;

use geoclue_bus::{LocalBus, MethodCall, ObjectPath};
use geoclue_master::{MasterConfig, MasterService, CREATE_METHOD, MASTER_INTERFACE};
use geoclue_providers::{AccuracyLevel, ConnectivityStatus, Constraints, Interface, StaticConnectivity};
use tempfile::TempDir;

fn descriptor(name: &str, accuracy: &str, interfaces: &str, provides: &str, requires: &str) -> String {
    format!(
        r#"
[provider]
name = "{name}"
service = "org.freedesktop.Geoclue.Providers.{name}"
path = "/org/freedesktop/Geoclue/Providers/{name}"
accuracy = "{accuracy}"
interfaces = [{interfaces}]
provides = [{provides}]
requires = [{requires}]
"#
    )
}

fn providers_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let files = [
        ("hostip.provider", descriptor("Hostip", "locality", "\"position\", \"address\"", "\"cacheable\"", "\"network\"")),
        ("gpsd.provider", descriptor("Gpsd", "detailed", "\"position\", \"velocity\"", "\"updates\"", "\"gps\"")),
        ("geonames.provider", descriptor("Geonames", "street", "\"geocode\", \"reverse_geocode\"", "", "\"network\"")),
        ("broken.provider", "[provider]\nname = \"Broken\"\n".to_string()),
        ("notes.txt", "not a descriptor".to_string()),
    ];
    for (name, text) in files {
        fs::write(dir.path().join(name), text).unwrap();
    }
    dir
}

fn create_call(sender: &str) -> MethodCall {
    MethodCall::new(
        ObjectPath::new("/org/freedesktop/Geoclue/Master").unwrap(),
        MASTER_INTERFACE,
        CREATE_METHOD,
    )
    .with_sender(sender)
}

#[test]
fn test_malformed_descriptor_is_skipped() {
    let dir = providers_dir();
    let bus = LocalBus::new();
    let master = MasterService::start(
        MasterConfig::default().with_providers_dir(dir.path()),
        &bus,
        StaticConnectivity::shared(ConnectivityStatus::Online),
    )
    .unwrap();

    let mut names: Vec<&str> = master.providers().iter().map(|p| p.name()).collect();
    names.sort();
    assert_eq!(names, vec!["Geonames", "Gpsd", "Hostip"]);
}

#[test]
fn test_missing_directory_gives_empty_registry() {
    let dir = TempDir::new().unwrap();
    let bus = LocalBus::new();
    let mut master = MasterService::start(
        MasterConfig::default().with_providers_dir(dir.path().join("missing")),
        &bus,
        StaticConnectivity::shared(ConnectivityStatus::Online),
    )
    .unwrap();

    assert!(master.is_functional());
    assert!(master.providers().is_empty());

    let client = bus.add_peer();
    let path = master.create_session(&create_call(&client)).unwrap();
    assert!(master.providers_for(&path).unwrap().is_empty());
}

#[test]
fn test_selection_per_session() {
    let dir = providers_dir();
    let bus = LocalBus::new();
    let mut master = MasterService::start(
        MasterConfig::default().with_providers_dir(dir.path()),
        &bus,
        StaticConnectivity::shared(ConnectivityStatus::Online),
    )
    .unwrap();

    let navigator = master.create_session(&create_call(&bus.add_peer())).unwrap();
    let weather = master.create_session(&create_call(&bus.add_peer())).unwrap();

    master
        .set_requirements(
            &navigator,
            Constraints::any()
                .with_interface(Interface::Position)
                .with_min_accuracy(AccuracyLevel::Street)
                .with_updates(true),
        )
        .unwrap();
    master
        .set_requirements(
            &weather,
            Constraints::any()
                .with_interface(Interface::Position)
                .with_min_accuracy(AccuracyLevel::CITY)
                .with_allowed_resources([geoclue_providers::Resource::Network]),
        )
        .unwrap();

    let navigator_names: Vec<&str> = master
        .providers_for(&navigator)
        .unwrap()
        .iter()
        .map(|p| p.name())
        .collect();
    assert_eq!(navigator_names, vec!["Gpsd"]);

    let weather_names: Vec<&str> = master
        .providers_for(&weather)
        .unwrap()
        .iter()
        .map(|p| p.name())
        .collect();
    assert_eq!(weather_names, vec!["Hostip"]);
}

#[test]
fn test_custom_extension() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("hostip.geoclue"),
        descriptor("Hostip", "locality", "\"position\"", "", "\"network\""),
    )
    .unwrap();
    fs::write(
        dir.path().join("gpsd.provider"),
        descriptor("Gpsd", "detailed", "\"position\"", "\"updates\"", "\"gps\""),
    )
    .unwrap();

    let bus = LocalBus::new();
    let master = MasterService::start(
        MasterConfig::default()
            .with_providers_dir(dir.path())
            .with_provider_extension(".geoclue"),
        &bus,
        StaticConnectivity::shared(ConnectivityStatus::Online),
    )
    .unwrap();

    let names: Vec<&str> = master.providers().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["Hostip"]);
}
