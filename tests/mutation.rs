use std::fs;

use uci::{Error, SetRequest, Store, Value};

const NETWORK: &str = "\
package network

config interface 'lan'
	option ipaddr '192.168.1.1'
	option proto 'static'

config interface 'wan'
	option proto 'dhcp'
	list dns '1.1.1.1'
	list dns '8.8.8.8'

config globals
	option ula_prefix 'fd00::/48'
";

fn request(option: &str, value: &str) -> SetRequest {
    SetRequest {
        package: Some("network".to_owned()),
        section: Some("lan".to_owned()),
        option: Some(option.to_owned()),
        value: Some(value.to_owned()),
    }
}

#[test]
fn set_option_regenerates_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("network");
    fs::write(&path, NETWORK).expect("failed to write config");
    let store = Store::new(dir.path());

    store
        .set(&request("ipaddr", "10.0.0.1"))
        .expect("failed to set option");

    let text = fs::read_to_string(&path).expect("failed to read rewritten file");
    assert!(text.contains("config interface 'lan'\n\toption ipaddr '10.0.0.1'\n"));
    assert!(!text.contains("192.168.1.1"));

    let package = store.package("network").expect("package still exists");
    let names = package.sections().map(uci::Section::name).collect::<Vec<_>>();
    assert_eq!(names, ["lan", "wan", "anonymous0"]);

    let wan = package.section("wan").expect("wan survived the rewrite");
    assert_eq!(
        wan.get("dns"),
        Some(&Value::List(vec!["1.1.1.1".to_owned(), "8.8.8.8".to_owned()]))
    );
    assert_eq!(
        package.section("anonymous0").and_then(|s| s.get("ula_prefix")),
        Some(&Value::from("fd00::/48"))
    );
}

#[test]
fn set_spans_every_file_of_package() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    fs::write(dir.path().join("network"), NETWORK).expect("failed to write config");
    fs::create_dir(dir.path().join("extra")).expect("failed to create subdir");
    fs::write(
        dir.path().join("extra/vpn"),
        "package network\nconfig interface 'vpn'\n\toption proto 'wireguard'\n",
    )
    .expect("failed to write config");
    let store = Store::new(dir.path());

    store
        .set(&request("proto", "dhcp"))
        .expect("failed to set option");

    let vpn = fs::read_to_string(dir.path().join("extra/vpn")).expect("vpn file rewritten");
    assert_eq!(
        vpn,
        "package network\n\nconfig interface 'vpn'\n\toption proto 'wireguard'\n\n"
    );

    let lan = store.section("network", "lan").expect("lan exists");
    assert_eq!(lan.get("proto"), Some(&Value::from("dhcp")));
    assert_eq!(store.packages().expect("failed to list"), ["network"]);
}

#[test]
fn set_on_missing_section_touches_nothing() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("network");
    fs::write(&path, NETWORK).expect("failed to write config");
    let store = Store::new(dir.path());

    let mut missing = request("ipaddr", "10.0.0.1");
    missing.section = Some("dmz".to_owned());

    assert!(matches!(
        store.set(&missing),
        Err(Error::SectionNotFound(name)) if name == "dmz"
    ));
    assert_eq!(fs::read_to_string(&path).expect("file untouched"), NETWORK);
}
