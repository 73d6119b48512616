//! IOS-XR, Junos and Huawei translation tests

mod common;

use std::sync::Arc;

use cli_units::error::Error;
use cli_units::platform::Platform;
use cli_units::unit::{ReadContext, UnitRegistry, WriteContext};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// IOS-XR
// ============================================================================

const XR_INTERFACE_LIST: &str = "\
Mon Oct  5 10:12:01.123 UTC
interface Loopback0
interface GigabitEthernet0/0/0/0
";

const XR_GI0: &str = "\
Mon Oct  5 10:12:01.123 UTC
interface GigabitEthernet0/0/0/0
 description to-pe2
 mtu 9000
 ipv4 address 10.187.100.49 255.255.255.240
!
";

#[tokio::test]
async fn test_iosxr_read_interfaces() {
    let mock = Arc::new(MockCli::new("RP/0/RSP0/CPU0:pe1"));
    mock.set_response(
        "show running-config interface | include ^interface",
        XR_INTERFACE_LIST,
    );
    mock.set_response(
        "show running-config interface GigabitEthernet0/0/0/0",
        XR_GI0,
    );
    let device = device(&mock, Platform::CiscoIosXr);
    let registry = UnitRegistry::with_builtins();
    let ctx = ReadContext::new();

    let entries = registry
        .list(&path("/interfaces/interface"), &device, &ctx)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);

    let value = registry
        .read(&entries[1].child("config"), &device, &ctx)
        .await
        .unwrap();
    assert_eq!(
        value,
        Some(json!({
            "name": "GigabitEthernet0/0/0/0",
            "type": "ethernet-csmacd",
            "description": "to-pe2",
            "mtu": 9000,
            "enabled": true
        }))
    );

    let address = registry
        .read(
            &path("/interfaces/interface[name=GigabitEthernet0/0/0/0]/subinterfaces/subinterface[index=0]/ipv4/addresses/address[ip=10.187.100.49]/config"),
            &device,
            &ctx,
        )
        .await
        .unwrap();
    assert_eq!(
        address,
        Some(json!({"ip": "10.187.100.49", "prefix_length": 28}))
    );
}

#[tokio::test]
async fn test_iosxr_write_commits() {
    let mock = Arc::new(MockCli::new("pe1"));
    let device = device(&mock, Platform::CiscoIosXr);

    let after = json!({"name": "Loopback100", "description": "router-id"});
    UnitRegistry::with_builtins()
        .write(
            &interface_path("Loopback100"),
            None,
            Some(&after),
            &device,
            &WriteContext::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        mock.commands(),
        vec!["configure terminal\ninterface Loopback100\ndescription router-id\nno shutdown\ncommit\nend"]
    );
}

#[tokio::test]
async fn test_iosxr_commit_failure() {
    let mock = Arc::new(MockCli::new("pe1"));
    mock.reject(
        "commit",
        "% Failed to commit one or more configuration items during a pseudo-atomic operation.",
    );
    let device = device(&mock, Platform::CiscoIosXr);

    let after = json!({"name": "Loopback100"});
    let err = UnitRegistry::with_builtins()
        .write(
            &interface_path("Loopback100"),
            None,
            Some(&after),
            &device,
            &WriteContext::new(),
        )
        .await
        .unwrap_err();

    match err {
        Error::WriteFailed { command, output, .. } => {
            // `commit` is not one of the handler's lines, so the whole block is reported.
            assert!(command.starts_with("configure terminal"));
            assert!(command.ends_with("end"));
            assert!(output.contains("% Failed to commit"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_iosxr_has_no_ipv4_writer() {
    let mock = Arc::new(MockCli::new("pe1"));
    let device = device(&mock, Platform::CiscoIosXr);

    let after = json!({"ip": "10.0.0.1", "prefix_length": 24});
    let err = UnitRegistry::with_builtins()
        .write(
            &path("/interfaces/interface[name=Loopback0]/subinterfaces/subinterface[index=0]/ipv4/addresses/address[ip=10.0.0.1]/config"),
            None,
            Some(&after),
            &device,
            &WriteContext::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HandlerNotFound { kind: "writer", .. }));
}

// ============================================================================
// Junos
// ============================================================================

const JUNOS_DISPLAY_SET: &str = "\
set interfaces ge-0/0/3 description \"to core 1\"
set interfaces ge-0/0/3 mtu 9192
set interfaces ge-0/0/3 disable
set interfaces lo0 unit 0 family inet address 10.255.0.1/32
";

fn junos_mock() -> Arc<MockCli> {
    let mock = Arc::new(MockCli::new("vmx1"));
    mock.set_response("show configuration interfaces | display set", JUNOS_DISPLAY_SET);
    mock
}

#[tokio::test]
async fn test_junos_list_and_read_share_output() {
    let mock = junos_mock();
    let device = device(&mock, Platform::JuniperJunos);
    let registry = UnitRegistry::with_builtins();
    let ctx = ReadContext::new();

    let names: Vec<String> = registry
        .list(&path("/interfaces/interface"), &device, &ctx)
        .await
        .unwrap()
        .iter()
        .filter_map(|p| p.key("name").map(str::to_string))
        .collect();
    assert_eq!(names, vec!["ge-0/0/3", "lo0"]);

    let ge = registry
        .read(&interface_path("ge-0/0/3"), &device, &ctx)
        .await
        .unwrap();
    assert_eq!(
        ge,
        Some(json!({
            "name": "ge-0/0/3",
            "type": "ethernet-csmacd",
            "description": "to core 1",
            "mtu": 9192,
            "enabled": false
        }))
    );

    let missing = registry
        .read(&interface_path("ge-0/0/9"), &device, &ctx)
        .await
        .unwrap();
    assert_eq!(missing, None);

    assert_eq!(mock.command_count(), 1);
}

#[tokio::test]
async fn test_junos_description_mentioning_error() {
    let mock = Arc::new(MockCli::new("vmx1"));
    mock.set_response(
        "show configuration interfaces | display set",
        "set interfaces ge-0/0/3 description \"error: crc on link, RMA pending\"\n",
    );
    let device = device(&mock, Platform::JuniperJunos);

    let value = UnitRegistry::with_builtins()
        .read(&interface_path("ge-0/0/3"), &device, &ReadContext::new())
        .await
        .unwrap();
    assert_eq!(
        value.unwrap()["description"],
        json!("error: crc on link, RMA pending")
    );
}

#[tokio::test]
async fn test_junos_enable_interface() {
    let mock = junos_mock();
    let device = device(&mock, Platform::JuniperJunos);

    let before = json!({"name": "ge-0/0/3", "enabled": false});
    let after = json!({"name": "ge-0/0/3", "enabled": true});
    UnitRegistry::with_builtins()
        .write(
            &interface_path("ge-0/0/3"),
            Some(&before),
            Some(&after),
            &device,
            &WriteContext::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        mock.commands(),
        vec!["configure\ndelete interfaces ge-0/0/3 disable\ncommit\nexit"]
    );
}

#[tokio::test]
async fn test_junos_syntax_error() {
    let mock = junos_mock();
    mock.reject("set interfaces lo0 mtu 100", "error: mtu value is not within range");
    let device = device(&mock, Platform::JuniperJunos);

    let before = json!({"name": "lo0"});
    let after = json!({"name": "lo0", "mtu": 100});
    let err = UnitRegistry::with_builtins()
        .write(
            &interface_path("lo0"),
            Some(&before),
            Some(&after),
            &device,
            &WriteContext::new(),
        )
        .await
        .unwrap_err();

    match err {
        Error::WriteFailed { command, .. } => assert_eq!(command, "set interfaces lo0 mtu 100"),
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Huawei
// ============================================================================

const HUAWEI_INTERFACE: &str = "\
#
interface Vlanif20
 description users
 mtu 1400
 shutdown
#
return
";

#[tokio::test]
async fn test_huawei_read_interface() {
    let mock = Arc::new(MockCli::new("<HUAWEI>"));
    mock.set_response(
        "display current-configuration interface Vlanif20",
        HUAWEI_INTERFACE,
    );
    let device = device(&mock, Platform::Huawei);

    let value = UnitRegistry::with_builtins()
        .read(&interface_path("Vlanif20"), &device, &ReadContext::new())
        .await
        .unwrap();
    assert_eq!(
        value,
        Some(json!({
            "name": "Vlanif20",
            "type": "l3-ipvlan",
            "description": "users",
            "mtu": 1400,
            "enabled": false
        }))
    );
}

#[tokio::test]
async fn test_huawei_update_uses_undo() {
    let mock = Arc::new(MockCli::new("<HUAWEI>"));
    let device = device(&mock, Platform::Huawei);

    let before = json!({"name": "Vlanif20", "description": "users", "mtu": 1400, "enabled": false});
    let after = json!({"name": "Vlanif20", "description": "users"});
    UnitRegistry::with_builtins()
        .write(
            &interface_path("Vlanif20"),
            Some(&before),
            Some(&after),
            &device,
            &WriteContext::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        mock.commands(),
        vec!["system-view\ninterface Vlanif20\nundo mtu\nundo shutdown\nreturn"]
    );
}

#[tokio::test]
async fn test_huawei_delete() {
    let mock = Arc::new(MockCli::new("<HUAWEI>"));
    let device = device(&mock, Platform::Huawei);

    let before = json!({"name": "LoopBack1"});
    UnitRegistry::with_builtins()
        .write(
            &interface_path("LoopBack1"),
            Some(&before),
            None,
            &device,
            &WriteContext::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        mock.commands(),
        vec!["system-view\nundo interface LoopBack1\nreturn"]
    );
}

#[tokio::test]
async fn test_huawei_physical_delete_blocked() {
    let mock = Arc::new(MockCli::new("<HUAWEI>"));
    let device = device(&mock, Platform::Huawei);

    let before = json!({"name": "GE1/0/0"});
    let err = UnitRegistry::with_builtins()
        .write(
            &interface_path("GE1/0/0"),
            Some(&before),
            None,
            &device,
            &WriteContext::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(mock.command_count(), 0);
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_builtin_units() {
    let registry = UnitRegistry::with_builtins();
    let names: Vec<&str> = registry.units().iter().map(|u| u.name()).collect();
    assert_eq!(
        names,
        vec![
            "ios-interfaces",
            "ios-bgp",
            "iosxr-interfaces",
            "junos-interfaces",
            "huawei-interfaces"
        ]
    );

    let junos_paths = registry.paths(Platform::JuniperJunos);
    assert_eq!(
        junos_paths,
        vec!["/interfaces/interface", "/interfaces/interface/config"]
    );
    assert_eq!(
        registry.paths(Platform::Generic),
        registry.paths(Platform::CiscoIos)
    );
}
