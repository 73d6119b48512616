//! Built-in translation units
//!
//! Interface, IPv4 and BGP handlers for the supported platforms. Each
//! vendor module exposes its units; [`builtin_units`] collects them for
//! [`UnitRegistry::with_builtins`](crate::unit::UnitRegistry::with_builtins).

pub mod huawei;
pub mod ios;
pub mod iosxr;
pub mod junos;
pub mod model;

use crate::error::{Error, Result};
use crate::path::ConfigPath;
use crate::template::TemplateEngine;
use crate::unit::TranslateUnit;
use model::{InterfaceConfig, InterfaceKind};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Interface list
pub const INTERFACES: &str = "/interfaces/interface";
/// Interface configuration
pub const INTERFACE_CONFIG: &str = "/interfaces/interface/config";
/// IPv4 address list of a subinterface
pub const IPV4_ADDRESSES: &str =
    "/interfaces/interface/subinterfaces/subinterface/ipv4/addresses/address";
/// IPv4 address configuration
pub const IPV4_ADDRESS_CONFIG: &str =
    "/interfaces/interface/subinterfaces/subinterface/ipv4/addresses/address/config";
/// BGP global configuration
pub const BGP_GLOBAL_CONFIG: &str =
    "/network-instances/network-instance/protocols/protocol/bgp/global/config";

/// Renderer shared by the command templates of all units
pub(crate) static TEMPLATES: Lazy<TemplateEngine> = Lazy::new(TemplateEngine::new);

/// All built-in units
pub fn builtin_units() -> Vec<Arc<dyn TranslateUnit>> {
    vec![
        Arc::new(ios::IosInterfaceUnit),
        Arc::new(ios::IosBgpUnit),
        Arc::new(iosxr::IosXrInterfaceUnit),
        Arc::new(junos::JunosInterfaceUnit),
        Arc::new(huawei::HuaweiInterfaceUnit),
    ]
}

/// Template variables: `data`, and `before` when there is one
pub(crate) fn template_vars<T: Serialize>(before: Option<&T>, data: &T) -> Result<Value> {
    let mut vars = serde_json::Map::new();
    if let Some(before) = before {
        vars.insert("before".to_string(), serde_json::to_value(before)?);
    }
    vars.insert("data".to_string(), serde_json::to_value(data)?);
    Ok(Value::Object(vars))
}

/// Interface name from the path, which must agree with the record
pub(crate) fn interface_key<'a>(path: &'a ConfigPath, data: &InterfaceConfig) -> Result<&'a str> {
    let name = path.require_key("name")?;
    if name != data.name {
        return Err(Error::InvalidArgument(format!(
            "interface name '{}' does not match path '{}'",
            data.name, path
        )));
    }
    Ok(name)
}

/// Fail for physical interfaces, which exist on the device regardless of configuration
pub(crate) fn ensure_virtual(name: &str, action: &str) -> Result<()> {
    if InterfaceKind::from_name(name).is_physical() {
        return Err(Error::InvalidArgument(format!(
            "physical interface '{}' cannot be {}",
            name, action
        )));
    }
    Ok(())
}

/// Interface name for the subinterface addressed by `path`; index 0 is the interface itself
pub(crate) fn subinterface_name(path: &ConfigPath) -> Result<String> {
    let name = path.require_key("name")?;
    Ok(match path.key("index") {
        None | Some("0") => name.to_string(),
        Some(index) => format!("{}.{}", name, index),
    })
}

/// Convert a parsed integer field to `u16`
pub(crate) fn mtu_field(path: &ConfigPath, value: Option<&Value>) -> Result<Option<u16>> {
    value
        .and_then(Value::as_u64)
        .map(|mtu| {
            u16::try_from(mtu).map_err(|_| Error::Parse(format!("{}: mtu {} out of range", path, mtu)))
        })
        .transpose()
}
