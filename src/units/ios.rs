//! Cisco IOS / IOS-XE translation units

use super::model::{BgpGlobalConfig, InterfaceConfig, Ipv4Address};
use super::{
    ensure_virtual, interface_key, mtu_field, subinterface_name, template_vars, TEMPLATES,
    BGP_GLOBAL_CONFIG, INTERFACES, INTERFACE_CONFIG, IPV4_ADDRESSES, IPV4_ADDRESS_CONFIG,
};
use crate::config_tree::section_text;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::parser::{parse_field, parse_fields, FieldKind, OutputParser, ParseRule};
use crate::path::ConfigPath;
use crate::platform::Platform;
use crate::unit::{HandlerRegistry, ListReader, ReadContext, Reader, TranslateUnit, WriteContext, Writer};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::net::Ipv4Addr;

pub(crate) const SH_INTERFACES: &str = "show running-config | include ^interface";
const SH_BGP: &str = "show running-config | section router bgp";

static INTERFACE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^interface (?P<name>\S+)").expect("Invalid interface line regex")
});

static IPV4_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ip address (?P<ip>\S+) (?P<mask>\S+)$").expect("Invalid ip address regex")
});

static ROUTER_BGP_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^router bgp (?P<as>\d+)$").expect("Invalid router bgp regex"));

static ROUTER_ID_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^bgp router-id (?P<id>\S+)$").expect("Invalid bgp router-id regex")
});

static INTERFACE_PARSER: Lazy<OutputParser> = Lazy::new(|| {
    OutputParser::new(vec![
        ParseRule::new("description", r"description (?P<value>.+)"),
        ParseRule::new("mtu", r"mtu (?P<value>\d+)").with_kind(FieldKind::Integer),
        ParseRule::flag("enabled", "shutdown").negated(),
    ])
    .expect("Invalid interface parse rules")
});

const INTERFACE_TEMPLATE: &str = "\
interface {{ data.name }}
{{ update(before.description, data.description, 'description ' ~ data.description, 'no description') }}
{{ update(before.mtu, data.mtu, 'mtu ' ~ data.mtu, 'no mtu') }}
{% if before is not defined or before.enabled != data.enabled %}{% if data.enabled %}no shutdown{% else %}shutdown{% endif %}{% endif %}
";

const BGP_TEMPLATE: &str = "\
router bgp {{ data['as'] }}
{{ update(before.router_id, data.router_id, 'bgp router-id ' ~ data.router_id, 'no bgp router-id') }}
";

// ============================================================================
// Shared IOS-family parsing and rendering
// ============================================================================

/// Interface names from `... | include ^interface` output
pub(crate) fn parse_interface_names(output: &str) -> Vec<String> {
    parse_fields(output, 0, &INTERFACE_LINE, |c| {
        c.name("name").map(|m| m.as_str().to_string())
    })
}

/// Interface configuration from `show running-config interface <name>` output
pub(crate) fn parse_interface_config(
    path: &ConfigPath,
    name: &str,
    output: &str,
) -> Result<Option<InterfaceConfig>> {
    let Some(body) = section_text(output, &format!("interface {}", name)) else {
        return Ok(None);
    };
    let record = INTERFACE_PARSER.parse(&body)?;

    let mut config = InterfaceConfig::new(name);
    config.description = record
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);
    config.mtu = mtu_field(path, record.get("mtu"))?;
    config.enabled = record
        .get("enabled")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    Ok(Some(config))
}

/// Commands configuring an interface; only changed fields when `before` is given
pub(crate) fn interface_commands(
    before: Option<&InterfaceConfig>,
    after: &InterfaceConfig,
) -> Result<Vec<String>> {
    TEMPLATES.render_commands(INTERFACE_TEMPLATE, &template_vars(before, after)?)
}

/// Primary IPv4 address of an interface section; `secondary` addresses are ignored
pub(crate) fn parse_primary_ipv4(section: &str, line: &Regex) -> Option<Ipv4Address> {
    parse_field(section, 0, line, |c| {
        Ipv4Address::from_netmask(c.name("ip")?.as_str(), c.name("mask")?.as_str())
    })
}

/// IPv4 address of the subinterface at `path`, filtered by the `ip` key when present
pub(crate) async fn read_ipv4(
    path: &ConfigPath,
    device: &Device,
    ctx: &ReadContext,
    line: &Regex,
) -> Result<Option<Ipv4Address>> {
    let name = subinterface_name(path)?;
    let output = device
        .show(&format!("show running-config interface {}", name), ctx)
        .await?;
    let address = section_text(&output, &format!("interface {}", name))
        .and_then(|section| parse_primary_ipv4(&section, line));
    Ok(match (address, path.key("ip")) {
        (Some(addr), Some(ip)) if addr.ip.to_string() != ip => None,
        (address, _) => address,
    })
}

// ============================================================================
// Interfaces
// ============================================================================

/// Lists interface names
pub struct InterfaceListReader;

#[async_trait]
impl ListReader for InterfaceListReader {
    fn key_name(&self) -> &'static str {
        "name"
    }

    async fn all_keys(
        &self,
        _path: &ConfigPath,
        device: &Device,
        ctx: &ReadContext,
    ) -> Result<Vec<String>> {
        let output = device.show(SH_INTERFACES, ctx).await?;
        Ok(parse_interface_names(&output))
    }
}

/// Reads and writes interface description, MTU and admin state
pub struct InterfaceConfigHandler;

#[async_trait]
impl Reader for InterfaceConfigHandler {
    type Data = InterfaceConfig;

    async fn read(
        &self,
        path: &ConfigPath,
        device: &Device,
        ctx: &ReadContext,
    ) -> Result<Option<InterfaceConfig>> {
        let name = path.require_key("name")?;
        let output = device
            .show(&format!("show running-config interface {}", name), ctx)
            .await?;
        parse_interface_config(path, name, &output)
    }
}

#[async_trait]
impl Writer for InterfaceConfigHandler {
    type Data = InterfaceConfig;

    fn required_fields(&self) -> &'static [&'static str] {
        &["name"]
    }

    async fn write(
        &self,
        path: &ConfigPath,
        data: &InterfaceConfig,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()> {
        let name = interface_key(path, data)?;
        ensure_virtual(name, "created")?;
        device.apply(path, &interface_commands(None, data)?, ctx).await?;
        Ok(())
    }

    async fn update(
        &self,
        path: &ConfigPath,
        before: &InterfaceConfig,
        after: &InterfaceConfig,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()> {
        interface_key(path, after)?;
        device
            .apply(path, &interface_commands(Some(before), after)?, ctx)
            .await?;
        Ok(())
    }

    async fn delete(
        &self,
        path: &ConfigPath,
        data: &InterfaceConfig,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()> {
        let name = interface_key(path, data)?;
        ensure_virtual(name, "deleted")?;
        device
            .apply(path, &[format!("no interface {}", name)], ctx)
            .await?;
        Ok(())
    }
}

// ============================================================================
// IPv4 Addresses
// ============================================================================

/// Lists the primary IPv4 address of a subinterface
pub struct Ipv4AddressListReader;

#[async_trait]
impl ListReader for Ipv4AddressListReader {
    fn key_name(&self) -> &'static str {
        "ip"
    }

    async fn all_keys(
        &self,
        path: &ConfigPath,
        device: &Device,
        ctx: &ReadContext,
    ) -> Result<Vec<String>> {
        Ok(read_ipv4(path, device, ctx, &IPV4_LINE)
            .await?
            .map(|a| a.ip.to_string())
            .into_iter()
            .collect())
    }
}

/// Reads and writes the primary IPv4 address
pub struct Ipv4AddressConfigHandler;

impl Ipv4AddressConfigHandler {
    fn check_key(path: &ConfigPath, data: &Ipv4Address) -> Result<()> {
        match path.key("ip") {
            Some(ip) if ip != data.ip.to_string() => Err(Error::InvalidArgument(format!(
                "address {} does not match path '{}'",
                data.ip, path
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Reader for Ipv4AddressConfigHandler {
    type Data = Ipv4Address;

    async fn read(
        &self,
        path: &ConfigPath,
        device: &Device,
        ctx: &ReadContext,
    ) -> Result<Option<Ipv4Address>> {
        read_ipv4(path, device, ctx, &IPV4_LINE).await
    }
}

#[async_trait]
impl Writer for Ipv4AddressConfigHandler {
    type Data = Ipv4Address;

    fn required_fields(&self) -> &'static [&'static str] {
        &["ip", "prefix_length"]
    }

    async fn write(
        &self,
        path: &ConfigPath,
        data: &Ipv4Address,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()> {
        Self::check_key(path, data)?;
        let lines = vec![
            format!("interface {}", subinterface_name(path)?),
            format!("ip address {} {}", data.ip, data.netmask()),
        ];
        device.apply(path, &lines, ctx).await?;
        Ok(())
    }

    async fn delete(
        &self,
        path: &ConfigPath,
        data: &Ipv4Address,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()> {
        Self::check_key(path, data)?;
        let lines = vec![
            format!("interface {}", subinterface_name(path)?),
            format!("no ip address {} {}", data.ip, data.netmask()),
        ];
        device.apply(path, &lines, ctx).await?;
        Ok(())
    }
}

// ============================================================================
// BGP
// ============================================================================

/// Parse the BGP AS and router id from `show running-config | section router bgp`
pub fn parse_bgp_global(output: &str) -> Option<BgpGlobalConfig> {
    let asn = parse_field(output, 0, &ROUTER_BGP_LINE, |c| {
        c.name("as")?.as_str().parse::<u32>().ok()
    })?;
    let router_id = parse_field(output, 0, &ROUTER_ID_LINE, |c| {
        c.name("id")?.as_str().parse::<Ipv4Addr>().ok()
    });
    Some(BgpGlobalConfig { asn, router_id })
}

/// Network instance the BGP process configures; only the global table is handled
const DEFAULT_INSTANCE: &str = "default";

fn is_default_instance(path: &ConfigPath) -> bool {
    path.segment_key("network-instance", "name")
        .map_or(true, |name| name == DEFAULT_INSTANCE)
}

fn ensure_default_instance(path: &ConfigPath) -> Result<()> {
    if is_default_instance(path) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "only the '{}' network instance is supported for BGP: '{}'",
            DEFAULT_INSTANCE, path
        )))
    }
}

/// Reads and writes the BGP process AS and router id
pub struct BgpGlobalConfigHandler;

#[async_trait]
impl Reader for BgpGlobalConfigHandler {
    type Data = BgpGlobalConfig;

    async fn read(
        &self,
        path: &ConfigPath,
        device: &Device,
        ctx: &ReadContext,
    ) -> Result<Option<BgpGlobalConfig>> {
        if !is_default_instance(path) {
            return Ok(None);
        }
        let output = device.show(SH_BGP, ctx).await?;
        Ok(parse_bgp_global(&output))
    }
}

#[async_trait]
impl Writer for BgpGlobalConfigHandler {
    type Data = BgpGlobalConfig;

    fn required_fields(&self) -> &'static [&'static str] {
        &["as"]
    }

    async fn write(
        &self,
        path: &ConfigPath,
        data: &BgpGlobalConfig,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()> {
        ensure_default_instance(path)?;
        let lines = TEMPLATES.render_commands(BGP_TEMPLATE, &template_vars(None, data)?)?;
        device.apply(path, &lines, ctx).await?;
        Ok(())
    }

    async fn update(
        &self,
        path: &ConfigPath,
        before: &BgpGlobalConfig,
        after: &BgpGlobalConfig,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()> {
        ensure_default_instance(path)?;
        if before.asn != after.asn {
            return Err(Error::InvalidArgument(format!(
                "BGP AS cannot be changed from {} to {}",
                before.asn, after.asn
            )));
        }
        let lines =
            TEMPLATES.render_commands(BGP_TEMPLATE, &template_vars(Some(before), after)?)?;
        device.apply(path, &lines, ctx).await?;
        Ok(())
    }

    async fn delete(
        &self,
        path: &ConfigPath,
        data: &BgpGlobalConfig,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()> {
        ensure_default_instance(path)?;
        device
            .apply(path, &[format!("no router bgp {}", data.asn)], ctx)
            .await?;
        Ok(())
    }
}

// ============================================================================
// Units
// ============================================================================

/// Interfaces and IPv4 addresses
pub struct IosInterfaceUnit;

impl TranslateUnit for IosInterfaceUnit {
    fn name(&self) -> &'static str {
        "ios-interfaces"
    }

    fn platform(&self) -> Platform {
        Platform::CiscoIos
    }

    fn register(&self, registry: &mut HandlerRegistry) {
        registry.add_list_reader(INTERFACES, InterfaceListReader);
        registry.add_reader(INTERFACE_CONFIG, InterfaceConfigHandler);
        registry.add_writer(INTERFACE_CONFIG, InterfaceConfigHandler);
        registry.add_list_reader(IPV4_ADDRESSES, Ipv4AddressListReader);
        registry.add_reader(IPV4_ADDRESS_CONFIG, Ipv4AddressConfigHandler);
        registry.add_writer(IPV4_ADDRESS_CONFIG, Ipv4AddressConfigHandler);
    }
}

/// BGP global configuration
pub struct IosBgpUnit;

impl TranslateUnit for IosBgpUnit {
    fn name(&self) -> &'static str {
        "ios-bgp"
    }

    fn platform(&self) -> Platform {
        Platform::CiscoIos
    }

    fn register(&self, registry: &mut HandlerRegistry) {
        registry.add_reader(BGP_GLOBAL_CONFIG, BgpGlobalConfigHandler);
        registry.add_writer(BGP_GLOBAL_CONFIG, BgpGlobalConfigHandler);
    }
}
