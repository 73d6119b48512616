//! Cisco IOS-XR translation units
//!
//! IOS-XR shares the IOS running-config layout for interfaces; only the
//! IPv4 address syntax (`ipv4 address`) and the commit-based dialect differ.

use super::ios::{interface_commands, parse_interface_config, parse_interface_names, read_ipv4};
use super::model::{InterfaceConfig, Ipv4Address};
use super::{ensure_virtual, interface_key, INTERFACES, INTERFACE_CONFIG, IPV4_ADDRESS_CONFIG};
use crate::device::Device;
use crate::error::Result;
use crate::path::ConfigPath;
use crate::platform::Platform;
use crate::unit::{HandlerRegistry, ListReader, ReadContext, Reader, TranslateUnit, WriteContext, Writer};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

const SH_INTERFACES: &str = "show running-config interface | include ^interface";

static IPV4_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ipv4 address (?P<ip>\S+) (?P<mask>\S+)$").expect("Invalid ipv4 address regex")
});

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

/// Reads the primary IPv4 address
pub struct Ipv4AddressReader;

#[async_trait]
impl Reader for Ipv4AddressReader {
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

/// Interfaces and IPv4 addresses
pub struct IosXrInterfaceUnit;

impl TranslateUnit for IosXrInterfaceUnit {
    fn name(&self) -> &'static str {
        "iosxr-interfaces"
    }

    fn platform(&self) -> Platform {
        Platform::CiscoIosXr
    }

    fn register(&self, registry: &mut HandlerRegistry) {
        registry.add_list_reader(INTERFACES, InterfaceListReader);
        registry.add_reader(INTERFACE_CONFIG, InterfaceConfigHandler);
        registry.add_writer(INTERFACE_CONFIG, InterfaceConfigHandler);
        registry.add_reader(IPV4_ADDRESS_CONFIG, Ipv4AddressReader);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_tree::section_text;
    use crate::units::ios::parse_primary_ipv4;

    const XR_INTERFACE: &str = "\
Mon Oct  5 10:12:01.123 UTC
interface GigabitEthernet0/0/0/0
 description to-pe2
 mtu 9000
 ipv4 address 10.187.100.49 255.255.255.240
!
";

    #[test]
    fn test_parse_xr_interface() {
        let path = ConfigPath::parse("/interfaces/interface[name=GigabitEthernet0/0/0/0]/config")
            .unwrap();
        let config = parse_interface_config(&path, "GigabitEthernet0/0/0/0", XR_INTERFACE)
            .unwrap()
            .unwrap();
        assert_eq!(config.description.as_deref(), Some("to-pe2"));
        assert_eq!(config.mtu, Some(9000));
        assert!(config.enabled);
    }

    #[test]
    fn test_parse_xr_ipv4() {
        let section = section_text(XR_INTERFACE, "interface GigabitEthernet0/0/0/0").unwrap();
        let address = parse_primary_ipv4(&section, &IPV4_LINE).unwrap();
        assert_eq!(address.to_string(), "10.187.100.49/28");
    }
}
