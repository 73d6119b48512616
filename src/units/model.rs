//! Structured records exchanged by the vendor handlers.
//!
//! These are the per-handler DTOs: built by a reader from device output,
//! consumed by a writer to render commands, never kept between calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Interface type, inferred from the interface name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InterfaceKind {
    /// Physical Ethernet port
    EthernetCsmacd,
    /// Loopback interface
    SoftwareLoopback,
    /// Tunnel interface
    Tunnel,
    /// Routed VLAN interface (SVI, BDI, irb, Vlanif)
    L3Ipvlan,
    /// Anything else
    #[default]
    Other,
}

impl InterfaceKind {
    /// Infer the type from a vendor interface name
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.starts_with("loopback") || lower.starts_with("lo0") {
            InterfaceKind::SoftwareLoopback
        } else if lower.starts_with("tunnel") || lower.starts_with("tun") {
            InterfaceKind::Tunnel
        } else if lower.starts_with("vlan") || lower.starts_with("bdi") || lower.starts_with("irb")
        {
            InterfaceKind::L3Ipvlan
        } else if is_ethernet_name(&lower) {
            InterfaceKind::EthernetCsmacd
        } else {
            InterfaceKind::Other
        }
    }

    /// Physical interfaces exist on the device and cannot be created or removed
    pub fn is_physical(self) -> bool {
        matches!(self, InterfaceKind::EthernetCsmacd)
    }
}

/// Physical port names: long and short Cisco forms, Junos `xx-` ports and
/// Huawei speed-prefixed names such as `GE1/0/0` or `100GE2/0/1`
fn is_ethernet_name(lower: &str) -> bool {
    const PREFIXES: &[&str] = &["ge-", "xe-", "et-", "fe-", "gi", "te", "fa", "hu", "fo", "twe"];
    if lower.contains("ethernet")
        || lower.contains("gige")
        || PREFIXES.iter().any(|p| lower.starts_with(p))
    {
        return true;
    }
    let rest = lower.trim_start_matches(|c: char| c.is_ascii_digit());
    ["ge", "xge", "multige", "eth"].iter().any(|p| {
        rest.strip_prefix(p)
            .is_some_and(|r| r.starts_with(|c: char| c.is_ascii_digit()))
    })
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceKind::EthernetCsmacd => write!(f, "ethernet-csmacd"),
            InterfaceKind::SoftwareLoopback => write!(f, "software-loopback"),
            InterfaceKind::Tunnel => write!(f, "tunnel"),
            InterfaceKind::L3Ipvlan => write!(f, "l3-ipvlan"),
            InterfaceKind::Other => write!(f, "other"),
        }
    }
}

/// Interface configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    /// Interface name as the device spells it
    pub name: String,
    /// Interface type
    #[serde(rename = "type", default)]
    pub kind: InterfaceKind,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Layer 3 MTU
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
    /// Administrative state
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl InterfaceConfig {
    /// Create a config with the type inferred from the name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: InterfaceKind::from_name(&name),
            name,
            description: None,
            mtu: None,
            enabled: true,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the MTU
    pub fn with_mtu(mut self, mtu: u16) -> Self {
        self.mtu = Some(mtu);
        self
    }

    /// Set the administrative state
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// IPv4 address with prefix length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Address {
    /// Address
    pub ip: Ipv4Addr,
    /// Prefix length (0-32)
    pub prefix_length: u8,
}

impl Ipv4Address {
    /// Build from an address and dotted netmask, as IOS prints them
    pub fn from_netmask(ip: &str, mask: &str) -> Option<Self> {
        let ip = ip.parse().ok()?;
        let prefix_length = prefix_from_netmask(mask)? as u8;
        Some(Self { ip, prefix_length })
    }

    /// Dotted netmask for this prefix length
    pub fn netmask(&self) -> Ipv4Addr {
        netmask_from_prefix(u32::from(self.prefix_length)).unwrap_or(Ipv4Addr::BROADCAST)
    }
}

impl fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix_length)
    }
}

impl std::str::FromStr for Ipv4Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ip, prefix) = s
            .split_once('/')
            .ok_or_else(|| format!("'{}' is not in address/prefix form", s))?;
        let ip = ip
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", ip, e))?;
        let prefix_length: u8 = prefix
            .parse()
            .map_err(|e| format!("invalid prefix '{}': {}", prefix, e))?;
        if prefix_length > 32 {
            return Err(format!("prefix length {} out of range", prefix_length));
        }
        Ok(Self { ip, prefix_length })
    }
}

/// BGP global configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpGlobalConfig {
    /// Local autonomous system number
    #[serde(rename = "as")]
    pub asn: u32,
    /// Router identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_id: Option<Ipv4Addr>,
}

/// Netmask for a prefix length, `None` above 32
pub fn netmask_from_prefix(prefix: u32) -> Option<Ipv4Addr> {
    match prefix {
        0 => Some(Ipv4Addr::UNSPECIFIED),
        1..=32 => Some(Ipv4Addr::from(u32::MAX << (32 - prefix))),
        _ => None,
    }
}

/// Inverse (wildcard) mask for a prefix length
pub fn wildcard_from_prefix(prefix: u32) -> Option<Ipv4Addr> {
    netmask_from_prefix(prefix).map(|m| Ipv4Addr::from(!u32::from(m)))
}

/// Prefix length for a dotted netmask; `None` for non-contiguous masks
pub fn prefix_from_netmask(mask: &str) -> Option<u32> {
    let bits = u32::from(mask.trim().parse::<Ipv4Addr>().ok()?);
    let ones = bits.leading_ones();
    (bits.checked_shl(ones).unwrap_or(0) == 0).then_some(ones)
}
