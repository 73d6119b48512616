//! Device platforms and their CLI dialects
//!
//! A dialect knows how a platform enters and leaves configuration mode,
//! how changes are committed, and what error output looks like.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Platform Types
// ============================================================================

/// Supported device platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Cisco IOS/IOS-XE
    #[serde(alias = "cisco_ios", alias = "ios")]
    CiscoIos,
    /// Cisco IOS-XR
    #[serde(alias = "cisco_iosxr", alias = "iosxr")]
    CiscoIosXr,
    /// Juniper Junos
    #[serde(alias = "juniper_junos", alias = "junos")]
    JuniperJunos,
    /// Huawei VRP
    #[serde(alias = "vrp")]
    Huawei,
    /// Generic platform (IOS-like command set)
    #[default]
    Generic,
}

impl Platform {
    /// All platforms, in display order
    pub const ALL: [Platform; 5] = [
        Platform::CiscoIos,
        Platform::CiscoIosXr,
        Platform::JuniperJunos,
        Platform::Huawei,
        Platform::Generic,
    ];

    /// The CLI dialect for this platform
    pub fn dialect(&self) -> Box<dyn Dialect> {
        match self {
            Platform::CiscoIos | Platform::Generic => Box::new(IosDialect),
            Platform::CiscoIosXr => Box::new(IosXrDialect),
            Platform::JuniperJunos => Box::new(JunosDialect),
            Platform::Huawei => Box::new(HuaweiDialect),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::CiscoIos => write!(f, "cisco_ios"),
            Platform::CiscoIosXr => write!(f, "cisco_iosxr"),
            Platform::JuniperJunos => write!(f, "juniper_junos"),
            Platform::Huawei => write!(f, "huawei"),
            Platform::Generic => write!(f, "generic"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "cisco_ios" | "ciscoios" | "ios" | "ios_xe" | "iosxe" => Ok(Platform::CiscoIos),
            "cisco_iosxr" | "ciscoiosxr" | "iosxr" | "ios_xr" => Ok(Platform::CiscoIosXr),
            "juniper_junos" | "juniperjunos" | "junos" | "juniper" => Ok(Platform::JuniperJunos),
            "huawei" | "vrp" => Ok(Platform::Huawei),
            "generic" | "auto" => Ok(Platform::Generic),
            _ => Err(Error::InvalidArgument(format!(
                "Unknown platform: {}. Valid options: cisco_ios, cisco_iosxr, juniper_junos, huawei, generic",
                s
            ))),
        }
    }
}

// ============================================================================
// Dialects
// ============================================================================

/// Platform-specific command conventions
pub trait Dialect: Send + Sync {
    /// Commands sent once per session (disable paging and the like)
    fn prepare_session(&self) -> Vec<String>;

    /// Commands entering configuration mode
    fn enter_config_mode(&self) -> Vec<String>;

    /// Commands making staged changes take effect; empty when changes apply immediately
    fn commit(&self) -> Vec<String> {
        Vec::new()
    }

    /// Commands leaving configuration mode
    fn exit_config_mode(&self) -> Vec<String>;

    /// Command showing the running configuration
    fn show_running_config(&self) -> String;

    /// Substrings marking a line of device output as an error
    fn error_patterns(&self) -> &'static [&'static str];

    /// Wrap configuration lines into a complete configuration block
    fn wrap_config(&self, lines: &[String]) -> Vec<String> {
        let mut commands = self.enter_config_mode();
        commands.extend(lines.iter().cloned());
        commands.extend(self.commit());
        commands.extend(self.exit_config_mode());
        commands
    }

    /// First line of `output` reporting an error, if any.
    ///
    /// Error markers only count at the start of a line, so configuration
    /// text that quotes one (a description, say) is not an error.
    fn detect_error(&self, output: &str) -> Option<String> {
        let patterns = self.error_patterns();
        output
            .lines()
            .map(str::trim)
            .find(|line| patterns.iter().any(|p| line.starts_with(p)))
            .map(str::to_string)
    }
}

const IOS_ERRORS: &[&str] = &[
    "% Invalid input",
    "% Incomplete command",
    "% Ambiguous command",
    "% Unknown command",
];

/// Cisco IOS / IOS-XE dialect
pub struct IosDialect;

impl Dialect for IosDialect {
    fn prepare_session(&self) -> Vec<String> {
        vec![
            "terminal length 0".to_string(),
            "terminal width 512".to_string(),
        ]
    }

    fn enter_config_mode(&self) -> Vec<String> {
        vec!["configure terminal".to_string()]
    }

    fn exit_config_mode(&self) -> Vec<String> {
        vec!["end".to_string()]
    }

    fn show_running_config(&self) -> String {
        "show running-config".to_string()
    }

    fn error_patterns(&self) -> &'static [&'static str] {
        IOS_ERRORS
    }
}

/// Cisco IOS-XR dialect; changes are staged until `commit`
pub struct IosXrDialect;

impl Dialect for IosXrDialect {
    fn prepare_session(&self) -> Vec<String> {
        vec!["terminal length 0".to_string()]
    }

    fn enter_config_mode(&self) -> Vec<String> {
        vec!["configure terminal".to_string()]
    }

    fn commit(&self) -> Vec<String> {
        vec!["commit".to_string()]
    }

    fn exit_config_mode(&self) -> Vec<String> {
        vec!["end".to_string()]
    }

    fn show_running_config(&self) -> String {
        "show running-config".to_string()
    }

    fn error_patterns(&self) -> &'static [&'static str] {
        &[
            "% Invalid input",
            "% Incomplete command",
            "% Ambiguous command",
            "% Unknown command",
            "% Failed to commit",
        ]
    }
}

/// Juniper Junos dialect
pub struct JunosDialect;

impl Dialect for JunosDialect {
    fn prepare_session(&self) -> Vec<String> {
        vec!["set cli screen-length 0".to_string()]
    }

    fn enter_config_mode(&self) -> Vec<String> {
        vec!["configure".to_string()]
    }

    fn commit(&self) -> Vec<String> {
        vec!["commit".to_string()]
    }

    fn exit_config_mode(&self) -> Vec<String> {
        vec!["exit".to_string()]
    }

    fn show_running_config(&self) -> String {
        "show configuration | display set".to_string()
    }

    fn error_patterns(&self) -> &'static [&'static str] {
        &["error:", "syntax error", "unknown command"]
    }
}

/// Huawei VRP dialect
pub struct HuaweiDialect;

impl Dialect for HuaweiDialect {
    fn prepare_session(&self) -> Vec<String> {
        vec!["screen-length 0 temporary".to_string()]
    }

    fn enter_config_mode(&self) -> Vec<String> {
        vec!["system-view".to_string()]
    }

    fn exit_config_mode(&self) -> Vec<String> {
        vec!["return".to_string()]
    }

    fn show_running_config(&self) -> String {
        "display current-configuration".to_string()
    }

    fn error_patterns(&self) -> &'static [&'static str] {
        &["Error:", "Unrecognized command"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platform() {
        assert_eq!("cisco_ios".parse::<Platform>().unwrap(), Platform::CiscoIos);
        assert_eq!("ios-xe".parse::<Platform>().unwrap(), Platform::CiscoIos);
        assert_eq!("IOS-XR".parse::<Platform>().unwrap(), Platform::CiscoIosXr);
        assert_eq!("junos".parse::<Platform>().unwrap(), Platform::JuniperJunos);
        assert_eq!("vrp".parse::<Platform>().unwrap(), Platform::Huawei);
        assert!("nxos".parse::<Platform>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for platform in Platform::ALL {
            assert_eq!(platform.to_string().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let value = serde_json::to_value(Platform::CiscoIosXr).unwrap();
        assert_eq!(value, serde_json::json!("ciscoiosxr"));
        let back: Platform = serde_json::from_value(serde_json::json!("juniperjunos")).unwrap();
        assert_eq!(back, Platform::JuniperJunos);
        let back: Platform = serde_json::from_value(serde_json::json!("cisco_ios")).unwrap();
        assert_eq!(back, Platform::CiscoIos);
    }

    #[test]
    fn test_wrap_config() {
        let lines = vec!["interface Loopback0".to_string(), "description x".to_string()];
        assert_eq!(
            Platform::CiscoIos.dialect().wrap_config(&lines),
            vec!["configure terminal", "interface Loopback0", "description x", "end"]
        );
        assert_eq!(
            Platform::CiscoIosXr.dialect().wrap_config(&lines),
            vec![
                "configure terminal",
                "interface Loopback0",
                "description x",
                "commit",
                "end"
            ]
        );
        let junos = Platform::JuniperJunos.dialect();
        assert_eq!(junos.wrap_config(&[])[0], "configure");
        assert_eq!(
            Platform::Huawei.dialect().wrap_config(&lines).last().unwrap(),
            "return"
        );
    }

    #[test]
    fn test_detect_error() {
        let ios = Platform::CiscoIos.dialect();
        let output = "R1(config)#mtu 99999\n% Invalid input detected at '^' marker.\nR1(config)#";
        assert_eq!(
            ios.detect_error(output).as_deref(),
            Some("% Invalid input detected at '^' marker.")
        );
        assert!(ios.detect_error("R1(config)#description ok").is_none());

        let xr = Platform::CiscoIosXr.dialect();
        assert!(xr.detect_error("% Failed to commit one or more configuration items").is_some());
        assert!(ios.detect_error("% Failed to commit").is_none());

        let junos = Platform::JuniperJunos.dialect();
        assert!(junos.detect_error("syntax error, expecting <data>").is_some());
        assert!(junos
            .detect_error("set interfaces ge-0/0/3 description \"error: crc on link\"")
            .is_none());
        assert!(ios
            .detect_error("interface Gi0/1\n description % Invalid input seen upstream")
            .is_none());

        let huawei = Platform::Huawei.dialect();
        assert!(huawei.detect_error("Error: Unrecognized command found at '^' position.").is_some());
    }
}
