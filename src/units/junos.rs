//! Juniper Junos translation units
//!
//! Junos configuration is read in `display set` form, one `set` statement
//! per line, and written back as `set` / `delete` statements.

use super::model::InterfaceConfig;
use super::{ensure_virtual, interface_key, mtu_field, INTERFACES, INTERFACE_CONFIG};
use crate::config_tree::junos_set_lines;
use crate::device::Device;
use crate::error::Result;
use crate::parser::{parse_fields, FieldKind, OutputParser, ParseRule};
use crate::path::ConfigPath;
use crate::platform::Platform;
use crate::unit::{HandlerRegistry, ListReader, ReadContext, Reader, TranslateUnit, WriteContext, Writer};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const SH_INTERFACES: &str = "show configuration interfaces | display set";

static SET_INTERFACE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^set interfaces (?P<name>\S+)").expect("Invalid set interfaces regex")
});

static INTERFACE_PARSER: Lazy<OutputParser> = Lazy::new(|| {
    OutputParser::new(vec![
        ParseRule::new("description", r"description (?P<value>.+)"),
        ParseRule::new("mtu", r"mtu (?P<value>\d+)").with_kind(FieldKind::Integer),
        ParseRule::flag("enabled", "disable").negated(),
    ])
    .expect("Invalid interface parse rules")
});

/// Quote a value for a `set` statement when it contains whitespace or quotes
fn quoted(value: &str) -> String {
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\') {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Inverse of [`quoted`]
fn unquoted(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Interface configuration from `display set` output; `None` without any statement
pub fn parse_interface_config(
    path: &ConfigPath,
    name: &str,
    output: &str,
) -> Result<Option<InterfaceConfig>> {
    let lines = junos_set_lines(output, &format!("interfaces {}", name));
    if lines.is_empty() {
        return Ok(None);
    }
    let record = INTERFACE_PARSER.parse(&lines.join("\n"))?;

    let mut config = InterfaceConfig::new(name);
    config.description = record
        .get("description")
        .and_then(Value::as_str)
        .map(unquoted);
    config.mtu = mtu_field(path, record.get("mtu"))?;
    config.enabled = record
        .get("enabled")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    Ok(Some(config))
}

/// `set` / `delete` statements turning `before` into `after`
pub fn interface_commands(before: Option<&InterfaceConfig>, after: &InterfaceConfig) -> Vec<String> {
    let prefix = format!("interfaces {}", after.name);
    let mut commands = Vec::new();

    match (before.and_then(|b| b.description.as_deref()), after.description.as_deref()) {
        (old, Some(new)) if old != Some(new) => {
            commands.push(format!("set {} description {}", prefix, quoted(new)))
        }
        (Some(_), None) => commands.push(format!("delete {} description", prefix)),
        _ => {}
    }

    match (before.and_then(|b| b.mtu), after.mtu) {
        (old, Some(new)) if old != Some(new) => {
            commands.push(format!("set {} mtu {}", prefix, new))
        }
        (Some(_), None) => commands.push(format!("delete {} mtu", prefix)),
        _ => {}
    }

    let was_enabled = before.map(|b| b.enabled).unwrap_or(true);
    match (was_enabled, after.enabled) {
        (true, false) => commands.push(format!("set {} disable", prefix)),
        (false, true) => commands.push(format!("delete {} disable", prefix)),
        _ => {}
    }

    if commands.is_empty() && before.is_none() {
        // An interface with nothing configured still needs a statement to exist.
        commands.push(format!("set {}", prefix));
    }
    commands
}

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
        Ok(parse_fields(&output, 0, &SET_INTERFACE_LINE, |c| {
            c.name("name").map(|m| m.as_str().to_string())
        }))
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
        // Same command as the list reader, so the output comes from the cache.
        let output = device.show(SH_INTERFACES, ctx).await?;
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
        device.apply(path, &interface_commands(None, data), ctx).await?;
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
            .apply(path, &interface_commands(Some(before), after), ctx)
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
            .apply(path, &[format!("delete interfaces {}", name)], ctx)
            .await?;
        Ok(())
    }
}

/// Interfaces
pub struct JunosInterfaceUnit;

impl TranslateUnit for JunosInterfaceUnit {
    fn name(&self) -> &'static str {
        "junos-interfaces"
    }

    fn platform(&self) -> Platform {
        Platform::JuniperJunos
    }

    fn register(&self, registry: &mut HandlerRegistry) {
        registry.add_list_reader(INTERFACES, InterfaceListReader);
        registry.add_reader(INTERFACE_CONFIG, InterfaceConfigHandler);
        registry.add_writer(INTERFACE_CONFIG, InterfaceConfigHandler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DISPLAY_SET: &str = "\
set interfaces ge-0/0/3 description \"to core 1\"
set interfaces ge-0/0/3 mtu 9192
set interfaces ge-0/0/3 disable
set interfaces lo0 unit 0 family inet address 10.255.0.1/32
";

    fn path(name: &str) -> ConfigPath {
        ConfigPath::parse(INTERFACES)
            .unwrap()
            .with_key("name", name)
            .child("config")
    }

    #[test]
    fn test_parse_interface_config() {
        let config = parse_interface_config(&path("ge-0/0/3"), "ge-0/0/3", DISPLAY_SET)
            .unwrap()
            .unwrap();
        assert_eq!(
            config,
            InterfaceConfig::new("ge-0/0/3")
                .with_description("to core 1")
                .with_mtu(9192)
                .with_enabled(false)
        );

        let lo0 = parse_interface_config(&path("lo0"), "lo0", DISPLAY_SET)
            .unwrap()
            .unwrap();
        assert!(lo0.enabled);
        assert_eq!(lo0.description, None);

        assert!(parse_interface_config(&path("ge-0/0/9"), "ge-0/0/9", DISPLAY_SET)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_interface_commands() {
        let after = InterfaceConfig::new("lo0").with_description("router id");
        assert_eq!(
            interface_commands(None, &after),
            vec!["set interfaces lo0 description \"router id\""]
        );

        let before = InterfaceConfig::new("ge-0/0/3")
            .with_description("old")
            .with_mtu(1500)
            .with_enabled(false);
        let after = InterfaceConfig::new("ge-0/0/3").with_mtu(9192);
        assert_eq!(
            interface_commands(Some(&before), &after),
            vec![
                "delete interfaces ge-0/0/3 description",
                "set interfaces ge-0/0/3 mtu 9192",
                "delete interfaces ge-0/0/3 disable",
            ]
        );

        assert_eq!(
            interface_commands(None, &InterfaceConfig::new("lo0")),
            vec!["set interfaces lo0"]
        );
    }

    #[test]
    fn test_description_quoting_round_trip() {
        for text in ["uplink", "to core 1", r#"say "hi" to pe1"#, r"C:\path", "error: crc"] {
            let after = InterfaceConfig::new("ge-0/0/1").with_description(text);
            let output = interface_commands(None, &after).join("\n");
            let config = parse_interface_config(&path("ge-0/0/1"), "ge-0/0/1", &output)
                .unwrap()
                .unwrap();
            assert_eq!(config.description.as_deref(), Some(text), "{output}");
        }

        let after = InterfaceConfig::new("lo0").with_description(r#"a "b""#);
        assert_eq!(
            interface_commands(None, &after),
            vec![r#"set interfaces lo0 description "a \"b\"""#]
        );
    }
}
