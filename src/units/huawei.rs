//! Huawei VRP translation units

use super::model::InterfaceConfig;
use super::{ensure_virtual, interface_key, mtu_field, INTERFACES, INTERFACE_CONFIG};
use crate::config_tree::section_text;
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

const SH_INTERFACES: &str = "display current-configuration | include ^interface";

static INTERFACE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^interface (?P<name>\S+)").expect("Invalid interface line regex")
});

static INTERFACE_PARSER: Lazy<OutputParser> = Lazy::new(|| {
    OutputParser::new(vec![
        ParseRule::new("description", r"description (?P<value>.+)"),
        ParseRule::new("mtu", r"mtu (?P<value>\d+)").with_kind(FieldKind::Integer),
        ParseRule::flag("enabled", "shutdown").negated(),
    ])
    .expect("Invalid interface parse rules")
});

/// Interface configuration from `display current-configuration interface <name>`
pub fn parse_interface_config(
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

/// Commands turning `before` into `after`, using `undo` to remove settings
pub fn interface_commands(before: Option<&InterfaceConfig>, after: &InterfaceConfig) -> Vec<String> {
    let mut commands = vec![format!("interface {}", after.name)];

    match (before.and_then(|b| b.description.as_deref()), after.description.as_deref()) {
        (old, Some(new)) if old != Some(new) => commands.push(format!("description {}", new)),
        (Some(_), None) => commands.push("undo description".to_string()),
        _ => {}
    }

    match (before.and_then(|b| b.mtu), after.mtu) {
        (old, Some(new)) if old != Some(new) => commands.push(format!("mtu {}", new)),
        (Some(_), None) => commands.push("undo mtu".to_string()),
        _ => {}
    }

    if before.map_or(true, |b| b.enabled != after.enabled) {
        commands.push(if after.enabled {
            "undo shutdown".to_string()
        } else {
            "shutdown".to_string()
        });
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
        Ok(parse_fields(&output, 0, &INTERFACE_LINE, |c| {
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
        let output = device
            .show(&format!("display current-configuration interface {}", name), ctx)
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
            .apply(path, &[format!("undo interface {}", name)], ctx)
            .await?;
        Ok(())
    }
}

/// Interfaces
pub struct HuaweiInterfaceUnit;

impl TranslateUnit for HuaweiInterfaceUnit {
    fn name(&self) -> &'static str {
        "huawei-interfaces"
    }

    fn platform(&self) -> Platform {
        Platform::Huawei
    }

    fn register(&self, registry: &mut HandlerRegistry) {
        registry.add_list_reader(INTERFACES, InterfaceListReader);
        registry.add_reader(INTERFACE_CONFIG, InterfaceConfigHandler);
        registry.add_writer(INTERFACE_CONFIG, InterfaceConfigHandler);
    }
}
