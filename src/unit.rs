//! Translation unit framework
//!
//! This module provides the handler traits, transaction contexts and
//! registries. A translation unit bundles the readers and writers of one
//! platform; each handler is registered under the schema path it serves.
//!
//! Handlers work on typed records. The registry erases them to
//! `serde_json::Value` so any handler can be driven by path alone.

use crate::device::Device;
use crate::error::{Error, Result};
use crate::path::ConfigPath;
use crate::platform::Platform;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

// ============================================================================
// Transaction Contexts
// ============================================================================

/// Per-transaction read state: command output cache
#[derive(Debug, Default)]
pub struct ReadContext {
    cache: Mutex<IndexMap<String, String>>,
}

impl ReadContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached output for a command
    pub fn cached(&self, command: &str) -> Option<String> {
        self.cache.lock().get(command).cloned()
    }

    /// Remember output for a command
    pub fn store(&self, command: &str, output: String) {
        self.cache.lock().insert(command.to_string(), output);
    }

    /// Commands with cached output, in the order first run
    pub fn cached_commands(&self) -> Vec<String> {
        self.cache.lock().keys().cloned().collect()
    }

    /// Drop all cached output
    pub fn invalidate(&self) {
        self.cache.lock().clear();
    }
}

/// Per-transaction write state
#[derive(Debug, Default)]
pub struct WriteContext {
    check_mode: bool,
    sent: Mutex<Vec<String>>,
}

impl WriteContext {
    /// Context that sends configuration to the device
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that only records configuration (dry run)
    pub fn check() -> Self {
        Self {
            check_mode: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Whether configuration is recorded but not sent
    pub fn is_check_mode(&self) -> bool {
        self.check_mode
    }

    /// Record a configuration block
    pub fn record(&self, block: String) {
        self.sent.lock().push(block);
    }

    /// Configuration blocks produced so far, in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

// ============================================================================
// Handler Traits
// ============================================================================

/// Parses device output into a record
#[async_trait]
pub trait Reader: Send + Sync {
    /// Record type produced
    type Data: Serialize + Send + Sync;

    /// Read the node at `path`; `None` when it does not exist on the device
    async fn read(
        &self,
        path: &ConfigPath,
        device: &Device,
        ctx: &ReadContext,
    ) -> Result<Option<Self::Data>>;
}

/// Enumerates the keys of a list node
#[async_trait]
pub trait ListReader: Send + Sync {
    /// Name of the list key, e.g. `name`
    fn key_name(&self) -> &'static str;

    /// All keys present on the device
    async fn all_keys(
        &self,
        path: &ConfigPath,
        device: &Device,
        ctx: &ReadContext,
    ) -> Result<Vec<String>>;
}

/// Renders record changes into configuration commands
#[async_trait]
pub trait Writer: Send + Sync {
    /// Record type consumed
    type Data: DeserializeOwned + PartialEq + Send + Sync;

    /// Fields a record must carry before any command can be rendered
    fn required_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Create the node
    async fn write(
        &self,
        path: &ConfigPath,
        data: &Self::Data,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()>;

    /// Change the node; writes `after` over the existing state by default
    async fn update(
        &self,
        path: &ConfigPath,
        _before: &Self::Data,
        after: &Self::Data,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()> {
        self.write(path, after, device, ctx).await
    }

    /// Remove the node
    async fn delete(
        &self,
        path: &ConfigPath,
        data: &Self::Data,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()>;
}

// ============================================================================
// Type-erased Handlers
// ============================================================================

/// A [`Reader`] producing JSON values
#[async_trait]
pub trait DynReader: Send + Sync {
    /// Read the node as a JSON value
    async fn read_value(
        &self,
        path: &ConfigPath,
        device: &Device,
        ctx: &ReadContext,
    ) -> Result<Option<Value>>;
}

#[async_trait]
impl<R: Reader> DynReader for R {
    async fn read_value(
        &self,
        path: &ConfigPath,
        device: &Device,
        ctx: &ReadContext,
    ) -> Result<Option<Value>> {
        match self.read(path, device, ctx).await? {
            Some(data) => Ok(Some(serde_json::to_value(data)?)),
            None => Ok(None),
        }
    }
}

/// A [`Writer`] driven by JSON values
#[async_trait]
pub trait DynWriter: Send + Sync {
    /// Dispatch a change: create when only `after` is given, delete when only
    /// `before` is given, update when both differ, nothing otherwise
    async fn apply(
        &self,
        path: &ConfigPath,
        before: Option<&Value>,
        after: Option<&Value>,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()>;
}

fn decode<T: DeserializeOwned>(path: &ConfigPath, value: &Value, required: &[&str]) -> Result<T> {
    if let Some(record) = value.as_object() {
        if let Some(field) = required
            .iter()
            .find(|f| record.get(**f).map_or(true, Value::is_null))
        {
            return Err(Error::missing_field(path.to_string(), *field));
        }
    }
    serde_json::from_value(value.clone()).map_err(|e| Error::invalid_data(path.to_string(), e.to_string()))
}

#[async_trait]
impl<W: Writer> DynWriter for W {
    async fn apply(
        &self,
        path: &ConfigPath,
        before: Option<&Value>,
        after: Option<&Value>,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()> {
        match (before, after) {
            (None, None) => Ok(()),
            (None, Some(after)) => {
                let after: W::Data = decode(path, after, self.required_fields())?;
                self.write(path, &after, device, ctx).await
            }
            (Some(before), None) => {
                let before: W::Data = decode(path, before, self.required_fields())?;
                self.delete(path, &before, device, ctx).await
            }
            (Some(before), Some(after)) => {
                let before: W::Data = decode(path, before, self.required_fields())?;
                let after: W::Data = decode(path, after, self.required_fields())?;
                if before == after {
                    trace!(path = %path, "Data unchanged, skipping update");
                    return Ok(());
                }
                self.update(path, &before, &after, device, ctx).await
            }
        }
    }
}

// ============================================================================
// Registries
// ============================================================================

/// Handlers registered for one schema path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandlerInfo {
    /// Schema path
    pub path: String,
    /// Handler kinds: reader, list reader, writer
    pub kinds: Vec<String>,
}

/// Handlers of one translation unit, keyed by schema path
#[derive(Default)]
pub struct HandlerRegistry {
    readers: IndexMap<String, Arc<dyn DynReader>>,
    list_readers: IndexMap<String, Arc<dyn ListReader>>,
    writers: IndexMap<String, Arc<dyn DynWriter>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("paths", &self.paths())
            .finish()
    }
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reader
    pub fn add_reader<R: Reader + 'static>(&mut self, path: &str, reader: R) {
        self.readers.insert(path.to_string(), Arc::new(reader));
    }

    /// Register a list reader
    pub fn add_list_reader<L: ListReader + 'static>(&mut self, path: &str, reader: L) {
        self.list_readers.insert(path.to_string(), Arc::new(reader));
    }

    /// Register a writer
    pub fn add_writer<W: Writer + 'static>(&mut self, path: &str, writer: W) {
        self.writers.insert(path.to_string(), Arc::new(writer));
    }

    /// Reader for a schema path
    pub fn reader(&self, path: &str) -> Option<Arc<dyn DynReader>> {
        self.readers.get(path).cloned()
    }

    /// List reader for a schema path
    pub fn list_reader(&self, path: &str) -> Option<Arc<dyn ListReader>> {
        self.list_readers.get(path).cloned()
    }

    /// Writer for a schema path
    pub fn writer(&self, path: &str) -> Option<Arc<dyn DynWriter>> {
        self.writers.get(path).cloned()
    }

    /// All schema paths with a handler, in registration order
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for path in self
            .list_readers
            .keys()
            .chain(self.readers.keys())
            .chain(self.writers.keys())
        {
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
        paths
    }

    /// Handler kinds per schema path
    pub fn handlers(&self) -> Vec<HandlerInfo> {
        self.paths()
            .into_iter()
            .map(|path| {
                let mut kinds = Vec::new();
                if self.list_readers.contains_key(&path) {
                    kinds.push("list".to_string());
                }
                if self.readers.contains_key(&path) {
                    kinds.push("reader".to_string());
                }
                if self.writers.contains_key(&path) {
                    kinds.push("writer".to_string());
                }
                HandlerInfo { path, kinds }
            })
            .collect()
    }
}

/// A named bundle of handlers for one platform
pub trait TranslateUnit: Send + Sync {
    /// Unit name
    fn name(&self) -> &'static str;

    /// Platform the unit serves
    fn platform(&self) -> Platform;

    /// Register the unit's handlers
    fn register(&self, registry: &mut HandlerRegistry);
}

/// A unit with its handlers
#[derive(Debug)]
pub struct RegisteredUnit {
    name: String,
    platform: Platform,
    handlers: HandlerRegistry,
}

impl RegisteredUnit {
    /// Unit name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Platform the unit serves
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The unit's handlers
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }
}

/// Registry of translation units, looked up by platform and schema path
#[derive(Debug, Default)]
pub struct UnitRegistry {
    units: Vec<RegisteredUnit>,
}

impl UnitRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in units
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for unit in crate::units::builtin_units() {
            registry.register(unit);
        }
        registry
    }

    /// Register a unit
    pub fn register(&mut self, unit: Arc<dyn TranslateUnit>) {
        let mut handlers = HandlerRegistry::new();
        unit.register(&mut handlers);
        debug!(
            unit = unit.name(),
            platform = %unit.platform(),
            paths = handlers.paths().len(),
            "Registered translation unit"
        );
        self.units.push(RegisteredUnit {
            name: unit.name().to_string(),
            platform: unit.platform(),
            handlers,
        });
    }

    /// Registered units, in registration order
    pub fn units(&self) -> &[RegisteredUnit] {
        &self.units
    }

    /// Schema paths served for a platform
    pub fn paths(&self, platform: Platform) -> Vec<String> {
        let mut paths = Vec::new();
        for unit in self.units_for(platform) {
            for path in unit.handlers.paths() {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        paths
    }

    /// Units serving a platform; generic devices use the IOS units
    fn units_for(&self, platform: Platform) -> impl Iterator<Item = &RegisteredUnit> {
        let effective = match platform {
            Platform::Generic if !self.units.iter().any(|u| u.platform == Platform::Generic) => {
                Platform::CiscoIos
            }
            other => other,
        };
        self.units.iter().filter(move |u| u.platform == effective)
    }

    fn find<T>(
        &self,
        kind: &'static str,
        path: &ConfigPath,
        platform: Platform,
        pick: impl Fn(&HandlerRegistry, &str) -> Option<T>,
    ) -> Result<T> {
        let schema = path.schema();
        self.units_for(platform)
            .find_map(|u| pick(&u.handlers, &schema))
            .ok_or_else(|| Error::HandlerNotFound {
                kind,
                path: schema,
                platform: platform.to_string(),
            })
    }

    /// Read the node at `path`
    pub async fn read(
        &self,
        path: &ConfigPath,
        device: &Device,
        ctx: &ReadContext,
    ) -> Result<Option<Value>> {
        let reader = self.find("reader", path, device.platform(), HandlerRegistry::reader)?;
        debug!(host = device.hostname(), path = %path, "Reading");
        reader.read_value(path, device, ctx).await
    }

    /// List the keys of the list node at `path`, returning full entry paths
    pub async fn list(
        &self,
        path: &ConfigPath,
        device: &Device,
        ctx: &ReadContext,
    ) -> Result<Vec<ConfigPath>> {
        let reader = self.find(
            "list reader",
            path,
            device.platform(),
            HandlerRegistry::list_reader,
        )?;
        debug!(host = device.hostname(), path = %path, "Listing");
        let keys = reader.all_keys(path, device, ctx).await?;
        Ok(keys
            .iter()
            .map(|k| path.with_key(reader.key_name(), k))
            .collect())
    }

    /// Apply a change to the node at `path`
    pub async fn write(
        &self,
        path: &ConfigPath,
        before: Option<&Value>,
        after: Option<&Value>,
        device: &Device,
        ctx: &WriteContext,
    ) -> Result<()> {
        let writer = self.find("writer", path, device.platform(), HandlerRegistry::writer)?;
        debug!(host = device.hostname(), path = %path, "Writing");
        writer.apply(path, before, after, device, ctx).await
    }
}
