//! Configuration tree paths.
//!
//! A path addresses one node of the configuration tree, with list entries
//! selected by key: `/interfaces/interface[name=GigabitEthernet0/1]/config`.
//! Handlers are registered by the key-less schema form of the path.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One path element with its list keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    /// Element name
    pub name: String,
    /// List keys, in the order written
    pub keys: Vec<(String, String)>,
}

impl PathSegment {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: Vec::new(),
        }
    }
}

/// Address of a configuration tree node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ConfigPath {
    segments: Vec<PathSegment>,
}

impl ConfigPath {
    /// Parse a path string
    pub fn parse(path: &str) -> Result<Self> {
        path.parse()
    }

    /// Path elements
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The path with all list keys removed
    pub fn schema(&self) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            out.push('/');
            out.push_str(&seg.name);
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }

    /// Value of the nearest (rightmost) key with this name
    pub fn key(&self, name: &str) -> Option<&str> {
        self.segments
            .iter()
            .rev()
            .flat_map(|s| s.keys.iter())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a key on the nearest element called `segment`
    pub fn segment_key(&self, segment: &str, name: &str) -> Option<&str> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.name == segment)?
            .keys
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`key`](Self::key), failing when the key is absent
    pub fn require_key(&self, name: &str) -> Result<&str> {
        self.key(name).ok_or_else(|| {
            Error::InvalidArgument(format!("path '{}' has no '{}' key", self, name))
        })
    }

    /// Append a child element
    pub fn child(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::new(name));
        next
    }

    /// Set a key on the last element
    pub fn with_key(&self, name: &str, value: &str) -> Self {
        let mut next = self.clone();
        if let Some(last) = next.segments.last_mut() {
            match last.keys.iter_mut().find(|(k, _)| k == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => last.keys.push((name.to_string(), value.to_string())),
            }
        }
        next
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for seg in &self.segments {
            write!(f, "/{}", seg.name)?;
            for (k, v) in &seg.keys {
                write!(f, "[{}={}]", k, v)?;
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |msg: &str| Error::InvalidArgument(format!("invalid path '{}': {}", s, msg));

        let body = s
            .trim()
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;

        let mut segments = Vec::new();
        let mut current: Option<PathSegment> = None;
        let mut name = String::new();
        let mut chars = body.chars();

        while let Some(c) = chars.next() {
            match c {
                '/' => {
                    let seg = current.take().unwrap_or_else(|| PathSegment::new(&name));
                    if seg.name.is_empty() {
                        return Err(invalid("empty element"));
                    }
                    segments.push(seg);
                    name.clear();
                }
                '[' => {
                    // Key values may contain '/', so read up to the closing bracket.
                    let mut key = String::new();
                    let mut closed = false;
                    for k in chars.by_ref() {
                        if k == ']' {
                            closed = true;
                            break;
                        }
                        key.push(k);
                    }
                    if !closed {
                        return Err(invalid("unclosed '['"));
                    }
                    let (k, v) = key
                        .split_once('=')
                        .ok_or_else(|| invalid("key must be name=value"))?;
                    let seg = current.get_or_insert_with(|| PathSegment::new(&name));
                    if seg.name.is_empty() {
                        return Err(invalid("key without element"));
                    }
                    seg.keys.push((k.trim().to_string(), v.trim().to_string()));
                }
                _ if current.is_some() => {
                    return Err(invalid("unexpected text after key"));
                }
                _ => name.push(c),
            }
        }

        match current {
            Some(seg) => segments.push(seg),
            None if !name.is_empty() => segments.push(PathSegment::new(name)),
            None if segments.is_empty() => {}
            None => return Err(invalid("trailing '/'")),
        }

        Ok(Self { segments })
    }
}

impl Serialize for ConfigPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConfigPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
