//! Device output parsing.
//!
//! Readers turn `show` / `display` output into structured records by matching
//! regular expressions line by line. This module holds the building blocks
//! shared by every reader:
//!
//! - line-oriented helpers ([`parse_field`], [`parse_fields`],
//!   [`parse_non_distinct_fields`], [`contains_line`])
//! - block splitting for outputs that repeat a header per entry
//!   ([`split_blocks`])
//! - a declarative [`OutputParser`] built from ordered [`ParseRule`]s, which
//!   can also be loaded from YAML through [`ParserSpec`]
//!
//! All helpers trim each line before matching. Declarative rules must match
//! the whole trimmed line; the free functions use the regex as given.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::hash::Hash;
use std::path::Path;
use tracing::trace;

/// A parsed record: field name to value, in rule order
pub type Record = IndexMap<String, Value>;

/// Trimmed lines of `output`, skipping the first `skip` lines
fn trimmed_lines(output: &str, skip: usize) -> impl Iterator<Item = &str> {
    output.lines().skip(skip).map(str::trim)
}

/// Extract a value from the first line matching `re`.
///
/// Lines where `extract` returns `None` are skipped, so a pattern can match
/// loosely and leave validation to the extractor.
pub fn parse_field<T>(
    output: &str,
    skip: usize,
    re: &Regex,
    extract: impl Fn(&Captures<'_>) -> Option<T>,
) -> Option<T> {
    trimmed_lines(output, skip).find_map(|line| re.captures(line).and_then(|c| extract(&c)))
}

/// Extract values from every matching line, dropping duplicates but keeping
/// first-seen order.
pub fn parse_fields<T>(
    output: &str,
    skip: usize,
    re: &Regex,
    extract: impl Fn(&Captures<'_>) -> Option<T>,
) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    parse_non_distinct_fields(output, skip, re, extract)
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Extract values from every matching line, duplicates included
pub fn parse_non_distinct_fields<T>(
    output: &str,
    skip: usize,
    re: &Regex,
    extract: impl Fn(&Captures<'_>) -> Option<T>,
) -> Vec<T> {
    trimmed_lines(output, skip)
        .filter_map(|line| re.captures(line).and_then(|c| extract(&c)))
        .collect()
}

/// Whether any trimmed line matches `re`
pub fn contains_line(output: &str, re: &Regex) -> bool {
    trimmed_lines(output, 0).any(|line| re.is_match(line))
}

/// A block of output introduced by a header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// First capture group of the header (or the whole header line)
    pub key: String,
    /// The header line itself
    pub header: String,
    /// Header and body lines, as they appeared in the output
    pub text: String,
}

/// Split output into blocks that start at lines matching `header`.
///
/// Lines before the first header are dropped. The header is matched against
/// the trimmed line, so indented headers are found as well.
pub fn split_blocks(output: &str, header: &Regex) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();

    for line in output.lines() {
        if let Some(caps) = header.captures(line.trim()) {
            let key = caps
                .iter()
                .skip(1)
                .flatten()
                .next()
                .or_else(|| caps.get(0))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            blocks.push(Block {
                key,
                header: line.trim().to_string(),
                text: line.to_string(),
            });
        } else if let Some(block) = blocks.last_mut() {
            block.text.push('\n');
            block.text.push_str(line);
        }
    }

    blocks
}

// ============================================================================
// Declarative Rules
// ============================================================================

/// How a matched string becomes a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Keep the matched text (default)
    #[default]
    Text,
    /// Parse the matched text as a signed integer
    Integer,
    /// Presence of a matching line is the value
    Flag,
}

/// One extraction rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseRule {
    /// Record field the rule populates
    pub field: String,
    /// Pattern matched against whole trimmed lines
    pub pattern: String,
    /// Value conversion
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    /// Collect every matching line into an array
    #[serde(default)]
    pub multiple: bool,
    /// Invert a flag
    #[serde(default)]
    pub negate: bool,
    /// Value used when nothing matched
    #[serde(default)]
    pub default: Option<Value>,
}

impl ParseRule {
    /// Create a text rule
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
            kind: FieldKind::Text,
            multiple: false,
            negate: false,
            default: None,
        }
    }

    /// Create a flag rule
    pub fn flag(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, pattern).with_kind(FieldKind::Flag)
    }

    /// Set the value conversion
    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Collect all matches
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Invert the flag
    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    /// Set the fallback value
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: ParseRule,
    regex: Regex,
}

impl CompiledRule {
    fn compile(rule: ParseRule) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", rule.pattern)).map_err(|e| {
            Error::InvalidRule {
                rule: rule.field.clone(),
                message: e.to_string(),
            }
        })?;
        Ok(Self { rule, regex })
    }

    fn convert(&self, text: &str) -> Result<Value> {
        match self.rule.kind {
            FieldKind::Integer => text.trim().parse::<i64>().map(Value::from).map_err(|_| {
                Error::Parse(format!(
                    "field '{}': '{}' is not an integer",
                    self.rule.field, text
                ))
            }),
            _ => Ok(Value::String(text.to_string())),
        }
    }

    fn extract(&self, caps: &Captures<'_>) -> Result<Value> {
        if let Some(m) = caps.name("value") {
            return self.convert(m.as_str());
        }

        let named: Vec<&str> = self.regex.capture_names().flatten().collect();
        match named.len() {
            0 => {
                let m = caps.get(1).or_else(|| caps.get(0));
                self.convert(m.map(|m| m.as_str()).unwrap_or_default())
            }
            1 => self.convert(caps.name(named[0]).map(|m| m.as_str()).unwrap_or_default()),
            _ => {
                let mut object = serde_json::Map::new();
                for name in named {
                    if let Some(m) = caps.name(name) {
                        object.insert(name.to_string(), self.convert(m.as_str())?);
                    }
                }
                Ok(Value::Object(object))
            }
        }
    }

    /// Apply to the lines; `None` when nothing matched
    fn apply(&self, lines: &[&str]) -> Result<Option<Value>> {
        let mut matches = lines.iter().filter_map(|line| self.regex.captures(line));

        if self.rule.kind == FieldKind::Flag {
            return Ok(matches.next().map(|_| Value::Bool(!self.rule.negate)));
        }

        if self.rule.multiple {
            let values = matches
                .map(|c| self.extract(&c))
                .collect::<Result<Vec<_>>>()?;
            return Ok((!values.is_empty()).then(|| Value::Array(values)));
        }

        matches.next().map(|c| self.extract(&c)).transpose()
    }

    /// Value for a field nothing populated
    fn fallback(&self) -> Option<Value> {
        match (&self.rule.default, self.rule.kind) {
            (Some(default), _) => Some(default.clone()),
            (None, FieldKind::Flag) => Some(Value::Bool(self.rule.negate)),
            (None, _) => None,
        }
    }
}

/// Ordered set of extraction rules producing one [`Record`]
#[derive(Debug, Clone)]
pub struct OutputParser {
    rules: Vec<CompiledRule>,
    skip_lines: usize,
}

impl OutputParser {
    /// Compile the rules; fails on the first invalid pattern
    pub fn new(rules: Vec<ParseRule>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rules,
            skip_lines: 0,
        })
    }

    /// Ignore the first `n` lines of every output (e.g. the echoed command)
    pub fn with_skip_lines(mut self, n: usize) -> Self {
        self.skip_lines = n;
        self
    }

    /// Field names in rule order, without duplicates
    pub fn fields(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .map(|r| r.rule.field.as_str())
            .filter(|f| seen.insert(*f))
            .collect()
    }

    /// Apply every rule in order.
    ///
    /// A later rule that matches overwrites the value of an earlier rule for
    /// the same field. Fields that nothing matched take the rule default.
    pub fn parse(&self, output: &str) -> Result<Record> {
        let lines: Vec<&str> = trimmed_lines(output, self.skip_lines).collect();
        let mut record = Record::new();

        for rule in &self.rules {
            if let Some(value) = rule.apply(&lines)? {
                trace!(field = %rule.rule.field, value = %value, "Rule matched");
                record.insert(rule.rule.field.clone(), value);
            }
        }

        for rule in &self.rules {
            if !record.contains_key(&rule.rule.field) {
                if let Some(value) = rule.fallback() {
                    record.insert(rule.rule.field.clone(), value);
                }
            }
        }

        Ok(record)
    }

    /// Split output into blocks at `header` and parse each one.
    ///
    /// Later blocks with the same key replace earlier ones.
    pub fn parse_blocks(&self, output: &str, header: &Regex) -> Result<IndexMap<String, Record>> {
        split_blocks(output, header)
            .into_iter()
            .map(|block| Ok((block.key, self.parse(&block.text)?)))
            .collect()
    }
}

/// Serializable parser definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserSpec {
    /// Leading lines to ignore
    #[serde(default)]
    pub skip_lines: usize,
    /// Split the output into blocks at lines matching this pattern
    #[serde(default)]
    pub block_header: Option<String>,
    /// Extraction rules, applied in order
    #[serde(default)]
    pub rules: Vec<ParseRule>,
}

impl ParserSpec {
    /// Load a spec from a YAML (or JSON) file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Compile into a parser
    pub fn build(&self) -> Result<OutputParser> {
        Ok(OutputParser::new(self.rules.clone())?.with_skip_lines(self.skip_lines))
    }

    /// Parse output into a JSON value: a record, or an object of records
    /// keyed by block when `block_header` is set
    pub fn apply(&self, output: &str) -> Result<Value> {
        let parser = self.build()?;
        match &self.block_header {
            Some(header) => {
                let header = Regex::new(header).map_err(|e| Error::InvalidRule {
                    rule: "block_header".to_string(),
                    message: e.to_string(),
                })?;
                Ok(serde_json::to_value(parser.parse_blocks(output, &header)?)?)
            }
            None => Ok(serde_json::to_value(parser.parse(output)?)?),
        }
    }
}
