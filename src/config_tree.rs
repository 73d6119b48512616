//! Hierarchical view of indented running-config text.
//!
//! IOS-family configurations nest sub-commands under a header by
//! indentation. Readers that need one section (an interface, a BGP
//! process) parse the output into a tree and pick the section out instead
//! of matching against the whole text.

/// A configuration line with its nested sub-commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNode {
    /// The configuration line, trimmed
    pub line: String,
    /// Indentation of the line in the source text
    pub indent: usize,
    /// Nested configuration lines
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Create a new config node
    pub fn new(line: impl Into<String>, indent: usize) -> Self {
        Self {
            line: line.into(),
            indent,
            children: Vec::new(),
        }
    }

    /// Flatten the node and its children, one space of indentation per level
    pub fn to_lines(&self, base_indent: usize) -> Vec<String> {
        let mut result = vec![format!("{}{}", " ".repeat(base_indent), self.line)];
        for child in &self.children {
            result.extend(child.to_lines(base_indent + 1));
        }
        result
    }

    /// Flattened body of the section, without the header line
    pub fn child_lines(&self) -> Vec<String> {
        self.children.iter().flat_map(|c| c.to_lines(1)).collect()
    }

    /// Find a direct child by line content
    pub fn find_child(&self, line: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|c| c.line == line.trim())
    }
}

/// Close the innermost open node, attaching it to its parent or the roots
fn close(open: &mut Vec<ConfigNode>, roots: &mut Vec<ConfigNode>) {
    if let Some(node) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

/// Parse configuration text into a tree.
///
/// Blank lines and `!` / `#` separator lines are skipped. A line belongs to
/// the closest preceding line with smaller indentation.
pub fn parse_config_tree(config: &str) -> Vec<ConfigNode> {
    let mut roots = Vec::new();
    // Open nodes from the outermost down; indentation strictly increases.
    let mut open: Vec<ConfigNode> = Vec::new();
    for line in config.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('!') || trimmed.starts_with('#') {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        while open.last().is_some_and(|n| n.indent >= indent) {
            close(&mut open, &mut roots);
        }
        open.push(ConfigNode::new(trimmed, indent));
    }
    while !open.is_empty() {
        close(&mut open, &mut roots);
    }
    roots
}

/// Find a section by its chain of parent lines
pub fn find_section<'a>(tree: &'a [ConfigNode], parents: &[&str]) -> Option<&'a ConfigNode> {
    let (first, rest) = parents.split_first()?;
    let mut current = tree.iter().find(|n| n.line == first.trim())?;
    for parent in rest {
        current = current.find_child(parent)?;
    }
    Some(current)
}

/// Direct sub-commands of the top-level section whose header equals `header`.
///
/// Nested blocks (an IOS-XE `service instance`, say) contribute their
/// header line only, so their settings are not mistaken for the section's.
pub fn section_text(config: &str, header: &str) -> Option<String> {
    let tree = parse_config_tree(config);
    find_section(&tree, &[header]).map(|node| {
        node.children
            .iter()
            .map(|c| format!(" {}", c.line))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// `set` lines under `prefix`, with `set <prefix> ` stripped.
///
/// Used for Junos `| display set` output.
pub fn junos_set_lines(output: &str, prefix: &str) -> Vec<String> {
    let lead = format!("set {} ", prefix.trim());
    output
        .lines()
        .map(str::trim)
        .filter_map(|l| l.strip_prefix(&lead))
        .map(|rest| rest.trim().to_string())
        .filter(|rest| !rest.is_empty())
        .collect()
}
