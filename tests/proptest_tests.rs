//! Property-based tests for cli-units using proptest.
//!
//! Device output is arbitrary text; none of the text-processing entry points
//! may panic on it.

use proptest::prelude::*;

use cli_units::config_tree::{parse_config_tree, ConfigNode};
use cli_units::device::clean_output;
use cli_units::parser::{FieldKind, OutputParser, ParseRule};
use cli_units::path::ConfigPath;
use cli_units::template::to_command_lines;
use cli_units::units::model::{netmask_from_prefix, prefix_from_netmask, Ipv4Address};

// ============================================================================
// Strategies
// ============================================================================

/// Strategy for lines that look like running-config output
fn config_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ ]{0,4}[a-z]{1,10}( [A-Za-z0-9/.]{1,12}){0,3}",
        Just("!".to_string()),
        Just("".to_string()),
        "\\PC{0,40}",
    ]
}

/// Strategy for device output made of config-like lines
fn device_output() -> impl Strategy<Value = String> {
    prop::collection::vec(config_line(), 0..40).prop_map(|lines| lines.join("\n"))
}

/// Strategy for path element names and key values
fn element() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,15}").unwrap()
}

fn key_value() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9][A-Za-z0-9/.:-]{0,20}").unwrap()
}

fn count_nodes(nodes: &[ConfigNode]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}

fn interface_parser() -> OutputParser {
    OutputParser::new(vec![
        ParseRule::new("description", r"description (?P<value>.+)"),
        ParseRule::new("mtu", r"mtu (?P<value>\d+)").with_kind(FieldKind::Integer),
        ParseRule::flag("enabled", "shutdown").negated(),
    ])
    .unwrap()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn parser_never_panics(output in device_output()) {
        let parser = interface_parser();
        let _ = parser.parse(&output);
    }

    #[test]
    fn parser_handles_arbitrary_text(output in "\\PC{0,500}") {
        let parser = interface_parser();
        let _ = parser.parse(&output);
    }

    #[test]
    fn config_tree_keeps_every_line(output in device_output()) {
        let tree = parse_config_tree(&output);
        let expected = output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('!') && !l.starts_with('#'))
            .count();
        prop_assert_eq!(count_nodes(&tree), expected);
    }

    #[test]
    fn clean_output_never_grows(command in "[a-z |^]{0,30}", output in device_output()) {
        let cleaned = clean_output(&command, &output);
        prop_assert!(cleaned.lines().count() <= output.lines().count());
    }

    #[test]
    fn command_lines_are_trimmed(rendered in "\\PC{0,200}") {
        for line in to_command_lines(&rendered) {
            prop_assert!(!line.is_empty());
            prop_assert_eq!(line.trim(), line.as_str());
        }
    }

    #[test]
    fn path_parse_never_panics(text in "\\PC{0,80}") {
        let _ = ConfigPath::parse(&text);
    }

    #[test]
    fn keyed_paths_round_trip(
        parts in prop::collection::vec((element(), prop::option::of((element(), key_value()))), 1..6)
    ) {
        let mut text = String::new();
        for (name, key) in &parts {
            text.push('/');
            text.push_str(name);
            if let Some((k, v)) = key {
                text.push_str(&format!("[{}={}]", k, v));
            }
        }
        let path = ConfigPath::parse(&text).unwrap();
        prop_assert_eq!(path.to_string(), text);
        prop_assert_eq!(path.segments().len(), parts.len());
    }

    #[test]
    fn netmask_prefix_round_trip(prefix in 0u32..=32) {
        let mask = netmask_from_prefix(prefix).unwrap();
        prop_assert_eq!(prefix_from_netmask(&mask.to_string()), Some(prefix));
    }

    #[test]
    fn ipv4_address_display_round_trip(a in any::<[u8; 4]>(), prefix in 0u8..=32) {
        let text = format!("{}.{}.{}.{}/{}", a[0], a[1], a[2], a[3], prefix);
        let address: Ipv4Address = text.parse().unwrap();
        prop_assert_eq!(address.to_string(), text);
    }
}
