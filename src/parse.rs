//! Parsing of libpfm4 example tool output.
//!
//! `showevtinfo` and `check_events` only print human readable text. The
//! patterns in this module are the contract against that text; if upstream
//! changes its output format, this is the only place that needs to follow.

use std::sync::OnceLock;

use regex::Regex;

/// Line separating two event descriptions in `showevtinfo` output.
pub const BLOCK_SEPARATOR: &str = "#-----------------------------";

static NAME_PATTERN: OnceLock<Regex> = OnceLock::new();
static UMASK_PATTERN: OnceLock<Regex> = OnceLock::new();
static CODES_PATTERN: OnceLock<Regex> = OnceLock::new();

fn name_pattern() -> &'static Regex {
    NAME_PATTERN.get_or_init(|| Regex::new(r"Name\s+:\s+([a-zA-Z0-9_\-]+)").unwrap())
}

fn umask_pattern() -> &'static Regex {
    UMASK_PATTERN.get_or_init(|| {
        Regex::new(r"Umask-\d+\s+:\s+0x[0-9a-fA-F]+\s+:\s+PMU\s+:\s+\[(.*?)\]").unwrap()
    })
}

fn codes_pattern() -> &'static Regex {
    CODES_PATTERN.get_or_init(|| Regex::new(r"Codes\s+:\s+(0x[0-9a-fA-F]+)").unwrap())
}

/// Splits `showevtinfo` output into per-event blocks.
pub fn split_blocks(text: &str) -> impl Iterator<Item = &str> {
    text.split(BLOCK_SEPARATOR)
}

/// Extracts the labels of one event block.
///
/// Returns the bare event name if the block has no umasks, one
/// `NAME.UMASK_DESCRIPTION` label per umask otherwise, and nothing if the
/// block has no `Name` line at all.
pub fn extract_events(block: &str) -> Vec<String> {
    let Some(name) = name_pattern()
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return Vec::new();
    };

    let labels: Vec<String> = umask_pattern()
        .captures_iter(block)
        .filter_map(|caps| caps.get(1))
        .map(|desc| format!("{name}.{}", desc.as_str().replace(' ', "_")))
        .collect();

    if labels.is_empty() {
        vec![name.to_string()]
    } else {
        labels
    }
}

/// All labels of a complete `showevtinfo` output, in order of appearance.
pub fn extract_labels(text: &str) -> Vec<String> {
    split_blocks(text).flat_map(extract_events).collect()
}

/// Finds the raw event code in `check_events` output.
pub fn parse_codes(output: &str) -> Option<&str> {
    codes_pattern()
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
