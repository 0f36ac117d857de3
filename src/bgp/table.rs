//! BGP routing table dump parsing.
//!
//! Extracts the prefixes a dump attributes to one origin AS. In `show ip bgp`
//! style output the origin AS is the second-to-last field of a route line,
//! sitting just before the origin code, and the prefix is the second field.

use colored::Colorize;
use itertools::Itertools;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use crate::error::AggregateResult;

/// Regex for the shape of a CIDR field: address characters, a slash, a length.
static PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_prefix_regex() -> &'static Regex {
    PREFIX_REGEX
        .get_or_init(|| Regex::new(r"^[0-9A-Fa-f:.]+/\d{1,3}$").expect("Invalid Regex"))
}

/// Extract the prefix field from one route line, if the line is originated by
/// `origin_as`.
///
/// # Arguments
/// * `line` - One line of the routing table dump
/// * `origin_as` - The origin AS number as it appears in the dump, e.g. "65001"
pub fn extract_prefix<'a>(line: &'a str, origin_as: &str) -> Option<&'a str> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() > 2 && words[words.len() - 2] == origin_as {
        Some(words[1])
    } else {
        None
    }
}

/// Read a routing table dump and collect every prefix originated by
/// `origin_as`, in file order.
///
/// Fields that sit in the right position but are not CIDR-shaped (header
/// fragments, classful bare addresses) are logged and skipped so they never
/// reach the prefix parser.
pub fn read_table_prefixes(path: &Path, origin_as: &str) -> AggregateResult<Vec<String>> {
    log::debug!("reading routing table {}", path.display());
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut prefixes: Vec<String> = Vec::new();
    let mut rejected: Vec<String> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let Some(field) = extract_prefix(&line, origin_as) else {
            continue;
        };
        if get_prefix_regex().is_match(field) {
            prefixes.push(field.to_string());
        } else {
            rejected.push(field.to_string());
        }
    }

    if !rejected.is_empty() {
        log::warn!(
            "{skipped} {n} non-CIDR fields on AS{origin_as} lines: {fields}",
            skipped = "skipped".on_yellow(),
            n = rejected.len(),
            fields = rejected.iter().join(", ")
        );
    }
    log::info!(
        "read {} prefixes for AS{} from {}",
        prefixes.len(),
        origin_as,
        path.display()
    );

    Ok(prefixes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_prefix_from_route_line() {
        let line = "*> 10.64.0.0/16     203.0.113.5   0 100 0 64496 65001 i";
        assert_eq!(extract_prefix(line, "65001"), Some("10.64.0.0/16"));
        assert_eq!(extract_prefix(line, "64496"), None);
    }

    #[test]
    fn test_extract_prefix_matches_origin_position_only() {
        // 65001 appears mid-path here; the origin is 64511.
        let line = "*> 10.0.0.0/8       203.0.113.9   0 100 0 65001 64511 i";
        assert_eq!(extract_prefix(line, "65001"), None);
        assert_eq!(extract_prefix(line, "64511"), Some("10.0.0.0/8"));
    }

    #[test]
    fn test_extract_prefix_v6_line() {
        let line = "*> 2001:db8::/32    2001:db8:ffff::1  0 100 0 64496 65010 i";
        assert_eq!(extract_prefix(line, "65010"), Some("2001:db8::/32"));
    }

    #[test]
    fn test_extract_prefix_ignores_short_and_header_lines() {
        assert_eq!(extract_prefix("", "65001"), None);
        assert_eq!(extract_prefix("10.0.0.0/24 65001", "65001"), None);
        assert_eq!(
            extract_prefix("   Network   Next Hop   Metric LocPrf Weight Path", "65001"),
            None
        );
    }

    #[test]
    fn test_prefix_regex_accepts_cidr_shapes_only() {
        assert!(get_prefix_regex().is_match("10.64.0.0/16"));
        assert!(get_prefix_regex().is_match("2001:db8::/32"));
        assert!(!get_prefix_regex().is_match("192.0.2.1"));
        assert!(!get_prefix_regex().is_match("Hop"));
        assert!(!get_prefix_regex().is_match("10.0.0.0/16/24"));
    }

    #[test]
    fn test_read_table_prefixes_filters_by_origin() {
        let prefixes = read_table_prefixes(
            Path::new("src/tests/test_data/bgp_table_01.txt"),
            "65001",
        )
        .unwrap();
        assert_eq!(
            prefixes,
            [
                "10.64.0.0/16",
                "10.64.128.0/20",
                "10.65.0.0/16",
                "172.16.40.0/24",
                "198.51.100.0/25",
                "198.51.100.128/25",
            ]
        );
    }

    #[test]
    fn test_read_table_prefixes_unknown_as_is_empty() {
        let prefixes = read_table_prefixes(
            Path::new("src/tests/test_data/bgp_table_01.txt"),
            "65999",
        )
        .unwrap();
        assert!(prefixes.is_empty());
    }

    #[test]
    fn test_read_table_prefixes_missing_file_is_io_error() {
        let err = read_table_prefixes(Path::new("src/tests/test_data/nope.txt"), "65001")
            .unwrap_err();
        assert!(matches!(err, crate::error::AggregateError::Io(_)));
    }
}
