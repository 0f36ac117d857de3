//! Line-oriented aggregate output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::AggregateResult;
use crate::models::Prefix;

/// Write aggregates to `path`, one canonical `address/length` per line.
///
/// The file is created fresh on every call; each aggregate is written as it
/// is pulled from the sequence. Returns the number of lines written.
pub fn write_aggregates<I>(path: &Path, aggregates: I) -> AggregateResult<usize>
where
    I: IntoIterator<Item = Prefix>,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let mut written = 0;
    for aggregate in aggregates {
        writeln!(writer, "{}", aggregate)?;
        written += 1;
    }
    writer.flush()?;

    log::info!("wrote {} aggregates to {}", written, path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::parse_prefixes;
    use std::fs;

    #[test]
    fn test_write_aggregates_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aggregated.txt");

        let aggregates = parse_prefixes(["10.64.0.0/15", "172.16.40.0/24"]).unwrap();
        let written = write_aggregates(&path, aggregates).unwrap();
        assert_eq!(written, 2);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "10.64.0.0/15\n172.16.40.0/24\n");
    }

    #[test]
    fn test_write_aggregates_replaces_previous_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aggregated.txt");

        let first = parse_prefixes(["10.0.0.0/8", "192.0.2.0/24"]).unwrap();
        write_aggregates(&path, first).unwrap();

        let second = parse_prefixes(["198.51.100.0/24"]).unwrap();
        let written = write_aggregates(&path, second).unwrap();
        assert_eq!(written, 1);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "198.51.100.0/24\n");
    }

    #[test]
    fn test_write_aggregates_empty_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aggregated.txt");

        let written = write_aggregates(&path, Vec::new()).unwrap();
        assert_eq!(written, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
