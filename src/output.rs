//! Rendering search results.

use crate::error::Result;
use crate::record::MatchResult;
use std::io::Write;

/// How matches are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// One line per match: its display name.
    #[default]
    Terse,
    /// One pretty-printed JSON object per match, keys sorted.
    Verbose,
}

/// Writes `matches` to `out` in walk order.
pub fn write_matches<W: Write>(out: &mut W, matches: &[MatchResult], mode: OutputMode) -> Result<()> {
    for record in matches {
        match mode {
            OutputMode::Terse => {
                writeln!(out, "{}", record.display_name().unwrap_or_default())?;
            }
            OutputMode::Verbose => {
                serde_json::to_writer_pretty(&mut *out, record)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueData;

    fn record(name: &str, version: &str) -> MatchResult {
        [
            ("DisplayName", ValueData::from(name)),
            ("DisplayVersion", ValueData::from(version)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_terse_one_line_per_match() {
        let matches = vec![record("Notepad++", "8.0"), record("VLC media player", "3.0")];
        let mut out = Vec::new();
        write_matches(&mut out, &matches, OutputMode::Terse).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Notepad++\nVLC media player\n");
    }

    #[test]
    fn test_verbose_pretty_json() {
        let matches = vec![record("Notepad++", "8.0")];
        let mut out = Vec::new();
        write_matches(&mut out, &matches, OutputMode::Verbose).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n  \"DisplayName\": \"Notepad++\",\n  \"DisplayVersion\": \"8.0\"\n}\n"
        );
    }

    #[test]
    fn test_no_matches_prints_nothing() {
        let mut out = Vec::new();
        write_matches(&mut out, &[], OutputMode::Verbose).unwrap();
        assert!(out.is_empty());
    }
}
