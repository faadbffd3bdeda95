use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::Formatter;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::errors::ErrorAggregator;

/// `{"errors": {"<file>": ["<msg>", ...], ...}}`
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub errors: &'a BTreeMap<String, BTreeSet<String>>,
}

impl<'a> Report<'a> {
    pub fn new(errors: &'a ErrorAggregator) -> Self {
        Self {
            errors: errors.snapshot(),
        }
    }
}

/// Compact JSON with `", "`/`": "` separators and `/` escaped as `\/`
struct ReportFormatter;

impl Formatter for ReportFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut parts = fragment.split('/');
        if let Some(head) = parts.next() {
            writer.write_all(head.as_bytes())?;
        }
        for part in parts {
            writer.write_all(b"\\/")?;
            writer.write_all(part.as_bytes())?;
        }
        Ok(())
    }
}

/// Serialize the report into `writer`
pub fn write_json<W: Write>(report: &Report<'_>, writer: W) -> Result<()> {
    let mut serializer = serde_json::Serializer::with_formatter(writer, ReportFormatter);
    report
        .serialize(&mut serializer)
        .context("Failed to serialize error report")
}

/// Write the report to `path`, replacing whatever was there.
///
/// The JSON goes to a temporary file next to `path` first and is then renamed
/// over `path`.
pub fn write_report(path: &Path, errors: &ErrorAggregator) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create report file in {}", dir.display()))?;
    {
        let mut writer = io::BufWriter::new(file.as_file_mut());
        write_json(&Report::new(errors), &mut writer)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    }

    file.persist(path)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn render(errors: &ErrorAggregator) -> Result<String> {
        let mut buf = Vec::new();
        write_json(&Report::new(errors), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    fn aggregator(entries: &[(&str, &[&str])]) -> ErrorAggregator {
        let mut errors = ErrorAggregator::new();
        for (name, messages) in entries {
            errors.merge(name, messages.iter().map(|m| m.to_string()));
        }
        errors
    }

    fn parse(text: &str) -> HashMap<String, BTreeSet<String>> {
        let value: serde_json::Value = serde_json::from_str(text).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        serde_json::from_value(object["errors"].clone()).unwrap()
    }

    #[test]
    fn empty_report() {
        let text = render(&ErrorAggregator::new()).unwrap();
        assert_eq!(text, r#"{"errors": {}}"#);
    }

    #[test]
    fn layout_uses_spaced_separators() {
        let errors = aggregator(&[("A.java", &["x", "y"]), ("B.java", &["z"])]);
        let text = render(&errors).unwrap();
        assert_eq!(
            text,
            r#"{"errors": {"A.java": ["x", "y"], "B.java": ["z"]}}"#
        );
    }

    #[test]
    fn forward_slash_is_escaped() {
        let errors = aggregator(&[("A.java", &["a/b//c"])]);
        let text = render(&errors).unwrap();
        assert!(text.contains(r#""a\/b\/\/c""#), "{text}");
        assert_eq!(parse(&text)["A.java"].iter().next().unwrap(), "a/b//c");
    }

    #[test]
    fn special_characters_round_trip() {
        let message = "expected \"}\" in C:\\src\n\tgot ☃ (ünïcødé)\r\u{8}\u{c}\u{1}";
        let errors = aggregator(&[("Ünïcødé.java", &[message])]);
        let text = render(&errors).unwrap();

        assert!(text.contains('☃'), "non-ASCII must pass through: {text}");
        assert!(text.contains(r#"\"}\""#));
        assert!(text.contains(r"\n\t"));

        let parsed = parse(&text);
        assert_eq!(parsed["Ünïcødé.java"].iter().next().unwrap(), message);
    }

    #[test]
    fn round_trip_reproduces_every_merged_pair() {
        let errors = aggregator(&[
            ("A.java", &["cannot find symbol", "incompatible types"]),
            ("B.java", &["';' expected"]),
        ]);
        let parsed = parse(&render(&errors).unwrap());
        let expected: HashMap<String, BTreeSet<String>> = errors
            .snapshot()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn write_report_replaces_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("errors.json");
        std::fs::write(&path, "previous run, much longer than the new report ".repeat(10)).unwrap();

        write_report(&path, &aggregator(&[("A.java", &["boom"])])).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, r#"{"errors": {"A.java": ["boom"]}}"#);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
