//! The plain-text index stored next to extracted files.
//!
//! One line per table slot, in slot order:
//!
//! ```text
//! Sprite One.png: Sprite One
//! [:space:]
//! Sound Two.unk: Sound Two
//! ```
//!
//! Left of the first `": "` is the file on disk, right of it the logical
//! name stored in the table.  [`SENTINEL`] marks an empty slot.  The text
//! is single-byte encoded, see [`crate::naming`].

use crate::error::{ArchiveError, Result};
use crate::naming::{decode_name, encode_name};

/// Default manifest file name inside an extraction directory.
pub const MANIFEST_NAME: &str = "index.txt";
/// Line standing for a zero-size slot.
pub const SENTINEL: &str = "[:space:]";
const SEPARATOR: &str = ": ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    Sentinel,
    Named {
        file_name:    String,
        logical_name: String,
    },
}

impl ManifestLine {
    pub fn named(file_name: impl Into<String>, logical_name: impl Into<String>) -> Self {
        ManifestLine::Named {
            file_name:    file_name.into(),
            logical_name: logical_name.into(),
        }
    }

    fn parse(line: &str, line_number: usize) -> Result<Self> {
        if line == SENTINEL {
            return Ok(ManifestLine::Sentinel);
        }
        let (file_name, logical_name) = line.split_once(SEPARATOR).ok_or_else(|| {
            ArchiveError::MalformedManifestEntry {
                line_number,
                line: line.to_owned(),
            }
        })?;
        Ok(Self::named(file_name, logical_name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    pub lines: Vec<ManifestLine>,
}

impl Manifest {
    pub fn push(&mut self, line: ManifestLine) {
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn sentinel_count(&self) -> usize {
        self.lines.iter().filter(|l| **l == ManifestLine::Sentinel).count()
    }

    /// Logical names in slot order, sentinels skipped.
    pub fn logical_names(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| match l {
            ManifestLine::Named { logical_name, .. } => Some(logical_name.as_str()),
            ManifestLine::Sentinel => None,
        })
    }

    /// Serialize with `\n` after every line.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for line in &self.lines {
            match line {
                ManifestLine::Sentinel => out.extend_from_slice(SENTINEL.as_bytes()),
                ManifestLine::Named { file_name, logical_name } => {
                    out.extend(encode_name(file_name)?);
                    out.extend_from_slice(SEPARATOR.as_bytes());
                    out.extend(encode_name(logical_name)?);
                }
            }
            out.push(b'\n');
        }
        Ok(out)
    }

    /// Parse manifest text.  Accepts `\r\n` endings and an optional final
    /// newline; any other line without `": "` is an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = decode_name(bytes);
        let mut raw: Vec<&str> = text.split('\n').collect();
        if raw.last() == Some(&"") {
            raw.pop();
        }
        let lines = raw
            .into_iter()
            .enumerate()
            .map(|(i, line)| ManifestLine::parse(line.strip_suffix('\r').unwrap_or(line), i + 1))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { lines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sentinels_and_pairs() {
        let m = Manifest::from_bytes(b"img.bin: Sprite One\n[:space:]\nsnd.bin: Sound Two").unwrap();
        assert_eq!(m.lines, vec![
            ManifestLine::named("img.bin", "Sprite One"),
            ManifestLine::Sentinel,
            ManifestLine::named("snd.bin", "Sound Two"),
        ]);
        assert_eq!(m.sentinel_count(), 1);
    }

    #[test]
    fn splits_on_first_separator_only() {
        let m = Manifest::from_bytes(b"a.unk: Title: Part 2\r\n").unwrap();
        assert_eq!(m.lines, vec![ManifestLine::named("a.unk", "Title: Part 2")]);
    }

    #[test]
    fn malformed_line_is_named() {
        let err = Manifest::from_bytes(b"ok.png: fine\nbroken line\n").unwrap_err();
        match err {
            ArchiveError::MalformedManifestEntry { line_number, line } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "broken line");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_line_inside_is_malformed() {
        assert!(Manifest::from_bytes(b"a: b\n\nc: d\n").is_err());
    }

    #[test]
    fn serialized_text_reparses() {
        let mut m = Manifest::default();
        m.push(ManifestLine::Sentinel);
        m.push(ManifestLine::named("Ca-on.png", "Ca\u{f1}on"));
        let bytes = m.to_bytes().unwrap();
        assert_eq!(bytes, b"[:space:]\nCa-on.png: Ca\xF1on\n");
        assert_eq!(Manifest::from_bytes(&bytes).unwrap(), m);
    }

    #[test]
    fn empty_manifest() {
        assert!(Manifest::from_bytes(b"").unwrap().is_empty());
    }
}
