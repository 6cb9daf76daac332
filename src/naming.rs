//! Logical names and the files they are extracted to.
//!
//! Logical names are single-byte text: each byte is one character in
//! U+0000..=U+00FF, so any name read from a table survives a trip through
//! the manifest unchanged.

use std::path::{Path, PathBuf};

use crate::error::{ArchiveError, Result};
use crate::sniff::Extension;

/// Used when a name sanitizes to nothing usable.
pub const FALLBACK_NAME: &str = "no-name";

pub fn decode_name(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

pub fn encode_name(name: &str) -> Result<Vec<u8>> {
    name.chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| ArchiveError::UnencodableName(name.to_owned()))
}

/// Whitespace as the C locale sees it, vertical tab included.
fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

pub fn right_trim(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| !is_c_space(b)).map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Make a logical name safe to use as a file name.
///
/// NUL and every character at or above U+0080 become `-`, as do path
/// separators and `:` (a file name must never contain the manifest's
/// `": "` separator).  A result with no visible character is replaced by
/// [`FALLBACK_NAME`].
pub fn sanitize(name: &str) -> String {
    let out: String = name
        .chars()
        .map(|c| match c {
            '\0' | '/' | '\\' | ':' => '-',
            c if !c.is_ascii() => '-',
            c => c,
        })
        .collect();
    if out.chars().all(|c| c.is_ascii_control() || c == ' ') {
        FALLBACK_NAME.to_owned()
    } else {
        out
    }
}

/// Split at the last dot that is not the first character.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}

/// Swap any existing extension of `name` for `ext`.
pub fn replace_extension(name: &str, ext: Extension) -> String {
    let (stem, _) = split_extension(name);
    format!("{stem}{ext}")
}

/// Candidate file name for an entry: sanitized logical name with the
/// sniffed extension.
pub fn output_name(logical_name: &str, ext: Extension) -> String {
    replace_extension(&sanitize(logical_name), ext)
}

/// First path `dir/stem[_n].ext` that does not exist yet.
///
/// Looks at the filesystem on every call, so results stay correct when
/// the directory already holds files from an earlier run.
pub fn resolve_collision(dir: &Path, file_name: &str) -> PathBuf {
    let mut path = dir.join(file_name);
    if !path.exists() {
        return path;
    }
    let (stem, ext) = split_extension(file_name);
    let mut n: usize = 1;
    loop {
        path = dir.join(format!("{stem}_{n}{ext}"));
        if !path.exists() {
            return path;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;

    #[test]
    fn high_bytes_and_nul_become_dashes() {
        let name = decode_name(b"Ca\xF1on\x00\x80");
        assert_eq!(sanitize(&name), "Ca-on--");
    }

    #[test]
    fn separators_are_neutralised() {
        assert_eq!(sanitize("../x\\y"), "..-x-y");
    }

    #[test]
    fn colons_never_reach_file_names() {
        assert_eq!(sanitize("Title: Part 2"), "Title- Part 2");
        assert_eq!(output_name("a:b", Extension::Png), "a-b.png");
    }

    #[test]
    fn empty_and_control_only_fall_back() {
        assert_eq!(sanitize(""), FALLBACK_NAME);
        assert_eq!(sanitize("\x01\x02\x1F"), FALLBACK_NAME);
    }

    #[test]
    fn trims_c_whitespace_only() {
        assert_eq!(right_trim(b"abc \t\x0B\x0C\r\n"), b"abc");
        assert_eq!(right_trim(b"abc\x00 "), b"abc\x00");
        assert_eq!(right_trim(b"    "), b"");
    }

    #[test]
    fn extension_replaces_existing_one() {
        assert_eq!(replace_extension("Sprite One", Extension::Png), "Sprite One.png");
        assert_eq!(replace_extension("tile.bmp", Extension::Png), "tile.png");
        assert_eq!(replace_extension("a.b.c", Extension::Unknown), "a.b.unk");
        assert_eq!(replace_extension(".hidden", Extension::Jpg), ".hidden.jpg");
    }

    #[test]
    fn encode_rejects_wide_chars() {
        assert_eq!(encode_name("Cañon").unwrap(), b"Ca\xF1on");
        assert!(matches!(encode_name("€"), Err(ArchiveError::UnencodableName(_))));
    }

    #[test]
    fn collisions_count_up_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut seen = Vec::new();
        for _ in 0..3 {
            let p = resolve_collision(dir.path(), "base.png");
            fs::write(&p, b"x").unwrap();
            seen.push(p.file_name().unwrap().to_string_lossy().into_owned());
        }
        assert_eq!(seen, ["base.png", "base_1.png", "base_2.png"]);
    }

    #[test]
    fn collision_rechecks_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.unk"), b"").unwrap();
        fs::write(dir.path().join("a_1.unk"), b"").unwrap();
        let p = resolve_collision(dir.path(), "a.unk");
        assert_eq!(p, dir.path().join("a_2.unk"));
        fs::remove_file(dir.path().join("a.unk")).unwrap();
        assert_eq!(resolve_collision(dir.path(), "a.unk"), dir.path().join("a.unk"));
    }

    proptest! {
        #[test]
        fn sanitized_names_are_plain_ascii(bytes in prop::collection::vec(any::<u8>(), 0..32)) {
            let out = sanitize(&decode_name(&bytes));
            prop_assert!(!out.is_empty());
            prop_assert!(out.is_ascii());
            prop_assert!(!out.contains('\0') && !out.contains('/') && !out.contains('\\') && !out.contains(':'));
        }

        #[test]
        fn names_survive_single_byte_text(bytes in prop::collection::vec(any::<u8>(), 0..32)) {
            prop_assert_eq!(encode_name(&decode_name(&bytes)).unwrap(), bytes);
        }
    }
}
