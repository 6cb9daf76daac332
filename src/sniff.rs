//! Output extension from a blob's leading byte.
//!
//! The table is a one-byte heuristic, not a signature check.  Some rows
//! are not real magic numbers (`0x49` is the `I` of an ID3 tag, which is
//! how the game ships its MP3s).  Extracted names must match existing
//! tool output, so the table is frozen.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    Bmp,
    Dds,
    Gif,
    Mp3,
    Wav,
    Tga,
    Png,
    Jpg,
    Unknown,
}

// ── Frozen table ─────────────────────────────────────────────────────────────

const TABLE: &[(u8, Extension)] = &[
    (0x42, Extension::Bmp), // 'B' of "BM"
    (0x44, Extension::Dds), // 'D' of "DDS "
    (0x47, Extension::Gif), // 'G' of "GIF8"
    (0x49, Extension::Mp3), // 'I' of "ID3"
    (0x52, Extension::Wav), // 'R' of "RIFF"
    (0x54, Extension::Tga),
    (0x89, Extension::Png),
    (0xFF, Extension::Jpg),
];

impl Extension {
    /// Extension including the leading dot.
    pub fn as_str(self) -> &'static str {
        match self {
            Extension::Bmp     => ".bmp",
            Extension::Dds     => ".dds",
            Extension::Gif     => ".gif",
            Extension::Mp3     => ".mp3",
            Extension::Wav     => ".wav",
            Extension::Tga     => ".tga",
            Extension::Png     => ".png",
            Extension::Jpg     => ".jpg",
            Extension::Unknown => ".unk",
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Never fails: unmatched bytes map to [`Extension::Unknown`].
pub fn extension_for(first_byte: u8) -> Extension {
    TABLE
        .iter()
        .find(|(b, _)| *b == first_byte)
        .map(|(_, ext)| *ext)
        .unwrap_or(Extension::Unknown)
}
