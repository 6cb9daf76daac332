use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::cipher;
use crate::error::{eof_as_truncated, Result};
use crate::naming;

/// Width of the obfuscated name field.
pub const NAME_LEN: usize = 32;
/// Width of the unknown block that closes every record.
pub const TRAILING_LEN: usize = 22;
/// On-disk record size.
pub const ENTRY_SIZE: usize = 4 + 1 + 4 + NAME_LEN + 1 + 2 + 4 + 4 + 4 + TRAILING_LEN;

/// One slot of the entry table.
///
/// The `reserved*` and `trailing` fields have no known meaning.  They are
/// read and written verbatim so a decoded table re-encodes byte for byte;
/// freshly built entries carry zeros.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileEntry {
    pub reserved1: u32,
    pub code:      u8,
    pub reserved2: u32,
    pub name:      [u8; NAME_LEN],
    pub reserved3: u8,
    pub reserved4: u16,
    pub size:      u32,
    pub reserved5: u32,
    /// Archive offset of the blob, plus one.  Zero means "no data".
    pub start:     u32,
    pub trailing:  [u8; TRAILING_LEN],
}

impl FileEntry {
    /// An all-zero placeholder slot.
    pub fn sentinel() -> Self {
        Self::default()
    }

    /// Build an entry for `logical_name` (single-byte encoded).  The name is
    /// space-padded to [`NAME_LEN`] and obfuscated with `code`.  Returns
    /// `true` alongside the entry when the name had to be cut to fit.
    pub fn named(logical_name: &[u8], code: u8) -> (Self, bool) {
        let mut plain = [b' '; NAME_LEN];
        let n = logical_name.len().min(NAME_LEN);
        plain[..n].copy_from_slice(&logical_name[..n]);
        let entry = Self {
            code,
            name: cipher::transform(&plain, code),
            ..Self::default()
        };
        (entry, logical_name.len() > NAME_LEN)
    }

    pub fn is_sentinel(&self) -> bool {
        self.size == 0
    }

    /// Decoded name field with trailing whitespace removed.
    pub fn logical_name(&self) -> String {
        let plain = cipher::transform(&self.name, self.code);
        naming::decode_name(naming::right_trim(&plain))
    }

    /// Zero-based position of the blob, `None` when `start` was never set.
    pub fn data_offset(&self) -> Option<u64> {
        self.start.checked_sub(1).map(u64::from)
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.reserved1)?;
        writer.write_u8(self.code)?;
        writer.write_u32::<LittleEndian>(self.reserved2)?;
        writer.write_all(&self.name)?;
        writer.write_u8(self.reserved3)?;
        writer.write_u16::<LittleEndian>(self.reserved4)?;
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_u32::<LittleEndian>(self.reserved5)?;
        writer.write_u32::<LittleEndian>(self.start)?;
        writer.write_all(&self.trailing)?;
        Ok(())
    }

    pub fn read<R: Read>(reader: R) -> Result<Self> {
        Self::read_fields(reader).map_err(eof_as_truncated)
    }

    fn read_fields<R: Read>(mut reader: R) -> io::Result<Self> {
        let reserved1 = reader.read_u32::<LittleEndian>()?;
        let code = reader.read_u8()?;
        let reserved2 = reader.read_u32::<LittleEndian>()?;
        let mut name = [0u8; NAME_LEN];
        reader.read_exact(&mut name)?;
        let reserved3 = reader.read_u8()?;
        let reserved4 = reader.read_u16::<LittleEndian>()?;
        let size = reader.read_u32::<LittleEndian>()?;
        let reserved5 = reader.read_u32::<LittleEndian>()?;
        let start = reader.read_u32::<LittleEndian>()?;
        let mut trailing = [0u8; TRAILING_LEN];
        reader.read_exact(&mut trailing)?;
        Ok(Self {
            reserved1,
            code,
            reserved2,
            name,
            reserved3,
            reserved4,
            size,
            reserved5,
            start,
            trailing,
        })
    }
}
