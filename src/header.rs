use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::error::{eof_as_truncated, ArchiveError, Result};

/// Signature at offset 0 of every archive.
pub const MAGIC: &[u8; 16] = b"MZEngineBinarir\xA7";
/// On-disk header size: magic + u16 count + u32 total_size.
pub const HEADER_SIZE: usize = 16 + 2 + 4;
/// `total_size` always exceeds the real data length by this much.
pub const TOTAL_SIZE_BIAS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub magic:      [u8; 16],
    pub count:      u16,
    pub total_size: u32,
}

impl Header {
    pub fn new(count: u16, data_len: u32) -> Result<Self> {
        let total_size = data_len
            .checked_add(TOTAL_SIZE_BIAS)
            .ok_or(ArchiveError::ArchiveTooLarge)?;
        Ok(Self { magic: *MAGIC, count, total_size })
    }

    /// Sum of entry sizes, with the format's `+2` removed.
    pub fn data_len(&self) -> u32 {
        self.total_size.saturating_sub(TOTAL_SIZE_BIAS)
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.magic)?;
        writer.write_u16::<LittleEndian>(self.count)?;
        writer.write_u32::<LittleEndian>(self.total_size)?;
        Ok(())
    }

    /// Read and validate a header.  Any signature mismatch is
    /// [`ArchiveError::InvalidFormat`].
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 16];
        // Too short to hold the signature: not one of ours.
        reader.read_exact(&mut magic).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => ArchiveError::InvalidFormat,
            _ => ArchiveError::Io(e),
        })?;
        if &magic != MAGIC {
            return Err(ArchiveError::InvalidFormat);
        }
        let count = reader.read_u16::<LittleEndian>().map_err(eof_as_truncated)?;
        let total_size = reader.read_u32::<LittleEndian>().map_err(eof_as_truncated)?;
        Ok(Self { magic, count, total_size })
    }
}
