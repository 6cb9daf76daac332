//! Streaming archive engine: writer and reader.
//!
//! # Layout
//! ```text
//! [ Header (22 B) ][ FileEntry (78 B) × count ][ data blob ]
//! ```
//! All integers are little-endian and records are packed.
//!
//! # Writer
//! [`MzWriter`] is told the slot count up front, reserves the header and
//! table with zeros, then appends each source stream directly after the
//! previous one in `chunk_size` pieces.  `finalize()` patches the header
//! and the full table in place at offset 0.
//!
//! # Reader
//! [`MzReader`] reads the header (failing hard on a foreign signature),
//! the whole table, and checks every entry's range against the stream
//! length before handing out any data.  Ranges may appear in any order.

use std::io::{self, Read, Seek, SeekFrom, Write};
use tracing::{debug, warn};

use crate::entry::{FileEntry, ENTRY_SIZE};
use crate::error::{ArchiveError, Result};
use crate::header::{Header, HEADER_SIZE};

/// Default copy buffer: 8 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Offset where the data blob begins for a table of `count` slots.
pub fn data_start(count: usize) -> u64 {
    (HEADER_SIZE + count * ENTRY_SIZE) as u64
}

/// Copy `src` to `dst` through `buf`, returning the byte count.
pub fn copy_chunked<R: Read + ?Sized, W: Write + ?Sized>(
    src: &mut R,
    dst: &mut W,
    buf: &mut [u8],
) -> io::Result<u64> {
    let mut total = 0u64;
    loop {
        let n = match src.read(buf) {
            Ok(0)  => return Ok(total),
            Ok(n)  => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dst.write_all(&buf[..n])?;
        total += n as u64;
    }
}

// ── Writer ───────────────────────────────────────────────────────────────────

pub struct MzWriter<W: Write + Seek> {
    writer:         W,
    slots:          usize,
    pub entries:    Vec<FileEntry>,
    data_len:       u32,
    pub chunk_size: usize,
}

impl<W: Write + Seek> MzWriter<W> {
    pub fn new(writer: W, slots: usize) -> Result<Self> {
        Self::with_chunk_size(writer, slots, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(mut writer: W, slots: usize, chunk_size: usize) -> Result<Self> {
        if slots > usize::from(u16::MAX) {
            return Err(ArchiveError::TooManyEntries(slots));
        }
        writer.seek(SeekFrom::Start(0))?;
        // reserved; overwritten on finalize
        writer.write_all(&vec![0u8; data_start(slots) as usize])?;
        Ok(Self {
            writer,
            slots,
            entries:    Vec::with_capacity(slots),
            data_len:   0,
            chunk_size: chunk_size.max(1),
        })
    }

    fn claim_slot(&self) -> Result<()> {
        if self.entries.len() >= self.slots {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("writer was sized for {} slots", self.slots),
            )
            .into());
        }
        Ok(())
    }

    /// Stage a zero-size placeholder slot.
    pub fn push_sentinel(&mut self) -> Result<()> {
        self.claim_slot()?;
        self.entries.push(FileEntry::sentinel());
        Ok(())
    }

    /// Stage a named slot whose source could not be read.  It keeps its
    /// name but gets no bytes, `size` and `start` stay zero.
    pub fn push_unbacked(&mut self, entry: FileEntry) -> Result<()> {
        self.claim_slot()?;
        self.entries.push(FileEntry { size: 0, start: 0, ..entry });
        Ok(())
    }

    /// Append everything `source` yields as the next slot's blob.
    /// Returns the number of bytes copied.
    pub fn push_file<R: Read + ?Sized>(&mut self, mut entry: FileEntry, source: &mut R) -> Result<u32> {
        self.claim_slot()?;
        let offset = self.writer.stream_position()?;
        let start = u32::try_from(offset + 1).map_err(|_| ArchiveError::ArchiveTooLarge)?;

        let mut buf = vec![0u8; self.chunk_size];
        let copied = copy_chunked(source, &mut self.writer, &mut buf)?;
        let size = u32::try_from(copied).map_err(|_| ArchiveError::ArchiveTooLarge)?;
        self.data_len = self.data_len
            .checked_add(size)
            .ok_or(ArchiveError::ArchiveTooLarge)?;

        entry.start = start;
        entry.size  = size;
        self.entries.push(entry);
        Ok(size)
    }

    /// Write the header and the full table at offset 0.  Must be called
    /// once, after every slot has been staged.
    pub fn finalize(&mut self) -> Result<Header> {
        if self.entries.len() != self.slots {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} of {} slots staged", self.entries.len(), self.slots),
            )
            .into());
        }
        let header = Header::new(self.slots as u16, self.data_len)?;

        let end = self.writer.stream_position()?;
        self.writer.seek(SeekFrom::Start(0))?;
        header.write(&mut self.writer)?;
        for entry in &self.entries {
            entry.write(&mut self.writer)?;
        }
        self.writer.seek(SeekFrom::Start(end))?;
        self.writer.flush()?;

        debug!(count = header.count, total_size = header.total_size, "archive header written");
        Ok(header)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

// ── Reader ───────────────────────────────────────────────────────────────────

pub struct MzReader<R: Read + Seek> {
    reader:          R,
    pub header:      Header,
    pub entries:     Vec<FileEntry>,
    pub archive_len: u64,
}

impl<R: Read + Seek> MzReader<R> {
    /// Decode the header and table, then verify every entry's range.
    pub fn open(mut reader: R) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let header = Header::read(&mut reader)?;
        let entries = (0..header.count)
            .map(|_| FileEntry::read(&mut reader))
            .collect::<Result<Vec<_>>>()?;
        let archive_len = reader.seek(SeekFrom::End(0))?;
        debug!(count = header.count, total_size = header.total_size, archive_len, "archive table read");

        let blob_start = data_start(entries.len());
        let mut sum = 0u64;
        for (slot, e) in entries.iter().enumerate() {
            if e.is_sentinel() {
                continue;
            }
            let in_bounds = e.data_offset().is_some_and(|off| {
                off >= blob_start && off + u64::from(e.size) <= archive_len
            });
            if !in_bounds {
                return Err(ArchiveError::EntryOutOfBounds { slot, start: e.start, size: e.size });
            }
            sum += u64::from(e.size);
        }
        if sum != u64::from(header.data_len()) {
            warn!(declared = header.data_len(), actual = sum, "header total size disagrees with table");
        }

        Ok(Self { reader, header, entries, archive_len })
    }

    /// Bounded reader over one slot's blob.  Sentinels yield nothing.
    pub fn entry_reader(&mut self, slot: usize) -> io::Result<io::Take<&mut R>> {
        let entry = self.entries.get(slot).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no slot {slot}"))
        })?;
        let size = u64::from(entry.size);
        let offset = entry.data_offset().unwrap_or(0);
        self.reader.seek(SeekFrom::Start(offset))?;
        Ok((&mut self.reader).take(size))
    }

    /// Whole blob of one slot.
    pub fn read_entry(&mut self, slot: usize) -> io::Result<Vec<u8>> {
        let mut take = self.entry_reader(slot)?;
        let mut out = Vec::with_capacity(take.limit() as usize);
        take.read_to_end(&mut out)?;
        Ok(out)
    }
}
