use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("The directory to compress has no manifest: {0}")]
    MissingManifest(PathBuf),
    #[error("Access denied while writing {path}: {source}")]
    OutputWriteDenied {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Archive not found: {0}")]
    ArchiveNotFound(PathBuf),
    #[error("Output directory already holds a manifest, clear it first: {0}")]
    OutputNotEmpty(PathBuf),
    #[error("Archive does not have the expected format (bad signature)")]
    InvalidFormat,
    #[error("Could not open source file {path}, its slot will be empty: {source}")]
    SourceFileMissing {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed manifest entry on line {line_number}: {line:?}")]
    MalformedManifestEntry { line_number: usize, line: String },
    #[error("Archive is truncated: header or entry table ends early")]
    Truncated,
    #[error("Entry {slot} points outside the archive (start={start}, size={size})")]
    EntryOutOfBounds { slot: usize, start: u32, size: u32 },
    #[error("Too many entries for one archive: {0} (maximum 65535)")]
    TooManyEntries(usize),
    #[error("Archive data exceeds the 4 GiB limit of the format")]
    ArchiveTooLarge,
    #[error("Name {0:?} contains characters outside the single-byte range")]
    UnencodableName(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Reads of fixed-size records report a short stream as [`ArchiveError::Truncated`].
pub(crate) fn eof_as_truncated(e: io::Error) -> ArchiveError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        ArchiveError::Truncated
    } else {
        ArchiveError::Io(e)
    }
}
