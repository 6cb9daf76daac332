pub mod error;
pub mod header;
pub mod entry;
pub mod cipher;
pub mod sniff;
pub mod naming;
pub mod manifest;
pub mod io_stream;
pub mod archive;

pub use error::{ArchiveError, Result};
pub use header::{Header, MAGIC};
pub use entry::FileEntry;
pub use manifest::{Manifest, ManifestLine, SENTINEL};
pub use archive::{compress, decompress, list, Options};
