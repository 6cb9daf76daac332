//! High-level conversion API, the primary embedding surface.
//!
//! ```no_run
//! use mzbin::archive::{compress, decompress, Options};
//!
//! // Archive → directory + index.txt
//! let report = decompress("Graficos.TDS", "out", &Options::default())?;
//! println!("{} files extracted", report.files);
//!
//! // Directory + index.txt → archive
//! compress("out", "Graficos.TDS", &Options::default())?;
//! # Ok::<(), mzbin::ArchiveError>(())
//! ```

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::entry::{FileEntry, NAME_LEN};
use crate::error::{ArchiveError, Result};
use crate::header::Header;
use crate::io_stream::{copy_chunked, MzReader, MzWriter, DEFAULT_CHUNK_SIZE};
use crate::manifest::{Manifest, ManifestLine, MANIFEST_NAME};
use crate::naming::{encode_name, output_name, resolve_collision};
use crate::sniff::{extension_for, Extension};

// ── Options ───────────────────────────────────────────────────────────────────

/// Settings threaded through every conversion.
#[derive(Debug, Clone)]
pub struct Options {
    /// Copy buffer size in bytes.
    pub chunk_size:    usize,
    /// Manifest file name inside the loose-file directory.
    pub manifest_name: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            chunk_size:    DEFAULT_CHUNK_SIZE,
            manifest_name: MANIFEST_NAME.to_owned(),
        }
    }
}

// ── Reports ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct PackReport {
    pub header:    Header,
    pub files:     usize,
    pub sentinels: usize,
    /// One [`ArchiveError::SourceFileMissing`] per slot left empty.
    pub warnings:  Vec<ArchiveError>,
}

#[derive(Debug)]
pub struct UnpackReport {
    pub header:    Header,
    pub manifest:  Manifest,
    pub files:     usize,
    pub sentinels: usize,
}

/// One table slot as shown by [`list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub slot:         usize,
    /// `None` for sentinel slots.
    pub logical_name: Option<String>,
    pub size:         u32,
    pub start:        u32,
    pub code:         u8,
    pub extension:    Option<Extension>,
}

#[derive(Debug)]
pub struct Listing {
    pub header:  Header,
    pub entries: Vec<EntryInfo>,
}

// ── Compress ──────────────────────────────────────────────────────────────────

/// Build `archive_path` from `dir` and its manifest, drawing per-entry
/// cipher codes from an entropy-seeded generator.
pub fn compress<P: AsRef<Path>, Q: AsRef<Path>>(dir: P, archive_path: Q, opts: &Options) -> Result<PackReport> {
    compress_with_rng(dir, archive_path, opts, &mut StdRng::from_entropy())
}

/// [`compress`] with a caller-supplied code source.
pub fn compress_with_rng<P, Q, G>(dir: P, archive_path: Q, opts: &Options, rng: &mut G) -> Result<PackReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    G: Rng,
{
    let dir = dir.as_ref();
    let archive_path = archive_path.as_ref();

    let manifest_path = dir.join(&opts.manifest_name);
    if !manifest_path.exists() {
        return Err(ArchiveError::MissingManifest(manifest_path));
    }
    let manifest = Manifest::from_bytes(&fs::read(&manifest_path)?)?;
    if manifest.len() > usize::from(u16::MAX) {
        return Err(ArchiveError::TooManyEntries(manifest.len()));
    }

    // Encode every name before the archive exists, so a bad manifest
    // leaves nothing behind.
    let mut staged: Vec<Option<(&str, FileEntry)>> = Vec::with_capacity(manifest.len());
    for line in &manifest.lines {
        match line {
            ManifestLine::Sentinel => staged.push(None),
            ManifestLine::Named { file_name, logical_name } => {
                let (entry, cut) = FileEntry::named(&encode_name(logical_name)?, rng.gen());
                if cut {
                    warn!(name = %logical_name, "logical name longer than {NAME_LEN} bytes, truncated");
                }
                staged.push(Some((file_name.as_str(), entry)));
            }
        }
    }

    // Build next to the target and move it into place only once the
    // header is patched; the temp file is deleted on any earlier error.
    let parent = archive_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let tmp = NamedTempFile::new_in(parent).map_err(|source| write_denied(archive_path, source))?;
    info!(archive = %archive_path.display(), slots = staged.len(), "compressing");

    let total = staged.len();
    let mut writer = MzWriter::with_chunk_size(BufWriter::new(tmp), total, opts.chunk_size)?;
    let mut files = 0;
    let mut sentinels = 0;
    let mut warnings = Vec::new();

    for (slot, item) in staged.into_iter().enumerate() {
        let Some((file_name, entry)) = item else {
            writer.push_sentinel()?;
            sentinels += 1;
            continue;
        };
        let source_path = dir.join(file_name);
        match open_source(&source_path) {
            Ok(mut source) => {
                let size = writer.push_file(entry, &mut source)?;
                files += 1;
                info!(slot, percent = slot * 100 / total, file = file_name, size, "packed");
            }
            Err(source) => {
                let skipped = ArchiveError::SourceFileMissing { path: source_path, source };
                warn!(slot, "{skipped}");
                writer.push_unbacked(entry)?;
                warnings.push(skipped);
            }
        }
    }

    let header = writer.finalize()?;
    let tmp = writer.into_inner().into_inner().map_err(|e| e.into_error())?;
    tmp.persist(archive_path)
        .map_err(|e| write_denied(archive_path, e.error))?;

    info!(count = header.count, files, sentinels, "archive written");
    Ok(PackReport { header, files, sentinels, warnings })
}

/// Open a manifest-listed source.  Anything but a regular file (a
/// directory, an empty name resolving to `dir` itself) is refused.
fn open_source(path: &Path) -> io::Result<File> {
    let file = File::open(path)?;
    if !file.metadata()?.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
    }
    Ok(file)
}

// ── Decompress ────────────────────────────────────────────────────────────────

/// Extract every blob of `archive_path` into `dir` and write its manifest.
///
/// `dir` is created if absent.  A `dir` that already holds a manifest is
/// refused.  The manifest is written last; if extraction fails part way,
/// the files this call already wrote are removed again so a rerun starts
/// from the same directory state.
pub fn decompress<P: AsRef<Path>, Q: AsRef<Path>>(archive_path: P, dir: Q, opts: &Options) -> Result<UnpackReport> {
    let archive_path = archive_path.as_ref();
    let dir = dir.as_ref();

    if !archive_path.exists() {
        return Err(ArchiveError::ArchiveNotFound(archive_path.to_owned()));
    }
    let manifest_path = dir.join(&opts.manifest_name);
    if manifest_path.exists() {
        return Err(ArchiveError::OutputNotEmpty(manifest_path));
    }

    let mut reader = MzReader::open(BufReader::new(File::open(archive_path)?))?;
    fs::create_dir_all(dir)?;
    info!(archive = %archive_path.display(), slots = reader.entries.len(), "decompressing");

    let mut written = Vec::new();
    let manifest = match extract_entries(&mut reader, dir, &manifest_path, opts, &mut written) {
        Ok(manifest) => manifest,
        Err(e) => {
            for path in &written {
                if let Err(rm) = fs::remove_file(path) {
                    warn!(path = %path.display(), "could not remove partial output: {rm}");
                }
            }
            return Err(e);
        }
    };

    let files = written.len();
    let sentinels = manifest.sentinel_count();
    info!(files, sentinels, "archive extracted");
    Ok(UnpackReport { header: reader.header, manifest, files, sentinels })
}

/// Write every non-sentinel blob, then the manifest.  Each created path is
/// pushed to `written` as soon as it exists.
fn extract_entries<R: Read + Seek>(
    reader:        &mut MzReader<R>,
    dir:           &Path,
    manifest_path: &Path,
    opts:          &Options,
    written:       &mut Vec<PathBuf>,
) -> Result<Manifest> {
    let total = reader.entries.len();
    let mut manifest = Manifest::default();
    let mut buf = vec![0u8; opts.chunk_size.max(1)];

    for slot in 0..total {
        let entry = reader.entries[slot].clone();
        if entry.is_sentinel() {
            manifest.push(ManifestLine::Sentinel);
            continue;
        }
        let logical_name = entry.logical_name();

        let mut blob = reader.entry_reader(slot)?;
        let mut first = [0u8; 1];
        blob.read_exact(&mut first)?;
        let path = resolve_collision(dir, &output_name(&logical_name, extension_for(first[0])));

        let mut out = File::create(&path).map_err(|source| write_denied(&path, source))?;
        written.push(path.clone());
        out.write_all(&first)?;
        copy_chunked(&mut blob, &mut out, &mut buf)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(slot, percent = slot * 100 / total, name = %logical_name, size = entry.size, "extracted");
        manifest.push(ManifestLine::Named { file_name, logical_name });
    }

    fs::write(manifest_path, manifest.to_bytes()?)
        .map_err(|source| write_denied(manifest_path, source))?;
    Ok(manifest)
}

// ── List ──────────────────────────────────────────────────────────────────────

/// Decode the header and table without extracting anything.
pub fn list<P: AsRef<Path>>(archive_path: P) -> Result<Listing> {
    let archive_path = archive_path.as_ref();
    if !archive_path.exists() {
        return Err(ArchiveError::ArchiveNotFound(archive_path.to_owned()));
    }
    let mut reader = MzReader::open(BufReader::new(File::open(archive_path)?))?;

    let mut entries = Vec::with_capacity(reader.entries.len());
    for slot in 0..reader.entries.len() {
        let entry = reader.entries[slot].clone();
        let (logical_name, extension) = if entry.is_sentinel() {
            (None, None)
        } else {
            let mut first = [0u8; 1];
            reader.entry_reader(slot)?.read_exact(&mut first)?;
            (Some(entry.logical_name()), Some(extension_for(first[0])))
        };
        entries.push(EntryInfo {
            slot,
            logical_name,
            size:  entry.size,
            start: entry.start,
            code:  entry.code,
            extension,
        });
    }
    Ok(Listing { header: reader.header, entries })
}

fn write_denied(path: &Path, source: io::Error) -> ArchiveError {
    ArchiveError::OutputWriteDenied { path: PathBuf::from(path), source }
}
