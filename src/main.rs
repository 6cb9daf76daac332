use clap::Parser;
use mzbin::archive::{self, Options};
use mzbin::io_stream::DEFAULT_CHUNK_SIZE;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_ARCHIVE: &str = "C:/Program Files (x86)/Tierras del Sur 2/Recursos/Graficos.TDS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Compress,
    Decompress,
    List,
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    match s.to_lowercase().as_str() {
        "compress" | "comprimir"       => Ok(Mode::Compress),
        "decompress" | "descomprimir"  => Ok(Mode::Decompress),
        "list" | "listar"              => Ok(Mode::List),
        other => Err(format!("invalid option '{other}' (expected compress, decompress or list)")),
    }
}

#[derive(Parser)]
#[command(name = "mzbin", about = "Extract and rebuild MZ Engine resource archives")]
struct Cli {
    /// compress | decompress | list (case-insensitive)
    #[arg(value_parser = parse_mode, default_value = "decompress")]
    mode: Mode,
    /// Archive to read or write
    #[arg(default_value = DEFAULT_ARCHIVE)]
    archive: PathBuf,
    /// Loose-file directory holding index.txt
    #[arg(default_value = "./out")]
    directory: PathBuf,
    /// Copy buffer size in KiB
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE / 1024)]
    chunk_size: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // clap exits with status 2 on usage errors, including an unknown mode.
    let cli = Cli::parse();
    let opts = Options {
        chunk_size: cli.chunk_size.max(1) * 1024,
        ..Options::default()
    };

    match run(&cli, &opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, opts: &Options) -> Result<(), mzbin::ArchiveError> {
    match cli.mode {

        // ── Compress ─────────────────────────────────────────────────────────
        Mode::Compress => {
            let report = archive::compress(&cli.directory, &cli.archive, opts)?;
            println!("100% - {} files compressed", report.files);
            if !report.warnings.is_empty() {
                println!("{} file(s) could not be opened; the game may misbehave", report.warnings.len());
            }
        }

        // ── Decompress ───────────────────────────────────────────────────────
        Mode::Decompress => {
            let report = archive::decompress(&cli.archive, &cli.directory, opts)?;
            println!("100% - {} files saved", report.files);
        }

        // ── List ─────────────────────────────────────────────────────────────
        Mode::List => {
            let listing = archive::list(&cli.archive)?;
            println!("Archive: {}", cli.archive.display());
            println!("  Entries    {}", listing.header.count);
            println!("  Data size  {} B", listing.header.data_len());
            println!("{:>5} {:<32} {:>10} {:>10} {:>4}  Ext", "Slot", "Name", "Size", "Start", "Code");
            for e in &listing.entries {
                match &e.logical_name {
                    Some(name) => println!("{:>5} {:<32} {:>10} {:>10} {:>4}  {}",
                        e.slot, name, e.size, e.start, e.code,
                        e.extension.map(|x| x.as_str()).unwrap_or("")),
                    None => println!("{:>5} {:<32}", e.slot, mzbin::SENTINEL),
                }
            }
        }
    }

    Ok(())
}
