/// TSP command-line tool — produce, stream-decode, and inspect tutor
/// response bodies.
///
/// # Command overview
///
/// ```text
/// tsp <COMMAND> [OPTIONS]
///
/// Commands:
///   encode     Build a response body from a file of text fragments
///   decode     Stream a response body, printing text as it arrives
///   validate   Check that a body decodes to a complete response object
///   replay     Show every decoder event per chunk (chunk-boundary debugging)
///   stats      Print size and delivery statistics for a body
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder state transitions to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// `RUST_LOG` overrides the log filter chosen by `--verbose`.
///
/// # Exit codes
///
/// | Code | Meaning                                 |
/// |------|-----------------------------------------|
/// | 0    | Success                                 |
/// | 1    | Error (I/O failure, invalid body, etc.) |
use std::future::Future;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_encode;
mod cmd_replay;
mod cmd_stats;
mod cmd_validate;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The TSP (Tutor Stream Protocol) command-line tool.
#[derive(Parser)]
#[command(name = "tsp", version, about = "Tutor Stream Protocol CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder state transitions (debug level) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Build a response body from a file of text fragments.
    Encode(EncodeArgs),
    /// Stream a response body, printing text as it arrives.
    Decode(DecodeArgs),
    /// Check that a body decodes to a complete response object.
    Validate(ValidateArgs),
    /// Show every decoder event per chunk.
    Replay(ReplayArgs),
    /// Print size and delivery statistics for a body.
    Stats(StatsArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `tsp encode`.
///
/// Each line of the input (newline included) becomes one fragment, unless
/// `--chars N` splits the text into N-character fragments instead.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                           │
/// ├──────────────┼──────────────────────────────────────────────────┤
/// │ --category   │ value of `currentCategory` (null if omitted)     │
/// │ --word       │ value of `currentWord`                           │
/// │ --progress   │ value of `currentWordProgress`                   │
/// │ --exercises  │ JSON file holding the `exercises` object         │
/// │ --framed     │ write length-prefixed frames instead             │
/// └──────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// File of fragment text (`-` for stdin).
    pub input: PathBuf,

    /// Output file (stdout when omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Split the input into fragments of this many characters.
    #[arg(long)]
    pub chars: Option<usize>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub word: Option<String>,

    #[arg(long)]
    pub progress: Option<String>,

    /// JSON file with the exercise set.
    #[arg(long)]
    pub exercises: Option<PathBuf>,

    /// Emit the length-prefixed frame stream instead of the legacy body.
    #[arg(long)]
    pub framed: bool,
}

/// Arguments for `tsp decode`.
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Response body file (`-` for stdin).
    pub file: PathBuf,

    /// Bytes per transport read.
    #[arg(long, default_value_t = tsp_decoder::config::DEFAULT_READ_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Abort once the body grows past this many bytes.
    #[arg(long, default_value_t = tsp_decoder::config::DEFAULT_MAX_LEN)]
    pub max_len: usize,

    /// Input is a length-prefixed frame stream.
    #[arg(long)]
    pub framed: bool,
}

/// Arguments for `tsp validate`.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Response body file.
    pub file: PathBuf,

    #[arg(long, default_value_t = tsp_decoder::config::DEFAULT_MAX_LEN)]
    pub max_len: usize,
}

/// Arguments for `tsp replay`.
#[derive(clap::Args)]
pub struct ReplayArgs {
    /// Response body file.
    pub file: PathBuf,

    /// Bytes per chunk (rounded up to the next character boundary).
    #[arg(long, default_value_t = 16)]
    pub chunk_size: usize,
}

/// Arguments for `tsp stats`.
#[derive(clap::Args)]
pub struct StatsArgs {
    /// Response body file.
    pub file: PathBuf,

    /// Bytes per simulated transport chunk.
    #[arg(long, default_value_t = 64)]
    pub chunk_size: usize,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Run a future on a single-threaded runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;
    Ok(runtime.block_on(future))
}

/// Split `text` into pieces of at least `size` bytes, each ending on a
/// character boundary.
pub(crate) fn chunk_str(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + size).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(&text[start..end]);
        start = end;
    }
    chunks
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Encode(args) => cmd_encode::run(&args),
        Commands::Decode(args) => cmd_decode::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
        Commands::Replay(args) => cmd_replay::run(&args),
        Commands::Stats(args) => cmd_stats::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
