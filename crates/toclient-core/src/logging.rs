//! Tracing setup for the CLI.
//!
//! Events go to an append-only file in the XDG state dir so request
//! diagnostics (version fallback, re-login, retries) survive the process.
//! `RUST_LOG` overrides the default filter.

use anyhow::{anyhow, Result};
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Debug for our own crates, info for everything else.
const DEFAULT_FILTER: &str = "info,toclient_core=debug,toclient=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// One write target per event: the shared log file, or stderr if its handle
/// could not be duplicated.
enum LogSink {
    File(File),
    Stderr,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct LogFile(File);

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(f) => LogSink::File(f),
            Err(_) => LogSink::Stderr,
        }
    }
}

/// `~/.local/state/toclient/toclient.log`
pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("toclient")?;
    Ok(xdg_dirs.get_state_home().join("toclient").join("toclient.log"))
}

/// Send tracing output to `log_path()`.
///
/// Fails when the file cannot be opened or a subscriber is already set;
/// the CLI then calls `init_logging_stderr`.
pub fn init_logging() -> Result<()> {
    let path = log_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(BoxMakeWriter::new(LogFile(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))?;

    tracing::info!(path = %path.display(), version = env!("CARGO_PKG_VERSION"), "toclient logging started");
    Ok(())
}

/// Send tracing output to stderr. Does nothing if a subscriber is already set.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
