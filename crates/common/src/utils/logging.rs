use std::{fs::OpenOptions, io, path::Path, sync::Mutex};
use tracing_subscriber::{fmt, fmt::writer::MakeWriterExt, EnvFilter};

fn default_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,tower_http=info,axum=info`
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(default_filter("info,tower_http=info,axum=info"))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output on stdout.
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(default_filter("info,service=debug"))
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing with stdout plus an append-only log file.
///
/// The file is opened once here and shared by every event for the lifetime
/// of the process.
pub fn init_logging_with_file(path: impl AsRef<Path>, json: bool) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let writer = io::stdout.and(Mutex::new(file));

    let res = if json {
        fmt()
            .with_env_filter(default_filter("info,service=debug"))
            .with_target(false)
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .try_init()
    } else {
        fmt()
            .with_env_filter(default_filter("info,tower_http=info,axum=info"))
            .with_target(false)
            .with_ansi(false)
            .compact()
            .with_writer(writer)
            .try_init()
    };
    res.map_err(|e| anyhow::anyhow!("cannot install log subscriber: {e}"))
}
