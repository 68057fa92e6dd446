use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_LOG_FILE: &str = "./logs/missing-link.log";

/// Pretty stdout plus a non-blocking plain-text file layer. Keep the
/// returned guard alive until exit so buffered file output is flushed.
///
/// `TRACING_LEVEL` takes an `EnvFilter` directive, `LOG_FILE_PATH` the log
/// file location.
pub fn init_logger() -> impl Drop {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (log_dir, log_name) = split_log_path(Path::new(&log_file_path));

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .pretty()
                .with_file(false)
                .with_line_number(false)
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(false)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    debug!("Logging to {}", log_dir.join(&log_name).display());

    guard
}

/// Directory and file name for the appender. A bare name lands in the
/// working directory; a path without a file name falls back to the default
/// name inside it.
fn split_log_path(path: &Path) -> (PathBuf, PathBuf) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    match path.file_name() {
        Some(name) => (dir, PathBuf::from(name)),
        None => (path.to_path_buf(), PathBuf::from("missing-link.log")),
    }
}
