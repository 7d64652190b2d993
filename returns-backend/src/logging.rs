use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use tokio::task;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_RETENTION: Duration = Duration::from_secs(60 * 60 * 24 * 7);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Keeps the non-blocking file writer alive; drop it last.
#[allow(dead_code)]
pub struct LoggerGuard(WorkerGuard);

fn normalize_level(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// Console + daily rolling file logging. `RUST_LOG` overrides `level`.
pub fn init_logging(
    log_dir: impl AsRef<Path>,
    prefix: &str,
    level: &str,
) -> anyhow::Result<LoggerGuard> {
    let log_dir = log_dir.as_ref().to_path_buf();
    let normalized = normalize_level(level);

    let builder = EnvFilter::builder().with_default_directive(normalized.parse()?);
    let rust_log = std::env::var("RUST_LOG").unwrap_or_default();
    let console_filter = builder.clone().parse_lossy(&rust_log);
    let file_filter = builder.parse_lossy(&rust_log);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(&log_dir)?;
    let (non_blocking, guard) = NonBlocking::new(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(file_filter);
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    if normalized != level.to_ascii_lowercase() {
        tracing::warn!("Invalid log level '{}', defaulting to 'info'", level);
    }

    start_log_cleanup_task(log_dir, prefix.to_string());

    Ok(LoggerGuard(guard))
}

fn start_log_cleanup_task(log_dir: PathBuf, prefix: String) {
    task::spawn(async move {
        loop {
            match cleanup_old_logs(&log_dir, &prefix, LOG_RETENTION, SystemTime::now()) {
                Ok(removed) if removed > 0 => tracing::info!("Removed {} old log file(s)", removed),
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to clean up old log files: {}", e),
            }
            tokio::time::sleep(CLEANUP_INTERVAL).await;
        }
    });
}

/// Delete `<prefix>*.log` files last modified more than `max_age` before `now`.
fn cleanup_old_logs(
    log_dir: &Path,
    prefix: &str,
    max_age: Duration,
    now: SystemTime,
) -> std::io::Result<usize> {
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.starts_with(prefix) || !file_name.ends_with(".log") {
            continue;
        }

        let modified = fs::metadata(&path)?.modified()?;
        if now.duration_since(modified).unwrap_or_default() > max_age {
            fs::remove_file(&path)?;
            tracing::debug!("Old log file deleted: {}", file_name);
            removed += 1;
        }
    }
    Ok(removed)
}
