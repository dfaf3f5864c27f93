use anyhow::Context;
use std::path::PathBuf;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

// Log targets
pub const READING_ORDER: &str = "reading_order";
pub const RECONSTRUCT: &str = "reconstruct";
pub const MATCHER: &str = "matcher";
pub const GEOMETRY: &str = "geometry";

const DEBUG_TARGETS: &[&str] = &[READING_ORDER, RECONSTRUCT, MATCHER, GEOMETRY];

const LOG_FILE_NAME: &str = "delver-highlight.log";

fn build_filter(debug_ops: bool) -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if debug_ops {
        for target in DEBUG_TARGETS {
            if let Ok(directive) = format!("{}=debug", target).parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    filter
}

/// Install the global subscriber: stderr output filtered by `RUST_LOG`, plus a
/// non-blocking file layer under `log_dir` when one is given.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the lifetime of the program. A second call leaves the first subscriber
/// in place.
pub fn init_logging(debug_ops: bool, log_dir: Option<PathBuf>) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(build_filter(debug_ops));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = RollingFileAppender::new(Rotation::NEVER, dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_writer(writer)
                .with_filter(build_filter(debug_ops));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Already initialised (tests, embedding applications): keep the existing one.
    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    Ok(guard)
}
