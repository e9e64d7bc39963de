use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::Config;

/// Installs the global subscriber writing to a daily rolling file.
///
/// Keep the returned guard alive for the life of the process or buffered
/// lines are lost on exit.
pub fn init(config: &Config, file_name: &str) -> WorkerGuard {
    let file_appender = rolling::daily(&config.log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    guard
}
