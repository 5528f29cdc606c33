use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ConfigError;
use crate::settings::LoggingSettings;

/// Installs the global tracing subscriber.
///
/// Events go to stdout and to a daily-rotating file under
/// `settings.directory`. `RUST_LOG` overrides `settings.level` when present.
///
/// The returned guard flushes the file writer on drop, so the caller must keep
/// it alive for as long as the process runs.
pub fn init_tracing(settings: &LoggingSettings) -> Result<WorkerGuard, ConfigError> {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(settings.file_prefix.clone())
        .max_log_files(settings.max_files)
        .build(&settings.directory)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_writer(file_writer),
        )
        .try_init()?;

    tracing::info!(
        directory = %settings.directory.display(),
        "Logging setup complete"
    );
    Ok(guard)
}
