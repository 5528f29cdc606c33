use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from file: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    #[error("Failed to open the log file appender: {0}")]
    LogFileError(#[from] tracing_appender::rolling::InitError),

    #[error("Invalid log filter directive: {0}")]
    LogFilterError(#[from] tracing_subscriber::filter::ParseError),

    #[error("A global tracing subscriber is already installed: {0}")]
    LoggerInitError(#[from] tracing_subscriber::util::TryInitError),
}
