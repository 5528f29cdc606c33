use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{Config, DatabaseSettings, LoggingSettings, ServerSettings};

/// The file consulted when no `--config` flag is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Command-line flags shared by every binary that loads configuration.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Path to the TOML configuration file. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: std::path::PathBuf,
}

/// Loads the application configuration.
///
/// Sources, lowest to highest precedence: built-in defaults, the TOML file at
/// `path` (optional), `DIET__`-prefixed environment variables
/// (e.g. `DIET__SERVER__PORT=8080`), and finally `DATABASE_URL`. A `.env`
/// file in the working directory is loaded into the environment first.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let builder = config::Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix("DIET")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?;

    finish(builder)
}

/// Builds, deserializes and validates a prepared set of sources.
fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
