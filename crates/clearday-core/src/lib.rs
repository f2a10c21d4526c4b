pub mod app;
pub mod config;
pub mod error;

pub use app::App;
pub use config::{AnalysisConfig, Config, LoggingConfig, ValidationResult};
pub use error::{AppError, ConfigError};

use anyhow::Result;

/// Initialize logging at `info`, or whatever `RUST_LOG` asks for
pub fn init() -> Result<()> {
    init_with_level(&LoggingConfig::default().level)
}

/// Initialize logging to stderr, falling back to `level` when `RUST_LOG` is unset
pub fn init_with_level(level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Clearday core initialized");
    Ok(())
}
