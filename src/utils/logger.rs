use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::errors::Result;

/// Structured logging setup for the whole binary
pub struct Logger;

impl Logger {
    /// Install the global tracing subscriber. Verbosity defaults to INFO
    /// and follows `RUST_LOG` when set.
    pub fn init() -> Result<()> {
        Self::init_with_default(LevelFilter::INFO)
    }

    pub fn init_with_default(default_level: LevelFilter) -> Result<()> {
        let filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();

        Ok(())
    }
}
