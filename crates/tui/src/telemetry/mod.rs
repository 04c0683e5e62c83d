use std::{fs::OpenOptions, sync::Mutex};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
};

/// Log to `config.log_file`; the terminal itself belongs to the UI.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(&config.log_level))
            .map_err(|err| AppError::Logging(err.to_string()))?,
    };
    let fmt_layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))?;

    tracing::info!(backend = ?config.backend, "villa starting");
    Ok(())
}

fn default_directives(level: &str) -> String {
    let level = level.trim();
    format!("villa={level},engine={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_both_crates() {
        assert_eq!(default_directives(" debug "), "villa=debug,engine=debug");
        assert!(EnvFilter::try_new(default_directives("warn")).is_ok());
    }
}
