use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/villa.toml";

/// Where accounts and records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// The hosted identity + table API.
    #[default]
    Hosted,
    /// Process-local demo data; nothing is persisted.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub base_url: String,
    pub anon_key: String,
    /// Prefills the login form. The password is never configurable.
    pub email: String,
    pub timezone: String,
    pub log_level: String,
    pub log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Hosted,
            base_url: "http://127.0.0.1:54321".to_string(),
            anon_key: String::new(),
            email: String::new(),
            timezone: "UTC".to_string(),
            log_level: "info".to_string(),
            log_file: "villa.log".to_string(),
        }
    }
}

impl AppConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| AppError::Setting(format!("unknown timezone: {}", self.timezone)))
    }

    /// Check what can be checked before the terminal is taken over.
    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        if self.backend == BackendKind::Hosted && self.anon_key.trim().is_empty() {
            return Err(AppError::Setting(
                "anon_key is required for the hosted backend".to_string(),
            ));
        }
        Ok(())
    }
}

/// The current date in `tz`.
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

#[derive(Debug, Parser)]
#[command(name = "villa", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the backend.
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,
    /// Override base URL of the hosted project.
    #[arg(long)]
    base_url: Option<String>,
    /// Override the e-mail prefilled in the login form.
    #[arg(long)]
    email: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
    /// Override log file path.
    #[arg(long)]
    log_file: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("VILLA"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(backend) = args.backend {
        settings.backend = backend;
    }
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(email) = args.email {
        settings.email = email;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_utc_and_hosted_backend() {
        let config = AppConfig::default();
        assert_eq!(config.backend, BackendKind::Hosted);
        assert_eq!(config.tz().unwrap(), Tz::UTC);
    }

    #[test]
    fn hosted_backend_needs_an_anon_key() {
        let config = AppConfig::default();
        assert!(matches!(config.validate(), Err(AppError::Setting(_))));

        let demo = AppConfig {
            backend: BackendKind::Memory,
            ..AppConfig::default()
        };
        assert!(demo.validate().is_ok());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let config = AppConfig {
            backend: BackendKind::Memory,
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_values_deserialize() {
        let settings: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "backend = \"memory\"\ntimezone = \"Europe/Rome\"",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.backend, BackendKind::Memory);
        assert_eq!(settings.timezone, "Europe/Rome");
        assert_eq!(settings.log_file, "villa.log");
    }
}
