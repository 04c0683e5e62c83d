//! `villa`: a terminal client for managing a single rental property.

mod app;
mod client;
mod config;
mod demo;
mod error;
mod forms;
mod telemetry;
mod ui;

use std::sync::Arc;

use chrono_tz::Tz;
use engine::{Backend, Engine};

use crate::{
    client::HostedBackend,
    config::{AppConfig, BackendKind},
    error::Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = config::load()?;
    telemetry::init(&config)?;
    let tz = config.tz()?;

    match config.backend {
        BackendKind::Hosted => {
            let backend = HostedBackend::new(&config.base_url, &config.anon_key)?;
            tracing::info!(base_url = %config.base_url, "using hosted backend");
            run(Arc::new(backend), &config, tz).await
        }
        BackendKind::Memory => {
            let backend = demo::seeded_backend(config::today(tz)).await?;
            if config.email.is_empty() {
                config.email = demo::DEMO_EMAIL.to_string();
            }
            tracing::info!("using in-memory demo backend");
            run(Arc::new(backend), &config, tz).await
        }
    }
}

async fn run<B: Backend>(backend: Arc<B>, config: &AppConfig, tz: Tz) -> Result<()> {
    let engine = Engine::builder().backend(backend).build().await?;
    let mut app = app::App::new(engine, config, tz);
    let result = app.run().await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "villa exited with an error");
    }
    result
}
