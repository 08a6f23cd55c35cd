//! Arclight binary entry point.

use arclight::app;
use arclight::config::ConfigLoader;
use arclight::module::{ModuleConfig, ModuleContract};
use arclight::modules::http::server::HttpServer;
use arclight::modules::tracing::tracer::TracingModule;
use arclight::modules::tracing::Tracer;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "arclight.toml".to_string());
    let config = ConfigLoader::new().load_or_default(&config_path)?;

    let mut tracing_module = TracingModule::new(config.tracing.clone());
    tracing_module.init(ModuleConfig::new())?;
    tracing_module.start()?;
    let tracer = tracing_module
        .tracer()
        .cloned()
        .unwrap_or_else(|| Arc::new(Tracer::from_config(&config.tracing)));

    let routes = app::routes()?;
    let mut server = HttpServer::new(config.http.clone(), routes, tracer);
    server.init(ModuleConfig::new())?;
    server.start()?;

    info!(
        addr = %server.local_addr().map(|a| a.to_string()).unwrap_or_default(),
        service = %config.tracing.service_name,
        "arclight started"
    );

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    server.stop()?;
    tracing_module.stop()?;
    Ok(())
}
