use quantvision::api::{run_server, AppState};
use quantvision::bus::PasteBus;
use quantvision::config::AppConfig;
use quantvision::constants::capture::PASTE_BUS_CAPACITY;
use quantvision::llm::build_backend;
use quantvision::session::Session;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // Setup Logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting QuantVision...");

    // Load Configuration
    let config = AppConfig::load()?;
    info!("Loaded Configuration: {:?}", config);

    info!(
        "Initializing model backend ({}, model: {})...",
        config.llm.provider.as_str(),
        config.llm.model
    );
    if let Some(url) = &config.llm.base_url {
        info!("Using custom model base URL: {}", url);
    }
    let backend = build_backend(&config.llm)?;

    let session = Session::new(backend, config.session.default_timeframe);
    let paste_bus = PasteBus::new(PASTE_BUS_CAPACITY);

    // Released when the server stops, whichever way it exits
    let _paste_listener = session.attach_paste(&paste_bus);

    let app_state = Arc::new(AppState {
        session,
        paste_bus,
        config,
    });

    info!("Initializing API Server...");
    run_server(app_state).await?;

    Ok(())
}
