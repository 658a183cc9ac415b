use dotenvy::dotenv;
use std::process;

use po_desk::{
    config::Config,
    create_router,
    store::{FileSlot, RecordStore},
    sync::RemoteClient,
    AppState,
};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let slot = FileSlot::new(&config.store_path);
    log::info!("Purchase orders stored in {}", slot.path().display());
    let store = RecordStore::load(slot);

    let remote = RemoteClient::new(config.remote_api_url.clone(), config.remote_timeout);
    match remote.base_url() {
        Some(url) => log::info!("Remote backend: {}", url),
        None => log::info!("No remote backend configured, records are kept locally only"),
    }

    let app = create_router(AppState::new(store, remote));

    let addr = config.bind_address();
    log::info!("po-desk listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind {}: {}", addr, e);
            process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        log::error!("Server error: {}", e);
        process::exit(1);
    }
}
