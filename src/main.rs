use change_stream::{journal::Journal, router, AppState};
use log::{error, info};
use service::{config::Config, logging::Logger};
use sse::{ChangeStream, Changeable};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting change stream for [{}] in {} mode",
        config.collection_name(),
        config.runtime_env()
    );

    let journal = Journal::new(config.collection_name());
    let collection: Arc<dyn Changeable> = Arc::new(journal.clone());
    let change_stream = match ChangeStream::new(Some(collection), config.stream_config()) {
        Ok(change_stream) => change_stream,
        Err(e) => {
            error!("Failed to build change stream: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(journal, change_stream);

    let listen_address = config.listen_address();
    let listener = match TcpListener::bind(&listen_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {listen_address}: {e}");
            std::process::exit(1);
        }
    };

    info!("Listening on {listen_address}");

    if let Err(e) = axum::serve(listener, router::define_routes(app_state)).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
