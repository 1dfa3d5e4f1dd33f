use std::path::Path;
use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod dispatch;
mod error;
mod http;
mod logger;
mod schema;
mod server;

/// Settings file used when no path is given on the command line
const DEFAULT_SETTINGS: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS.to_string());
    let cfg = config::Config::load_from(&settings_path)?;
    logger::init(&cfg)?;

    // A broken routing document is fatal: nothing is served without it
    let store = match schema::SchemaStore::load(Path::new(&cfg.service.routing_file)) {
        Ok(store) => store,
        Err(e) => {
            logger::log_error(&e.to_string());
            return Err(e.into());
        }
    };
    if store.is_empty() {
        logger::log_warning("Routing document declares no routes; every request will be 404");
    }

    // Build the Tokio runtime, sizing the worker pool from configuration
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, store))
}

async fn async_main(
    cfg: config::Config,
    store: schema::SchemaStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(config::AppState::new(cfg, &store));
    logger::log_server_start(
        &addr,
        &state.config,
        &store,
        state.dispatcher.handler_count(),
    );

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    server::start_server_loop(listener, state, shutdown).await
}
