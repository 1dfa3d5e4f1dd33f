// Application state module
// Everything a connection needs, built once before the listener starts

use super::types::Config;
use crate::dispatch::Dispatcher;
use crate::schema::SchemaStore;

/// Application state, shared read-only by every connection
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: Config, store: &SchemaStore) -> Self {
        let dispatcher = Dispatcher::new(store, &config);
        Self { config, dispatcher }
    }
}
