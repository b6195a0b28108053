//! Team to-do service: session-authenticated users keep personal task lists,
//! administrators manage the accounts. All state lives in memory.

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod handler;
pub mod ledger;
pub mod middleware;
pub mod model;
pub mod route;
pub mod schema;
pub mod session;
pub mod store;

use std::sync::Arc;

use axum::Router;

use crate::{config::Config, session::SessionStore, store::Store};

// Struct representing the application state
pub struct AppState {
    pub store: Store,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(store: Store, config: &Config) -> Self {
        Self {
            store,
            sessions: SessionStore::new(config.session_secret.as_bytes()),
        }
    }
}

/// Router over a freshly seeded store.
pub fn app(config: &Config) -> Router {
    let state = Arc::new(AppState::new(Store::seeded(), config));
    route::create_router(state, config)
}
