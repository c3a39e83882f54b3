//! Portfolio Server Library
//!
//! This module exports the core types and functions for testing and reuse.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod security;
pub mod seed;

pub use config::Config;
pub use db::{open_store, Row, Store};
pub use error::{AppError, Result};

/// Application state shared across all handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Store,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState with the given store and configuration
    pub fn new(store: Store, config: Config) -> Self {
        Self { store, config }
    }
}
