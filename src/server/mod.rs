//! JSON-RPC 2.0 adapter over stdio.
//!
//! This module provides:
//! - The line-delimited JSON-RPC server
//! - Tool call handlers mapping onto the engine operations
//! - Shared application state

mod handlers;
mod rpc;

pub use handlers::*;
pub use rpc::*;

use std::sync::Arc;

use crate::config::Config;
use crate::engine::HierarchicalEngine;
use crate::error::AppResult;

/// Application state shared across handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// The reasoning engine serving every tool.
    pub engine: HierarchicalEngine,
}

impl AppState {
    pub fn new(config: Config, engine: HierarchicalEngine) -> Self {
        Self { config, engine }
    }

    /// Build the engine described by `config`.
    pub fn from_config(config: Config) -> AppResult<Self> {
        let engine = HierarchicalEngine::from_config(&config)?;
        Ok(Self::new(config, engine))
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;
