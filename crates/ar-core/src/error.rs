//! Errors raised by provider setup and visualizer activation.
//!
//! Per-frame queries never error; they report unavailability through
//! `Option`/`bool` returns instead.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while wiring a provider or visualizer to the host.
#[derive(Debug, Error)]
pub enum ArError {
    /// The background material could not be loaded.
    #[error("background material not found: {0}")]
    MissingMaterial(String),
    /// The plane layer name is not registered with the host.
    #[error("unknown render layer: {0}")]
    UnknownLayer(String),
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
