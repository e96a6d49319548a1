pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod prepare;
pub mod provider;
pub mod server;

#[cfg(test)]
mod tests;

pub use client::SubmissionClient;
pub use config::{Config, ProviderConfig};
pub use error::{DecorError, Result};
pub use models::*;
pub use orchestrator::{GenerationSettings, VariationOrchestrator};
pub use prepare::{ImagePreparer, PrepareSettings, PreparedImage};
pub use provider::ImageClient;
