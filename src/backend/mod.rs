// Translation backends
//
// A backend owns the model handle and its lifecycle:
// - load: make the model resident (verifies it exists first)
// - unload: release it
// - reload: switch device, unloading and loading again
// Drivers only ever call `translate`, one request at a time.

pub mod ollama;

use async_trait::async_trait;

pub use ollama::OllamaBackend;
use crate::config::{BackendConfig, Device};
use crate::error::Result;

/// Fallible text translation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate `text` from `source_language` to `target_language`
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String>;

    /// Make the model ready for requests
    async fn load(&self) -> Result<()>;

    /// Release the model
    async fn unload(&self) -> Result<()>;

    /// Move the model to another device
    async fn reload(&mut self, device: Device) -> Result<()>;

    /// Device the model currently targets
    fn device(&self) -> Device;
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create the default backend (Ollama over HTTP)
    pub fn create(config: BackendConfig) -> Result<Box<dyn TranslationBackend>> {
        Ok(Box::new(OllamaBackend::new(config)?))
    }
}
