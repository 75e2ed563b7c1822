use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::{BackendConfig, Device};
use crate::error::{Result, SubtradError};
use crate::language::language_name;
use super::TranslationBackend;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
    pub keep_alive: String,
    pub options: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
}

/// Translation backend talking to an Ollama server
pub struct OllamaBackend {
    client: Client,
    config: BackendConfig,
    loaded: AtomicBool,
}

impl OllamaBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            loaded: AtomicBool::new(false),
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Model options for the configured device
    fn options(&self) -> Value {
        match self.config.device {
            Device::Cpu => json!({ "num_gpu": 0 }),
            Device::Gpu => json!({}),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// One translation request, no retries
    async fn request_translation(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_translation_prompt(text, source_language, target_language),
            stream: false,
            format: "json".to_string(),
            keep_alive: self.config.keep_alive.clone(),
            options: self.options(),
        };

        let url = self.url("api/generate");
        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SubtradError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubtradError::Translation(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        let generated: GenerateResponse = response.json().await
            .map_err(|e| SubtradError::Translation(format!("Failed to parse response: {}", e)))?;

        debug!("Raw Ollama response: {}", generated.response);
        extract_translation(&generated.response)
    }
}

#[async_trait]
impl TranslationBackend for OllamaBackend {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        let attempts = self.config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.request_translation(text, source_language, target_language).await {
                Ok(translation) => return Ok(translation),
                Err(e) => {
                    if attempt < attempts {
                        warn!("Translation attempt {}/{} failed: {}", attempt, attempts, e);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SubtradError::Translation("No translation attempt made".to_string())))
    }

    async fn load(&self) -> Result<()> {
        let model = &self.config.model;

        let response = self.client
            .post(self.url("api/show"))
            .json(&json!({ "name": model }))
            .send()
            .await
            .map_err(|e| SubtradError::Backend(format!("Failed to connect to Ollama: {}", e)))?;

        if !response.status().is_success() {
            return Err(SubtradError::Backend(format!(
                "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
                model, model
            )));
        }

        // A generate request without a prompt only loads the model
        let response = self.client
            .post(self.url("api/generate"))
            .json(&json!({
                "model": model,
                "keep_alive": self.config.keep_alive,
                "options": self.options(),
            }))
            .send()
            .await
            .map_err(|e| SubtradError::Backend(format!("Failed to load model '{}': {}", model, e)))?;

        if !response.status().is_success() {
            return Err(SubtradError::Backend(format!(
                "Ollama refused to load '{}': HTTP {}", model, response.status()
            )));
        }

        self.loaded.store(true, Ordering::SeqCst);
        info!("Ollama model '{}' loaded on {}", model, self.config.device);
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        if !self.loaded.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let response = self.client
            .post(self.url("api/generate"))
            .json(&json!({ "model": self.config.model, "keep_alive": 0 }))
            .send()
            .await
            .map_err(|e| SubtradError::Backend(format!("Failed to unload model: {}", e)))?;

        if !response.status().is_success() {
            warn!("Ollama did not confirm unloading '{}': HTTP {}", self.config.model, response.status());
        } else {
            info!("Ollama model '{}' unloaded", self.config.model);
        }
        Ok(())
    }

    async fn reload(&mut self, device: Device) -> Result<()> {
        if device == self.config.device && self.is_loaded() {
            return Ok(());
        }

        info!("Switching model '{}' from {} to {}", self.config.model, self.config.device, device);
        self.unload().await?;
        self.config.device = device;
        self.load().await
    }

    fn device(&self) -> Device {
        self.config.device
    }
}

/// Build the JSON-mode translation prompt
fn build_translation_prompt(text: &str, source_language: &str, target_language: &str) -> String {
    let source_name = language_name(source_language);
    let target_name = language_name(target_language);

    format!(
        "You are a professional translator.\n\
         \n\
         Translate the text below from {} to {} (language code: {}).\n\
         Keep every line break exactly where it is. Do not add explanations, \
         alternatives, notes or text in any other language.\n\
         \n\
         Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
         \n\
         [Text to translate]\n\
         {}\n",
        source_name, target_name, target_language, target_name, text
    )
}

/// Pull the translation out of a model response
fn extract_translation(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SubtradError::Translation("Empty translation received".to_string()));
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        let text = map
            .get("text")
            .and_then(Value::as_str)
            .or_else(|| map.values().find_map(Value::as_str));
        return match text.map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(SubtradError::Translation("JSON response carried no translation".to_string())),
        };
    }

    let cleaned = clean_translation_response(raw);
    if cleaned.is_empty() {
        return Err(SubtradError::Translation("Empty translation received".to_string()));
    }
    Ok(cleaned)
}

/// Strip code fences, labels and wrapping quotes from free-form output
fn clean_translation_response(response: &str) -> String {
    let mut text = response.trim();

    if let Some(inner) = text.strip_prefix("```") {
        // Drop an optional language tag on the opening fence
        let inner = inner.split_once('\n').map(|(_, rest)| rest).unwrap_or(inner);
        text = inner.trim_end().strip_suffix("```").unwrap_or(inner).trim();
    }

    for label in ["Translation:", "translation:", "**Translation:**"] {
        if let Some(rest) = text.strip_prefix(label) {
            text = rest.trim();
        }
    }

    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        text = text[1..text.len() - 1].trim();
    }

    text.to_string()
}
