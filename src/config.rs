use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, SubtradError};

// Default values for optional sections
fn default_keep_alive() -> String {
    "5m".to_string()
}

fn default_chars_per_token() -> f64 {
    3.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub io: IoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Ollama endpoint URL
    pub endpoint: String,
    /// Model used for translation
    pub model: String,
    /// Device the model should run on
    pub device: Device,
    /// Maximum attempts per translation call
    pub max_retries: u32,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// How long the server keeps the model resident after a request
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Force CPU inference
    Cpu,
    /// Let the server offload layers to the GPU
    Gpu,
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Gpu => write!(f, "gpu"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Token budget of a single translation call
    pub max_tokens: usize,
    /// Characters per token assumed by the heuristic counter
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Use the statistical detector before the script heuristics
    pub external: bool,
    /// Number of non-blank cues sampled from a subtitle file
    pub sample_cues: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// How plain text is cut into cues
    pub mode: SegmentationMode,
    /// Duration of every synthesized cue in seconds
    pub cue_duration_secs: f64,
    /// Wrap width of cue text
    pub max_line_chars: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationMode {
    /// One cue per sentence or paragraph
    Sentence,
    /// One cue per non-blank line
    Line,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    /// Encoding label used when a file is neither BOM-marked nor valid UTF-8
    pub fallback_encoding: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            external: true,
            sample_cues: 50,
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            mode: SegmentationMode::Sentence,
            cue_duration_secs: 3.0,
            max_line_chars: 42,
        }
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            fallback_encoding: "windows-1252".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                endpoint: "http://localhost:11434".to_string(),
                model: "llama3.2:3b".to_string(),
                device: Device::Gpu,
                max_retries: 3,
                timeout_secs: 300,
                keep_alive: default_keep_alive(),
            },
            segmentation: SegmentationConfig {
                max_tokens: 480,
                chars_per_token: default_chars_per_token(),
            },
            detection: DetectionConfig::default(),
            synthesis: SynthesisConfig::default(),
            io: IoConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtradError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| SubtradError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubtradError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubtradError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Reject values the segmentation engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.segmentation.max_tokens == 0 {
            return Err(SubtradError::Config("segmentation.max_tokens must be positive".to_string()));
        }
        if !(self.segmentation.chars_per_token > 0.0) {
            return Err(SubtradError::Config("segmentation.chars_per_token must be positive".to_string()));
        }
        if !(self.synthesis.cue_duration_secs > 0.0) {
            return Err(SubtradError::Config("synthesis.cue_duration_secs must be positive".to_string()));
        }
        if self.synthesis.max_line_chars == 0 {
            return Err(SubtradError::Config("synthesis.max_line_chars must be positive".to_string()));
        }
        if encoding_rs::Encoding::for_label(self.io.fallback_encoding.as_bytes()).is_none() {
            return Err(SubtradError::Config(format!(
                "Unknown fallback encoding '{}'", self.io.fallback_encoding
            )));
        }
        Ok(())
    }
}
