use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtradError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Translation backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Subtitle parse error: {0}")]
    SubtitleParse(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Language detection error: {0}")]
    Detection(String),
}

pub type Result<T> = std::result::Result<T, SubtradError>;
