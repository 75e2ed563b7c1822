use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::backend::{BackendFactory, TranslationBackend};
use crate::config::{Config, Device};
use crate::driver::{DocumentTranslator, TranslationStats};
use crate::encoding::{read_text, write_text};
use crate::error::{Result, SubtradError};
use crate::language::{detect_language, LanguageDetector, WhatlangDetector};
use crate::segment::HeuristicTokenCounter;
use crate::subtitle::SubtitleDocument;
use crate::text::TextDocument;

/// Kind of document an input file holds, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Srt,
    Txt,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("srt") => Ok(InputKind::Srt),
            Some("txt") => Ok(InputKind::Txt),
            _ => Err(SubtradError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Output format used when none is requested
    pub fn default_output(self) -> OutputFormat {
        match self {
            InputKind::Srt => OutputFormat::Srt,
            InputKind::Txt => OutputFormat::Txt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Srt,
    Txt,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Srt => "srt",
            OutputFormat::Txt => "txt",
        }
    }
}

/// Outcome of translating one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub output: PathBuf,
    pub source_language: String,
    pub stats: TranslationStats,
}

/// Outcome of a directory run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub stats: TranslationStats,
}

/// `<dir>/<stem>.<target>.<ext>` next to the input
pub fn default_output_path(input: &Path, target_language: &str, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    input.with_file_name(format!("{}.{}.{}", stem, target_language, format.extension()))
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

pub struct Workflow {
    config: Config,
    backend: Box<dyn TranslationBackend>,
    counter: HeuristicTokenCounter,
    detector: Option<WhatlangDetector>,
    backend_ready: bool,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let backend = BackendFactory::create(config.backend.clone())?;
        Ok(Self::with_backend(config, backend))
    }

    /// Build a workflow around an already constructed backend
    pub fn with_backend(config: Config, backend: Box<dyn TranslationBackend>) -> Self {
        let counter = HeuristicTokenCounter::new(config.segmentation.chars_per_token);
        let detector = config.detection.external.then_some(WhatlangDetector);

        Self {
            config,
            backend,
            counter,
            detector,
            backend_ready: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Move the model to another device, reloading it
    pub async fn set_device(&mut self, device: Device) -> Result<()> {
        if self.backend.device() == device && self.backend_ready {
            return Ok(());
        }

        self.backend.reload(device).await?;
        self.config.backend.device = device;
        self.backend_ready = true;
        Ok(())
    }

    /// Release the model if it was loaded by this workflow
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.backend_ready {
            self.backend.unload().await?;
            self.backend_ready = false;
        }
        Ok(())
    }

    async fn ensure_backend(&mut self) -> Result<()> {
        if !self.backend_ready {
            info!("Loading translation model '{}' on {}", self.config.backend.model, self.backend.device());
            self.backend.load().await?;
            self.backend_ready = true;
        }
        Ok(())
    }

    fn detector(&self) -> Option<&dyn LanguageDetector> {
        self.detector.as_ref().map(|d| d as &dyn LanguageDetector)
    }

    fn detect_subtitle_language(&self, document: &SubtitleDocument) -> String {
        detect_language(&document.language_sample(self.config.detection.sample_cues), self.detector())
    }

    /// Detect the language of a subtitle or text file
    pub async fn detect_file_language<P: AsRef<Path>>(&self, input: P) -> Result<String> {
        let input = input.as_ref();
        let kind = InputKind::from_path(input)?;
        let decoded = read_text(input, &self.config.io.fallback_encoding).await?;

        let language = match kind {
            InputKind::Srt => self.detect_subtitle_language(&SubtitleDocument::parse(&decoded.text)?),
            InputKind::Txt => detect_language(&decoded.text, self.detector()),
        };
        info!("Detected language of {}: {}", input.display(), language);
        Ok(language)
    }

    /// Translate one file.
    ///
    /// `source_language` of `None` requests detection. The output format
    /// defaults to the input kind and the output path to
    /// [`default_output_path`].
    pub async fn translate_file(
        &mut self,
        input: &Path,
        output: Option<&Path>,
        source_language: Option<&str>,
        target_language: &str,
        format: Option<OutputFormat>,
    ) -> Result<FileReport> {
        if !input.exists() {
            return Err(SubtradError::FileNotFound(input.display().to_string()));
        }
        let kind = InputKind::from_path(input)?;
        let format = format.unwrap_or(kind.default_output());

        let decoded = read_text(input, &self.config.io.fallback_encoding).await?;
        let subtitles = match kind {
            InputKind::Srt => Some(SubtitleDocument::parse(&decoded.text)?),
            InputKind::Txt => None,
        };

        let source_language = match source_language {
            Some(code) => code.to_string(),
            None => {
                let detected = match &subtitles {
                    Some(document) => self.detect_subtitle_language(document),
                    None => detect_language(&decoded.text, self.detector()),
                };
                info!("Detected source language: {}", detected);
                detected
            }
        };

        let output = match output {
            Some(path) if format == OutputFormat::Txt => path.with_extension("txt"),
            Some(path) => path.to_path_buf(),
            None => default_output_path(input, target_language, format),
        };

        info!(
            "Translating {} ({:?}, {}) -> {} [{} -> {}]",
            input.display(),
            kind,
            decoded.encoding.name(),
            output.display(),
            source_language,
            target_language
        );

        if source_language != target_language {
            self.ensure_backend().await?;
        }

        let mut translator = DocumentTranslator::new(
            self.backend.as_ref(),
            &self.counter,
            self.config.segmentation.max_tokens,
        )
        .with_progress(progress_bar());

        let content = match (subtitles, format) {
            (Some(document), OutputFormat::Srt) => translator
                .translate_subtitles(&document, &source_language, target_language)
                .await
                .to_srt(),
            (Some(document), OutputFormat::Txt) => {
                translator
                    .translate_flat(&document.plain_text(), &source_language, target_language)
                    .await
            }
            (None, OutputFormat::Txt) => {
                let document = TextDocument::parse(&decoded.text);
                translator
                    .translate_lines(&document, &source_language, target_language)
                    .await
                    .to_text()
            }
            (None, OutputFormat::Srt) => translator
                .synthesize_subtitles(&decoded.text, &source_language, target_language, &self.config.synthesis)
                .await
                .to_srt(),
        };
        let stats = translator.stats();

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        write_text(&output, &content, decoded.encoding).await?;

        info!(
            "Wrote {}: {} translated, {} kept after failure, {} blank",
            output.display(),
            stats.translated,
            stats.failed,
            stats.skipped
        );

        Ok(FileReport {
            output,
            source_language,
            stats,
        })
    }

    /// Translate every `.srt` and `.txt` file below a directory.
    ///
    /// Files that already carry the target language suffix are skipped.
    /// A failing file is logged and counted; the run continues.
    pub async fn process_directory(
        &mut self,
        input_dir: &Path,
        output_dir: Option<&Path>,
        source_language: Option<&str>,
        target_language: &str,
        format: Option<OutputFormat>,
    ) -> Result<BatchSummary> {
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(SubtradError::Config(format!(
                "Input path is not a directory: {}",
                input_dir.display()
            )));
        }

        let translated_suffix = format!(".{}", target_language);
        let mut files = Vec::new();
        for entry in WalkDir::new(input_dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_file() || InputKind::from_path(path).is_err() {
                continue;
            }
            let already_translated = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem.ends_with(&translated_suffix));
            if already_translated {
                continue;
            }
            files.push(path.to_path_buf());
        }
        files.sort();

        info!("Found {} files to translate", files.len());

        let mut summary = BatchSummary::default();
        for file in files {
            let output = output_dir.map(|dir| {
                let relative = file.strip_prefix(input_dir).unwrap_or(&file);
                let format = format.unwrap_or(match InputKind::from_path(&file) {
                    Ok(kind) => kind.default_output(),
                    Err(_) => OutputFormat::Txt,
                });
                default_output_path(&dir.join(relative), target_language, format)
            });

            match self
                .translate_file(&file, output.as_deref(), source_language, target_language, format)
                .await
            {
                Ok(report) => {
                    info!("Successfully processed: {}", file.display());
                    summary.processed += 1;
                    summary.stats += report.stats;
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", file.display(), e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Batch finished: {} files processed, {} failed ({} spans translated, {} kept after failure)",
            summary.processed,
            summary.failed,
            summary.stats.translated,
            summary.stats.failed
        );
        Ok(summary)
    }
}
