// Document translation drivers
//
// Each driver walks one document shape and sends spans to the backend in
// document order, one request at a time:
// - lines: line-preserving plain text
// - flat: whole text packed into chunks, joined by newlines
// - cues: one request per subtitle cue
// - synthesize: plain text cut into timed cues
//
// A failed request never aborts a document: the span keeps its original text.

pub mod lines;
pub mod flat;
pub mod cues;
pub mod synthesize;

use indicatif::ProgressBar;
use tracing::warn;

use crate::backend::TranslationBackend;
use crate::segment::TokenCounter;

pub use synthesize::{segment_text, wrap_text};

/// Per-run counters of backend outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Spans the backend translated
    pub translated: usize,
    /// Spans kept in the original language after a backend error
    pub failed: usize,
    /// Blank spans passed through without a request
    pub skipped: usize,
}

impl std::ops::AddAssign for TranslationStats {
    fn add_assign(&mut self, other: Self) {
        self.translated += other.translated;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Drives a backend over whole documents
pub struct DocumentTranslator<'a> {
    backend: &'a dyn TranslationBackend,
    counter: &'a dyn TokenCounter,
    max_tokens: usize,
    progress: ProgressBar,
    stats: TranslationStats,
}

impl<'a> DocumentTranslator<'a> {
    pub fn new(
        backend: &'a dyn TranslationBackend,
        counter: &'a dyn TokenCounter,
        max_tokens: usize,
    ) -> Self {
        Self {
            backend,
            counter,
            max_tokens,
            progress: ProgressBar::hidden(),
            stats: TranslationStats::default(),
        }
    }

    /// Report progress on the given bar instead of a hidden one
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn stats(&self) -> TranslationStats {
        self.stats
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    fn begin(&self, total: usize, unit: &'static str) {
        self.progress.set_length(total as u64);
        self.progress.set_position(0);
        self.progress.set_message(unit);
    }

    fn finish(&self) {
        self.progress.finish_and_clear();
    }

    /// Translate one span; `None` when the backend failed and the caller
    /// keeps the original
    async fn try_translate(
        &mut self,
        text: &str,
        source_language: &str,
        target_language: &str,
        what: &str,
    ) -> Option<String> {
        match self.backend.translate(text, source_language, target_language).await {
            Ok(translation) => {
                self.stats.translated += 1;
                Some(translation)
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!("Keeping original {} after translation failure: {}", what, e);
                None
            }
        }
    }

    /// Translate one span; on failure return the original text
    async fn translate_or_keep(
        &mut self,
        text: &str,
        source_language: &str,
        target_language: &str,
        what: &str,
    ) -> String {
        self.try_translate(text, source_language, target_language, what)
            .await
            .unwrap_or_else(|| text.to_string())
    }
}
