use tracing::info;

use crate::subtitle::{normalize_cue_text, Cue, SubtitleDocument};
use super::DocumentTranslator;

impl DocumentTranslator<'_> {
    /// Translate every cue independently, one request per cue.
    ///
    /// Indices and timestamps are copied unchanged. Cue text is sent whole,
    /// without packing.
    pub async fn translate_cues(
        &mut self,
        cues: &[Cue],
        source_language: &str,
        target_language: &str,
    ) -> Vec<Cue> {
        if source_language == target_language {
            info!("Source and target language are both '{}', keeping cues as is", source_language);
            return cues.to_vec();
        }

        info!("Translating {} cues from {} to {}", cues.len(), source_language, target_language);
        self.begin(cues.len(), "cues");

        let mut translated = Vec::with_capacity(cues.len());
        for cue in cues {
            let text = if cue.text.trim().is_empty() {
                self.stats.skipped += 1;
                cue.text.clone()
            } else {
                match self.try_translate(&cue.text, source_language, target_language, "cue").await {
                    Some(translated) => normalize_cue_text(&translated),
                    None => cue.text.clone(),
                }
            };
            translated.push(Cue { text, ..cue.clone() });
            self.progress.inc(1);
        }

        self.finish();
        translated
    }

    /// Translate a whole subtitle document, keeping its newline style
    pub async fn translate_subtitles(
        &mut self,
        document: &SubtitleDocument,
        source_language: &str,
        target_language: &str,
    ) -> SubtitleDocument {
        let cues = self
            .translate_cues(&document.cues, source_language, target_language)
            .await;

        SubtitleDocument {
            cues,
            line_ending: document.line_ending,
        }
    }
}
