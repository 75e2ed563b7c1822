use tracing::info;

use crate::segment::pack;
use super::DocumentTranslator;

impl DocumentTranslator<'_> {
    /// Translate text without keeping its line structure.
    ///
    /// The whole text is packed into chunks and the translated chunks are
    /// joined with single newlines.
    pub async fn translate_flat(
        &mut self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> String {
        if source_language == target_language {
            info!("Source and target language are both '{}', keeping text as is", source_language);
            return text.to_string();
        }
        if text.trim().is_empty() {
            return text.to_string();
        }

        let chunks = pack(text, self.counter, self.max_tokens);
        info!(
            "Translating {} chunks from {} to {}",
            chunks.len(),
            source_language,
            target_language
        );
        self.begin(chunks.len(), "chunks");

        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let what = if chunk.is_window() { "window" } else { "chunk" };
            translated.push(
                self.translate_or_keep(chunk.text(), source_language, target_language, what)
                    .await,
            );
            self.progress.inc(1);
        }

        self.finish();
        translated.join("\n")
    }
}
