use tracing::{debug, info};

use crate::segment::pack;
use crate::text::{Line, TextDocument};
use super::DocumentTranslator;

impl DocumentTranslator<'_> {
    /// Translate a text document line by line.
    ///
    /// Terminators are never sent to the backend and come back verbatim, blank
    /// lines pass through without a request, and the output always has the
    /// same number of lines as the input.
    pub async fn translate_lines(
        &mut self,
        document: &TextDocument,
        source_language: &str,
        target_language: &str,
    ) -> TextDocument {
        if source_language == target_language {
            info!("Source and target language are both '{}', keeping text as is", source_language);
            return document.clone();
        }

        info!("Translating {} lines from {} to {}", document.len(), source_language, target_language);
        self.begin(document.len(), "lines");

        let mut lines = Vec::with_capacity(document.len());
        for line in &document.lines {
            let content = if line.is_blank() {
                self.stats.skipped += 1;
                line.content.clone()
            } else {
                self.translate_line(&line.content, source_language, target_language).await
            };
            lines.push(Line::new(content, line.terminator));
            self.progress.inc(1);
        }

        self.finish();
        TextDocument { lines }
    }

    /// Translate the content of one line, packing it first when it is over
    /// budget. Chunk translations are joined with single spaces.
    pub(super) async fn translate_line(
        &mut self,
        content: &str,
        source_language: &str,
        target_language: &str,
    ) -> String {
        if self.counter.count(content) <= self.max_tokens {
            return match self.try_translate(content, source_language, target_language, "line").await {
                Some(translated) => flatten_line_breaks(&translated),
                None => content.to_string(),
            };
        }

        let chunks = pack(content, self.counter, self.max_tokens);
        debug!("Long line of {} bytes packed into {} chunks", content.len(), chunks.len());

        let mut parts = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let part = match self
                .try_translate(chunk.text(), source_language, target_language, "chunk")
                .await
            {
                Some(translated) => flatten_line_breaks(&translated),
                None => chunk.text().to_string(),
            };
            parts.push(part);
        }
        parts.join(" ")
    }
}

/// A translated line must stay a single line
fn flatten_line_breaks(text: &str) -> String {
    if !text.contains(['\n', '\r']) {
        return text.to_string();
    }
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
