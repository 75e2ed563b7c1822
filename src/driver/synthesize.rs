use tracing::info;

use crate::config::{SegmentationMode, SynthesisConfig};
use crate::segment::split_units;
use crate::subtitle::{Cue, SubtitleDocument, Timestamp};
use super::DocumentTranslator;

/// Cut plain text into cue-sized segments
pub fn segment_text(text: &str, mode: SegmentationMode) -> Vec<&str> {
    match mode {
        SegmentationMode::Sentence => split_units(text),
        SegmentationMode::Line => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect(),
    }
}

/// Greedy word wrap to at most `max_chars` characters per line.
///
/// A single word longer than the limit gets a line of its own.
pub fn wrap_text(text: &str, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

impl DocumentTranslator<'_> {
    /// Build a subtitle document from plain text, one fixed-length cue per
    /// segment.
    pub async fn synthesize_subtitles(
        &mut self,
        text: &str,
        source_language: &str,
        target_language: &str,
        config: &SynthesisConfig,
    ) -> SubtitleDocument {
        let segments = segment_text(text, config.mode);
        let translate = source_language != target_language;
        info!(
            "Synthesizing {} cues from text ({:?} segmentation, translate: {})",
            segments.len(),
            config.mode,
            translate
        );
        self.begin(segments.len(), "cues");

        let mut cues = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let content = if translate {
                self.translate_line(segment, source_language, target_language).await
            } else {
                segment.to_string()
            };

            cues.push(Cue {
                index: i + 1,
                start: Timestamp::from_seconds(i as f64 * config.cue_duration_secs),
                end: Timestamp::from_seconds((i + 1) as f64 * config.cue_duration_secs),
                text: wrap_text(&content, config.max_line_chars),
            });
            self.progress.inc(1);
        }

        self.finish();
        SubtitleDocument::new(cues)
    }
}
