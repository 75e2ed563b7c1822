/// Token counting oracle used for budget comparisons.
///
/// Counts only need to be roughly additive: the count of two joined texts is
/// expected to stay close to the sum of their counts.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn count(&self, text: &str) -> usize {
        self(text)
    }
}

/// Character-ratio estimate for backends that do not expose their tokenizer.
///
/// CJK ideographs and syllables count as one token each; every other
/// character contributes `1 / chars_per_token`.
#[derive(Debug, Clone)]
pub struct HeuristicTokenCounter {
    chars_per_token: f64,
}

impl HeuristicTokenCounter {
    pub fn new(chars_per_token: f64) -> Self {
        Self {
            chars_per_token: if chars_per_token > 0.0 { chars_per_token } else { 1.0 },
        }
    }
}

impl Default for HeuristicTokenCounter {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        let mut cjk = 0usize;
        let mut other = 0usize;
        for ch in text.chars() {
            if is_cjk_char(ch) {
                cjk += 1;
            } else {
                other += 1;
            }
        }

        cjk + (other as f64 / self.chars_per_token).ceil() as usize
    }
}

#[inline]
fn is_cjk_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)    // CJK Unified Ideographs
        || (0x3040..=0x309F).contains(&code) // Hiragana
        || (0x30A0..=0x30FF).contains(&code) // Katakana
        || (0xAC00..=0xD7AF).contains(&code) // Hangul
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_text_uses_ratio() {
        let counter = HeuristicTokenCounter::new(3.0);
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("abc"), 1);
        assert_eq!(counter.count("abcd"), 2);
        assert_eq!(counter.count("Привет"), 2);
    }

    #[test]
    fn test_cjk_counts_per_character() {
        let counter = HeuristicTokenCounter::new(3.0);
        assert_eq!(counter.count("你好世界"), 4);
        assert_eq!(counter.count("你好 ok"), 3);
    }

    #[test]
    fn test_non_positive_ratio_is_clamped() {
        let counter = HeuristicTokenCounter::new(0.0);
        assert_eq!(counter.count("abcd"), 4);
    }

    #[test]
    fn test_closures_are_counters() {
        let words = |text: &str| text.split_whitespace().count();
        assert_eq!(TokenCounter::count(&words, "one two three"), 3);
    }
}
