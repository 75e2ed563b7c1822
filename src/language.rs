//! Language codes and source-language detection.
//!
//! Detection first asks a statistical detector (if one is configured) and
//! degrades to a fixed list of script rules when the detector is missing,
//! fails, or returns something unusable. It never fails outward.

use tracing::{debug, warn};

use crate::error::{Result, SubtradError};

/// Code returned when nothing more specific can be inferred
pub const DEFAULT_LANGUAGE: &str = "en";

/// Source-language value that requests detection
pub const AUTO: &str = "auto";

/// Languages offered for selection (ISO 639-1 code, English name)
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("de", "German"),
    ("ru", "Russian"),
    ("fr", "French"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("sv", "Swedish"),
    ("no", "Norwegian"),
    ("da", "Danish"),
    ("fi", "Finnish"),
    ("tr", "Turkish"),
    ("el", "Greek"),
    ("ro", "Romanian"),
    ("cs", "Czech"),
    ("uk", "Ukrainian"),
    ("hu", "Hungarian"),
    ("bg", "Bulgarian"),
    ("ar", "Arabic"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("bn", "Bengali"),
    ("id", "Indonesian"),
    ("ms", "Malay"),
    ("vi", "Vietnamese"),
    ("th", "Thai"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
];

/// English name of a language code, or the code itself when unknown
pub fn language_name(code: &str) -> String {
    let code = code.to_lowercase();
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or(code)
}

pub fn is_listed(code: &str) -> bool {
    LANGUAGES.iter().any(|(c, _)| c.eq_ignore_ascii_case(code))
}

/// Validate a user-supplied language code.
///
/// Returns `None` for `auto` when `allow_auto` is set. Codes outside
/// [`LANGUAGES`] are accepted with a warning since the backend may still
/// handle them.
pub fn parse_language(code: &str, allow_auto: bool) -> Result<Option<String>> {
    let code = code.trim().to_lowercase();

    if code == AUTO {
        return if allow_auto {
            Ok(None)
        } else {
            Err(SubtradError::Config("'auto' is only valid as a source language".to_string()))
        };
    }

    let well_formed = (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_lowercase());
    if !well_formed {
        return Err(SubtradError::Config(format!("Invalid language code '{}'", code)));
    }

    if !is_listed(&code) {
        warn!("Language '{}' is not in the supported list, passing it through", code);
    }

    Ok(Some(code))
}

/// Statistical language detector consulted before the script rules
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, sample: &str) -> Result<String>;
}

/// Trigram detector backed by `whatlang`
#[derive(Debug, Clone, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, sample: &str) -> Result<String> {
        let info = whatlang::detect(sample)
            .ok_or_else(|| SubtradError::Detection("whatlang returned no result".to_string()))?;

        let iso3 = info.lang().code();
        debug!("whatlang detected {} (confidence {:.2})", iso3, info.confidence());

        iso639_1(iso3)
            .map(str::to_string)
            .ok_or_else(|| SubtradError::Detection(format!("No two-letter code for '{}'", iso3)))
    }
}

fn iso639_1(iso3: &str) -> Option<&'static str> {
    let code = match iso3 {
        "eng" => "en",
        "rus" => "ru",
        "cmn" => "zh",
        "spa" => "es",
        "por" => "pt",
        "ita" => "it",
        "ben" => "bn",
        "fra" => "fr",
        "deu" => "de",
        "ukr" => "uk",
        "kat" => "ka",
        "ara" => "ar",
        "hin" => "hi",
        "jpn" => "ja",
        "heb" => "he",
        "yid" => "yi",
        "pol" => "pl",
        "amh" => "am",
        "jav" => "jv",
        "kor" => "ko",
        "nob" => "no",
        "dan" => "da",
        "swe" => "sv",
        "fin" => "fi",
        "tur" => "tr",
        "nld" => "nl",
        "hun" => "hu",
        "ces" => "cs",
        "ell" => "el",
        "bul" => "bg",
        "bel" => "be",
        "mar" => "mr",
        "kan" => "kn",
        "ron" => "ro",
        "slv" => "sl",
        "hrv" => "hr",
        "srp" => "sr",
        "mkd" => "mk",
        "lit" => "lt",
        "lav" => "lv",
        "est" => "et",
        "tam" => "ta",
        "vie" => "vi",
        "urd" => "ur",
        "tha" => "th",
        "guj" => "gu",
        "uzb" => "uz",
        "pan" => "pa",
        "aze" => "az",
        "ind" => "id",
        "tel" => "te",
        "pes" => "fa",
        "mal" => "ml",
        "ori" => "or",
        "mya" => "my",
        "nep" => "ne",
        "sin" => "si",
        "khm" => "km",
        "tuk" => "tk",
        "aka" => "ak",
        "zul" => "zu",
        "sna" => "sn",
        "afr" => "af",
        "lat" => "la",
        "slk" => "sk",
        "cat" => "ca",
        "tgl" => "tl",
        "hye" => "hy",
        "epo" => "eo",
        _ => return None,
    };
    Some(code)
}

/// Script and diacritic rules, checked in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptRule {
    Cyrillic,
    GermanLetters,
    SpanishLetters,
}

const FALLBACK_RULES: [ScriptRule; 3] = [
    ScriptRule::Cyrillic,
    ScriptRule::GermanLetters,
    ScriptRule::SpanishLetters,
];

impl ScriptRule {
    fn matches(self, ch: char) -> bool {
        match self {
            ScriptRule::Cyrillic => ('\u{0400}'..='\u{04FF}').contains(&ch),
            ScriptRule::GermanLetters => "äöüÄÖÜß".contains(ch),
            ScriptRule::SpanishLetters => "áéíóúÁÉÍÓÚñÑ¿¡".contains(ch),
        }
    }

    fn code(self) -> &'static str {
        match self {
            ScriptRule::Cyrillic => "ru",
            ScriptRule::GermanLetters => "de",
            ScriptRule::SpanishLetters => "es",
        }
    }
}

/// Classify a sample by script alone; first matching rule wins
pub fn fallback_language(sample: &str) -> &'static str {
    FALLBACK_RULES
        .iter()
        .find(|rule| sample.chars().any(|ch| rule.matches(ch)))
        .map(|rule| rule.code())
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Collapse regional Chinese variants (`zh-cn`, `zh-tw`) to `zh`
pub fn normalize_code(code: &str) -> String {
    let code = code.trim().to_lowercase();
    if code.starts_with("zh") {
        "zh".to_string()
    } else {
        code
    }
}

/// Detect the language of a text sample
pub fn detect_language(sample: &str, detector: Option<&dyn LanguageDetector>) -> String {
    if sample.trim().is_empty() {
        return DEFAULT_LANGUAGE.to_string();
    }

    if let Some(detector) = detector {
        match detector.detect(sample) {
            Ok(code) if !code.trim().is_empty() => return normalize_code(&code),
            Ok(_) => debug!("Detector returned an empty code, using script rules"),
            Err(e) => debug!("Detector failed ({}), using script rules", e),
        }
    }

    fallback_language(sample).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDetector(&'static str);

    impl LanguageDetector for FixedDetector {
        fn detect(&self, _sample: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingDetector;

    impl LanguageDetector for FailingDetector {
        fn detect(&self, _sample: &str) -> Result<String> {
            Err(SubtradError::Detection("unavailable".to_string()))
        }
    }

    #[test]
    fn test_cyrillic_without_detector() {
        assert_eq!(detect_language("Привет мир", None), "ru");
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(fallback_language("Straße"), "de");
        assert_eq!(fallback_language("mañana"), "es");
        assert_eq!(fallback_language("¿listo?"), "es");
        // Cyrillic wins over German letters
        assert_eq!(fallback_language("Grüße, Привет"), "ru");
        // German wins over Spanish letters
        assert_eq!(fallback_language("Müller está aquí"), "de");
        assert_eq!(fallback_language("plain ascii"), "en");
    }

    #[test]
    fn test_blank_sample_skips_detector() {
        assert_eq!(detect_language("  \n ", Some(&FixedDetector("fr"))), "en");
    }

    #[test]
    fn test_detector_result_is_normalized() {
        assert_eq!(detect_language("你好", Some(&FixedDetector("zh-cn"))), "zh");
        assert_eq!(detect_language("hello", Some(&FixedDetector("FR"))), "fr");
    }

    #[test]
    fn test_failing_detector_falls_back() {
        assert_eq!(detect_language("Grüß Gott", Some(&FailingDetector)), "de");
        assert_eq!(detect_language("Grüß Gott", Some(&FixedDetector(" "))), "de");
    }

    #[test]
    fn test_whatlang_detects_long_english_text() {
        let sample = "The quick brown fox jumps over the lazy dog while the children \
                      are playing in the garden and their parents are watching them.";
        assert_eq!(detect_language(sample, Some(&WhatlangDetector)), "en");
    }

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("auto", true).unwrap(), None);
        assert!(parse_language("auto", false).is_err());
        assert_eq!(parse_language(" ES ", false).unwrap(), Some("es".to_string()));
        assert_eq!(parse_language("gl", false).unwrap(), Some("gl".to_string()));
        assert!(parse_language("english", false).is_err());
        assert!(parse_language("e1", false).is_err());
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("JA"), "Japanese");
        assert_eq!(language_name("xx"), "xx");
    }
}
