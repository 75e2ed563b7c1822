use std::fmt;
use std::str::FromStr;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Result, SubtradError};
use crate::text::Terminator;

static TIMING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\S+)\s*-->\s*(\S+)").unwrap()
});

/// Subtitle timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Negative and non-finite inputs clamp to zero
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds.is_finite() && seconds > 0.0 {
            Self((seconds * 1000.0).round() as u64)
        } else {
            Self(0)
        }
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

/// Format as SRT time (HH:MM:SS,mmm)
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3_600_000;
        let minutes = (self.0 % 3_600_000) / 60_000;
        let secs = (self.0 % 60_000) / 1_000;
        let millis = self.0 % 1_000;

        write!(f, "{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
    }
}

/// Parse SRT time; `.` is accepted in place of `,`
impl FromStr for Timestamp {
    type Err = SubtradError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SubtradError::SubtitleParse(format!("Invalid timestamp: {}", s));

        let parts: Vec<&str> = s.trim().split([':', ',', '.']).collect();
        if parts.len() != 4 || parts[3].len() != 3 {
            return Err(invalid());
        }

        let mut values = [0u64; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *value = part.parse().map_err(|_| invalid())?;
        }

        let [hours, minutes, seconds, millis] = values;
        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }

        hours
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .map(Self)
            .ok_or_else(invalid)
    }
}

/// A single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub index: usize,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Cue text, lines separated by `\n`
    pub text: String,
}

/// Parsed SRT file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleDocument {
    pub cues: Vec<Cue>,
    /// Newline style used when writing the document back
    pub line_ending: Terminator,
}

impl SubtitleDocument {
    pub fn new(cues: Vec<Cue>) -> Self {
        Self {
            cues,
            line_ending: Terminator::Lf,
        }
    }

    /// Parse SRT content. Malformed blocks are skipped with a warning; input
    /// that is not blank but yields no cue at all is an error.
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let line_ending = Terminator::detect(content);

        let mut cues = Vec::new();
        let mut block: Vec<&str> = Vec::new();
        let mut skipped = 0usize;

        for line in content.lines().chain(std::iter::once("")) {
            if !line.trim().is_empty() {
                block.push(line);
                continue;
            }
            if block.is_empty() {
                continue;
            }
            match parse_block(&block, cues.len() + 1) {
                Some(cue) => cues.push(cue),
                None => {
                    skipped += 1;
                    warn!("Skipping malformed subtitle block starting with '{}'", block[0]);
                }
            }
            block.clear();
        }

        if cues.is_empty() && !content.trim().is_empty() {
            return Err(SubtradError::SubtitleParse(format!(
                "No valid subtitle cues found ({} malformed blocks)",
                skipped
            )));
        }

        debug!("Parsed {} cues ({} skipped)", cues.len(), skipped);
        Ok(Self { cues, line_ending })
    }

    /// Serialize to SRT, renumbering cues from 1
    pub fn to_srt(&self) -> String {
        let eol = match self.line_ending {
            Terminator::CrLf => "\r\n",
            _ => "\n",
        };

        let mut srt_content = String::new();
        for (index, cue) in self.cues.iter().enumerate() {
            srt_content.push_str(&format!(
                "{}{eol}{} --> {}{eol}{}{eol}{eol}",
                index + 1,
                cue.start,
                cue.end,
                normalize_cue_text(&cue.text).replace('\n', eol),
            ));
        }
        srt_content
    }

    /// First `limit` non-blank cue texts joined by newlines
    pub fn language_sample(&self, limit: usize) -> String {
        self.cues
            .iter()
            .map(|cue| cue.text.as_str())
            .filter(|text| !text.trim().is_empty())
            .take(limit)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// All non-empty cue texts joined by newlines, timing discarded
    pub fn plain_text(&self) -> String {
        self.cues
            .iter()
            .map(|cue| cue.text.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Cue text safe to write inside an SRT block: any newline style becomes
/// `\n` and blank lines, which would end the block, are dropped
pub fn normalize_cue_text(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_block(block: &[&str], fallback_index: usize) -> Option<Cue> {
    // The numeric index line is optional
    let (index, timing_pos) = match block[0].trim().parse::<usize>() {
        Ok(index) if block.len() > 1 => (index, 1),
        _ => (fallback_index, 0),
    };

    let captures = TIMING_LINE.captures(block[timing_pos])?;
    let start = captures[1].parse::<Timestamp>().ok()?;
    let end = captures[2].parse::<Timestamp>().ok()?;

    let text = block[timing_pos + 1..]
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");

    Some(Cue { index, start, end, text })
}
