//! Line-structured plain-text documents.
//!
//! A [`TextDocument`] keeps every line terminator it was parsed with, so
//! `TextDocument::parse(s).to_text() == s` for any input.

/// Line terminator recognised in text documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// Last line of a document without a trailing newline
    None,
    Lf,
    CrLf,
}

impl Terminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Terminator::None => "",
            Terminator::Lf => "\n",
            Terminator::CrLf => "\r\n",
        }
    }

    /// Dominant newline style of a text: CRLF as soon as one CRLF appears
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            Terminator::CrLf
        } else {
            Terminator::Lf
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub content: String,
    pub terminator: Terminator,
}

impl Line {
    pub fn new<S: Into<String>>(content: S, terminator: Terminator) -> Self {
        Self {
            content: content.into(),
            terminator,
        }
    }

    /// Empty or whitespace-only content
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    pub lines: Vec<Line>,
}

impl TextDocument {
    /// Split on `\n`, treating a preceding `\r` as part of the terminator.
    /// A lone `\r` stays in the line content.
    pub fn parse(text: &str) -> Self {
        let lines = text
            .split_inclusive('\n')
            .map(|piece| {
                if let Some(content) = piece.strip_suffix("\r\n") {
                    Line::new(content, Terminator::CrLf)
                } else if let Some(content) = piece.strip_suffix('\n') {
                    Line::new(content, Terminator::Lf)
                } else {
                    Line::new(piece, Terminator::None)
                }
            })
            .collect();

        Self { lines }
    }

    pub fn to_text(&self) -> String {
        let capacity = self
            .lines
            .iter()
            .map(|l| l.content.len() + l.terminator.as_str().len())
            .sum();
        let mut out = String::with_capacity(capacity);
        for line in &self.lines {
            out.push_str(&line.content);
            out.push_str(line.terminator.as_str());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
