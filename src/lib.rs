//! Subtrad - subtitle and text translation
//!
//! Splits .srt and .txt documents into token-budgeted chunks, sends them to a
//! local LLM backend one request at a time, and reassembles the translation
//! while preserving cue timing, line structure and encoding.

pub mod backend;
pub mod cli;
pub mod config;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod language;
pub mod segment;
pub mod subtitle;
pub mod text;
pub mod workflow;
