//! Unified parser trait for both chat exports.
//!
//! The record parser and the transcript parser produce the same canonical
//! [`Message`] model, so the sync pipeline can treat them uniformly.
//!
//! # Example
//!
//! ```rust
//! use chatsync::message::SourceOrigin;
//! use chatsync::parser::Parser;
//! use chatsync::parsers::TranscriptParser;
//!
//! let parser = TranscriptParser::new();
//! let messages = parser.parse_str("1/1/25, 12:00 - Alice: Hi there!")?;
//!
//! assert_eq!(parser.origin(), SourceOrigin::Transcript);
//! assert_eq!(messages.len(), 1);
//! # Ok::<(), chatsync::ChatsyncError>(())
//! ```

use std::fs;
use std::path::Path;

use crate::Message;
use crate::error::Result;
use crate::message::SourceOrigin;

/// Parses one export format into canonical messages.
pub trait Parser: Send + Sync {
    /// Human-readable parser name (e.g., "Records", "Transcript").
    fn name(&self) -> &'static str;

    /// Which export this parser reads.
    fn origin(&self) -> SourceOrigin;

    /// Parses export content held in memory.
    fn parse_str(&self, content: &str) -> Result<Vec<Message>>;

    /// Reads and parses an export file.
    ///
    /// Parse errors are annotated with the file path.
    fn parse(&self, path: &Path) -> Result<Vec<Message>> {
        let content = fs::read_to_string(path)?;
        let messages = self
            .parse_str(&content)
            .map_err(|e| e.with_path(path))?;
        tracing::info!(
            parser = self.name(),
            path = %path.display(),
            count = messages.len(),
            "Parsed export"
        );
        Ok(messages)
    }
}
