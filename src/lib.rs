//! # Chatsync
//!
//! Reconciles the two exports of a personal chat, a structured JSON record
//! file and a plain-text transcript, into one deduplicated, chronologically
//! ordered history, and keeps attached media organized by type.
//!
//! ## Overview
//!
//! The same conversation usually exists in both exports with different
//! metadata: verbose contact names in one and bare phone numbers in the
//! other, second-precision timestamps in one and minute-precision in the
//! other, three different transcript date conventions. Chatsync parses both
//! into a common [`Message`] model, canonicalizes sender identities,
//! fingerprints every message and merges the two sequences so that each
//! real-world message appears exactly once. Running the merge again on its
//! own output changes nothing.
//!
//! ## Quick Start
//!
//! ```rust
//! use chatsync::prelude::*;
//!
//! let me = SelfIdentity::new(["Mike"]);
//!
//! let records = RecordParser::new().with_identities(me.clone()).parse_str(
//!     r#"[{"formattedName":"You","messageTime":"2025-01-01 12:00:00",
//!          "messageType":"chat","messageBody":"Hello from JSON!"}]"#,
//! )?;
//! let transcript = TranscriptParser::new().with_identities(me).parse_str(
//!     "1/1/25, 12:00 - Mike: Hello from JSON!\n1/1/25, 12:02 - Alice: New message",
//! )?;
//!
//! let (merged, stats) = merge_with_stats(records, transcript);
//! assert_eq!(merged.len(), 2);
//! assert_eq!(stats.duplicates, 1);
//! # Ok::<(), chatsync::ChatsyncError>(())
//! ```
//!
//! To sync a whole chat directory in place, use [`sync::sync`].
//!
//! ## Module Structure
//!
//! - [`message`] - [`Message`] and its enums
//! - [`parsing`] - Date normalization across the four date conventions
//! - [`parser`] - The [`Parser`](parser::Parser) trait
//! - [`parsers`] - [`RecordParser`](parsers::RecordParser), [`TranscriptParser`](parsers::TranscriptParser)
//! - [`identity`] - Sender canonicalization and the self-identity list
//! - [`core`] - Fingerprints, the merge engine and output writers
//! - [`media`] - Media reconciliation
//! - [`sync`] - The full pipeline for one chat directory
//! - [`config`] - Configuration types
//! - [`error`] - Unified error types ([`ChatsyncError`], [`Result`])
//! - [`prelude`] - Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod identity;
pub mod media;
pub mod message;
pub mod parser;
pub mod parsers;
pub mod parsing;
pub mod sync;

// Re-export the main types at the crate root for convenience
pub use error::{ChatsyncError, Result};
pub use message::Message;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatsync::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Message;
    pub use crate::error::{ChatsyncError, Result};
    pub use crate::message::{DateStyle, MessageType, SourceOrigin};

    pub use crate::parser::Parser;
    pub use crate::parsers::{RecordParser, TranscriptParser};

    pub use crate::config::{IdentityConfig, SyncConfig, TranscriptConfig};
    pub use crate::identity::{SelfIdentity, canonicalize};

    pub use crate::core::{MergeStats, merge, merge_with_stats};
    pub use crate::core::{to_records_json, to_transcript};

    pub use crate::media::{MediaReport, reconcile};
    pub use crate::sync::{SyncReport, sync};
}
