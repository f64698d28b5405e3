//! Parsers for the two chat exports.
//!
//! - [`RecordParser`] - the structured JSON record file
//! - [`TranscriptParser`] - the plain-text transcript
//!
//! Both implement [`Parser`](crate::parser::Parser) and produce the same
//! canonical [`Message`](crate::Message) model.
//!
//! # Example
//!
//! ```rust
//! use chatsync::config::SyncConfig;
//! use chatsync::identity::SelfIdentity;
//! use chatsync::parsers::create_parser;
//! use chatsync::message::SourceOrigin;
//!
//! let parser = create_parser(SourceOrigin::Record, &SelfIdentity::default(), &SyncConfig::default());
//! assert_eq!(parser.name(), "Records");
//! ```

mod records;
mod transcript;

pub use records::{RawRecord, RecordParser};
pub use transcript::{ATTACHMENT_SUFFIX, SYSTEM_SENDER, TranscriptParser};

use crate::config::SyncConfig;
use crate::identity::SelfIdentity;
use crate::message::SourceOrigin;
use crate::parser::Parser;

/// Creates the parser for one export, configured from `config`.
pub fn create_parser(
    origin: SourceOrigin,
    identities: &SelfIdentity,
    config: &SyncConfig,
) -> Box<dyn Parser> {
    match origin {
        SourceOrigin::Record => Box::new(
            RecordParser::new()
                .with_identities(identities.clone())
                .with_identity_config(config.identity.clone()),
        ),
        SourceOrigin::Transcript => Box::new(
            TranscriptParser::with_config(config.transcript.clone())
                .with_identities(identities.clone())
                .with_identity_config(config.identity.clone()),
        ),
    }
}
