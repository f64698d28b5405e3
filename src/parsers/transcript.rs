//! Plain-text transcript parser.
//!
//! A transcript line starts a message when it begins with a date in one of
//! the transcript conventions followed by a sender and a colon:
//!
//! - US: `1/15/25, 10:30 - Alice: Message`
//! - EU bracketed: `[15.01.2025, 10:30:00] Alice: Message`
//! - EU plain: `15.01.2025, 10:30:00 - Alice: Message`
//!
//! A dated line without a `sender:` part is a system notice (encryption
//! banner, group changes) and is dropped. Any other non-empty line continues
//! the previous message. Attachments cannot carry multi-line bodies, so a
//! line following an attachment starts a new chat message from the same
//! sender at the same time.
//!
//! Parsing is a fold over lines: [`ParseState`] holds the finished messages
//! and the one still accumulating continuation lines.

use crate::Message;
use crate::config::{IdentityConfig, MEDIA_REFERENCE_BODY, TranscriptConfig};
use crate::error::Result;
use crate::identity::{SelfIdentity, canonicalize};
use crate::message::{DateStyle, MessageType, SourceOrigin};
use crate::parser::Parser;
use crate::parsing::{NormalizedDate, split_leading_date};

/// Suffix marking an attachment body.
pub const ATTACHMENT_SUFFIX: &str = " (file attached)";

/// Sender given to system notices when they are kept.
pub const SYSTEM_SENDER: &str = "System";

/// Phrases that identify a system notice even when a colon appears in it.
const SYSTEM_PHRASES: &[&str] = &[
    "end-to-end encrypted",
    "created group",
    "changed the subject",
    "changed this group's icon",
    "changed the group description",
    "deleted this group's icon",
    "changed their phone number",
    "joined using this group's invite link",
    "security code changed",
    "disappearing messages",
];

/// Parser for plain-text transcripts.
///
/// # Example
///
/// ```rust
/// use chatsync::identity::SelfIdentity;
/// use chatsync::message::MessageType;
/// use chatsync::parser::Parser;
/// use chatsync::parsers::TranscriptParser;
///
/// let parser = TranscriptParser::new().with_identities(SelfIdentity::new(["Mike"]));
/// let messages = parser.parse_str(
///     "1/1/25, 12:00 - Mike: Look\n1/1/25, 12:01 - Mike: IMG-1.jpg (file attached)",
/// )?;
///
/// assert_eq!(messages[0].canonical_sender(), "SELF");
/// assert_eq!(messages[1].message_type(), MessageType::Image);
/// # Ok::<(), chatsync::ChatsyncError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TranscriptParser {
    config: TranscriptConfig,
    identities: SelfIdentity,
    identity_config: IdentityConfig,
}

impl TranscriptParser {
    /// Creates a parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with custom configuration.
    pub fn with_config(config: TranscriptConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_identities(mut self, identities: SelfIdentity) -> Self {
        self.identities = identities;
        self
    }

    #[must_use]
    pub fn with_identity_config(mut self, config: IdentityConfig) -> Self {
        self.identity_config = config;
        self
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &TranscriptConfig {
        &self.config
    }
}

/// One line, classified.
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Header {
        date: NormalizedDate,
        sender: &'a str,
        body: &'a str,
    },
    System {
        date: NormalizedDate,
        text: &'a str,
    },
    Continuation(&'a str),
    Blank,
}

fn is_system_notice(text: &str) -> bool {
    let lower = text.to_lowercase();
    SYSTEM_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

fn classify(line: &str) -> Line<'_> {
    if line.trim().is_empty() {
        return Line::Blank;
    }

    let Some((date, rest)) = split_leading_date(line) else {
        return Line::Continuation(line);
    };

    // Bracketed dates are followed by a space, the others by " - ".
    let rest = if date.style == DateStyle::EuBracket {
        let rest = rest.trim_start();
        rest.strip_prefix("- ").unwrap_or(rest)
    } else {
        match rest.strip_prefix(" - ") {
            Some(rest) => rest,
            None => return Line::Continuation(line),
        }
    };

    match rest.split_once(':') {
        Some((sender, body)) if !sender.trim().is_empty() && !is_system_notice(sender) => {
            Line::Header {
                date,
                sender: sender.trim(),
                body: body.strip_prefix(' ').unwrap_or(body),
            }
        }
        _ => Line::System { date, text: rest },
    }
}

/// A message still accepting continuation lines.
#[derive(Debug)]
struct Pending {
    date: NormalizedDate,
    sender: String,
    message_type: MessageType,
    body: String,
}

/// Fold accumulator: finished messages plus the one being built.
#[derive(Debug, Default)]
struct ParseState {
    done: Vec<Message>,
    pending: Option<Pending>,
}

impl TranscriptParser {
    /// Interprets a message body: attachment marker, media placeholder, or text.
    fn interpret_body(&self, body: &str) -> (MessageType, String) {
        let trimmed = body.trim_start_matches('\u{200e}').trim();

        if let Some(filename) = trimmed.strip_suffix(ATTACHMENT_SUFFIX) {
            let filename = filename.trim();
            if !filename.is_empty() {
                return (MessageType::from_filename(filename), filename.to_string());
            }
        }

        if trimmed == self.config.media_placeholder {
            return (MessageType::Chat, MEDIA_REFERENCE_BODY.to_string());
        }

        (MessageType::Chat, body.to_string())
    }

    fn start(&self, date: NormalizedDate, sender: &str, body: &str) -> Pending {
        let (message_type, body) = self.interpret_body(body);
        Pending {
            date,
            sender: sender.to_string(),
            message_type,
            body,
        }
    }

    fn finish(&self, pending: Pending) -> Message {
        let token = canonicalize(
            &pending.sender,
            None,
            &self.identities,
            &self.identity_config,
        );
        Message::new(pending.sender, pending.body, pending.date.instant)
            .with_canonical_sender(token)
            .with_message_type(pending.message_type)
            .with_date_style(pending.date.style)
            .with_origin(SourceOrigin::Transcript)
    }

    fn step(&self, mut state: ParseState, line: &str) -> ParseState {
        match classify(line) {
            Line::Blank => {}
            Line::Header { date, sender, body } => {
                if let Some(done) = state.pending.take() {
                    state.done.push(self.finish(done));
                }
                state.pending = Some(self.start(date, sender, body));
            }
            Line::System { date, text } => {
                if let Some(done) = state.pending.take() {
                    state.done.push(self.finish(done));
                }
                if self.config.skip_system_messages {
                    tracing::debug!(text = %text, "Dropping system message");
                } else {
                    state.pending = Some(self.start(date, SYSTEM_SENDER, text));
                }
            }
            Line::Continuation(text) => match state.pending.take() {
                Some(prev) if prev.message_type.is_attachment() => {
                    let next = Pending {
                        date: prev.date,
                        sender: prev.sender.clone(),
                        message_type: MessageType::Chat,
                        body: text.to_string(),
                    };
                    state.done.push(self.finish(prev));
                    state.pending = Some(next);
                }
                Some(mut prev) => {
                    prev.body.push('\n');
                    prev.body.push_str(text);
                    state.pending = Some(prev);
                }
                None => {
                    tracing::debug!(line = %text, "Skipping line outside any message");
                }
            },
        }
        state
    }

    /// Parses transcript content from a string (internal implementation).
    fn parse_content(&self, content: &str) -> Vec<Message> {
        let state = content
            .lines()
            .fold(ParseState::default(), |state, line| self.step(state, line));

        let mut messages = state.done;
        if let Some(last) = state.pending {
            messages.push(self.finish(last));
        }
        messages
    }
}

impl Parser for TranscriptParser {
    fn name(&self) -> &'static str {
        "Transcript"
    }

    fn origin(&self) -> SourceOrigin {
        SourceOrigin::Transcript
    }

    /// Transcript parsing never fails: unreadable lines are skipped or folded
    /// into the previous message.
    fn parse_str(&self, content: &str) -> Result<Vec<Message>> {
        Ok(self.parse_content(content))
    }
}
