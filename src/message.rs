//! The canonical message model shared by both export formats.
//!
//! Both the record parser and the transcript parser project their input into
//! [`Message`]. A message carries its raw sender label next to the canonical
//! identity token used for deduplication, an absolute UTC timestamp, and the
//! [`DateStyle`] it was written in so the transcript can be re-emitted in the
//! user's own convention.
//!
//! Messages have no `&mut self` API. The `with_*` builders consume the value
//! and are meant for construction only; the merge engine selects which copy
//! of a message survives and never edits one.
//!
//! # Example
//!
//! ```
//! use chatsync::message::{Message, MessageType};
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
//! let msg = Message::new("Alice", "IMG-001.jpg", ts)
//!     .with_message_type(MessageType::Image);
//!
//! assert!(msg.is_attachment());
//! assert_eq!(msg.canonical_sender(), "Alice");
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of payload a message carries.
///
/// Every type other than [`Chat`](MessageType::Chat) is an attachment whose
/// body is a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Chat,
    Image,
    Video,
    Audio,
    Document,
    Pdf,
    Sticker,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic", "bmp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "3gp", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["opus", "ogg", "mp3", "m4a", "aac", "wav", "amr"];

impl MessageType {
    /// Returns the lowercase name used in the record format.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Chat => "chat",
            MessageType::Image => "image",
            MessageType::Video => "video",
            MessageType::Audio => "audio",
            MessageType::Document => "document",
            MessageType::Pdf => "pdf",
            MessageType::Sticker => "sticker",
        }
    }

    /// Infers the attachment type from a file name's extension.
    ///
    /// WhatsApp names stickers `STK-*.webp`; other `.webp` files are images.
    /// Unknown or missing extensions fall back to [`Document`](MessageType::Document).
    ///
    /// ```
    /// use chatsync::message::MessageType;
    ///
    /// assert_eq!(MessageType::from_filename("IMG-2025.JPG"), MessageType::Image);
    /// assert_eq!(MessageType::from_filename("PTT-01.opus"), MessageType::Audio);
    /// assert_eq!(MessageType::from_filename("report.pdf"), MessageType::Pdf);
    /// assert_eq!(MessageType::from_filename("notes.xyz"), MessageType::Document);
    /// ```
    pub fn from_filename(filename: &str) -> Self {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if ext == "webp" && filename.starts_with("STK-") {
            return MessageType::Sticker;
        }

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MessageType::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MessageType::Video
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            MessageType::Audio
        } else if ext == "pdf" {
            MessageType::Pdf
        } else {
            MessageType::Document
        }
    }

    /// Returns `true` for every type except [`Chat`](MessageType::Chat).
    pub fn is_attachment(&self) -> bool {
        *self != MessageType::Chat
    }

    /// Name of the media directory holding attachments of this type.
    ///
    /// Stickers live with images and PDFs with documents. Returns `None` for
    /// chat messages.
    pub fn media_dir(&self) -> Option<&'static str> {
        match self {
            MessageType::Chat => None,
            MessageType::Image | MessageType::Sticker => Some("image"),
            MessageType::Video => Some("video"),
            MessageType::Audio => Some("audio"),
            MessageType::Document | MessageType::Pdf => Some("document"),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" | "text" => Ok(MessageType::Chat),
            "image" => Ok(MessageType::Image),
            "video" => Ok(MessageType::Video),
            "audio" | "ptt" | "voice" => Ok(MessageType::Audio),
            "document" => Ok(MessageType::Document),
            "pdf" => Ok(MessageType::Pdf),
            "sticker" => Ok(MessageType::Sticker),
            other => Err(format!("Unknown message type: '{other}'")),
        }
    }
}

/// The date convention a message's timestamp was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStyle {
    /// `M/D/YY, H:MM`
    Us,
    /// `[DD.MM.YYYY, HH:MM:SS]`
    EuBracket,
    /// `DD.MM.YYYY, HH:MM:SS`
    EuPlain,
    /// `YYYY-MM-DD HH:MM:SS`
    #[default]
    Record,
}

impl DateStyle {
    /// Returns `true` for the three transcript conventions.
    pub fn is_transcript(&self) -> bool {
        *self != DateStyle::Record
    }
}

/// Which export a message was read from. Provenance only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceOrigin {
    /// The structured record file.
    #[default]
    Record,
    /// The plain-text transcript.
    Transcript,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOrigin::Record => write!(f, "records"),
            SourceOrigin::Transcript => write!(f, "transcript"),
        }
    }
}

/// A record `messageId`, which exports write either as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Number(u64),
    Text(String),
}

impl MessageId {
    /// Returns the numeric value, parsing textual ids when they are digits.
    pub fn as_number(&self) -> Option<u64> {
        match self {
            MessageId::Number(n) => Some(*n),
            MessageId::Text(s) => s.parse().ok(),
        }
    }
}

/// Record-format fields that have no place in the canonical model but must
/// survive a rewrite of the record file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordMeta {
    pub country: Option<String>,
    pub phone_num: Option<String>,
    pub message_id: Option<MessageId>,
    /// `messageType` exactly as declared, including aliases and unknown types
    pub declared_type: Option<String>,
    /// `messageTime` as written, kept only when it could not be parsed
    pub unparsed_time: Option<String>,
}

/// A chat message in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    sender: String,
    canonical_sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    timestamp: DateTime<Utc>,
    original_date_format: DateStyle,
    message_type: MessageType,
    body: String,
    #[serde(skip)]
    origin: SourceOrigin,
    #[serde(skip)]
    record_meta: Option<RecordMeta>,
}

impl Message {
    /// Creates a chat message whose canonical sender is the trimmed raw label.
    pub fn new(sender: impl Into<String>, body: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let sender = sender.into();
        let canonical_sender = sender.trim().to_string();
        Self {
            sender,
            canonical_sender,
            display_name: None,
            timestamp,
            original_date_format: DateStyle::default(),
            message_type: MessageType::Chat,
            body: body.into(),
            origin: SourceOrigin::default(),
            record_meta: None,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Sets the canonical identity token. Blank tokens are ignored so the
    /// canonical sender is never empty.
    #[must_use]
    pub fn with_canonical_sender(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        if !token.trim().is_empty() {
            self.canonical_sender = token;
        }
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_message_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }

    #[must_use]
    pub fn with_date_style(mut self, style: DateStyle) -> Self {
        self.original_date_format = style;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: SourceOrigin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_record_meta(mut self, meta: RecordMeta) -> Self {
        self.record_meta = Some(meta);
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Raw sender label as it appeared in the source.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Canonical identity token used for deduplication.
    pub fn canonical_sender(&self) -> &str {
        &self.canonical_sender
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn date_style(&self) -> DateStyle {
        self.original_date_format
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Text content, or the attachment file name for attachments.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn origin(&self) -> SourceOrigin {
        self.origin
    }

    pub fn record_meta(&self) -> Option<&RecordMeta> {
        self.record_meta.as_ref()
    }

    /// Returns `true` when the message references a media file.
    pub fn is_attachment(&self) -> bool {
        self.message_type.is_attachment()
    }
}
