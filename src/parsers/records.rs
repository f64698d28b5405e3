//! Structured record file parser.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Message;
use crate::config::IdentityConfig;
use crate::error::{ChatsyncError, Result};
use crate::identity::{SelfIdentity, canonicalize};
use crate::message::{MessageId, MessageType, RecordMeta, SourceOrigin};
use crate::parser::Parser;
use crate::parsing::normalize;

/// Parser for the structured record file.
///
/// The file is a JSON array of objects:
/// ```json
/// [
///   {
///     "country": "DE",
///     "phoneNum": "+49 170 1234567",
///     "formattedName": "Alice",
///     "displayName": "Alice Smith",
///     "messageTime": "2025-01-01 12:00:00",
///     "messageType": "chat",
///     "messageBody": "Hello",
///     "messageId": 17
///   }
/// ]
/// ```
///
/// Anything other than an array of well-formed objects is a structural
/// error. Entries are validated one by one and the first bad one aborts the
/// parse, naming its index.
#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    identities: SelfIdentity,
    identity_config: IdentityConfig,
}

impl RecordParser {
    pub fn new() -> Self {
        Self::default()
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
}

/// One entry of the record file, as written on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_num: Option<String>,
    pub formatted_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub message_time: String,
    pub message_type: String,
    pub message_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
}

impl RecordParser {
    /// Checks the overall shape and deserializes each entry.
    fn validate(content: &str) -> Result<Vec<RawRecord>> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| ChatsyncError::records_parse(e, None))?;

        let Value::Array(entries) = value else {
            return Err(ChatsyncError::invalid_format(
                "record JSON",
                "expected a top-level array of message objects",
            ));
        };

        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                if !entry.is_object() {
                    return Err(ChatsyncError::invalid_record(index, "expected an object"));
                }
                serde_json::from_value::<RawRecord>(entry)
                    .map_err(|e| ChatsyncError::invalid_record(index, e.to_string()))
            })
            .collect()
    }

    fn project(&self, index: usize, raw: RawRecord) -> Message {
        let date = normalize(&raw.message_time);

        let unparsed_time = date.fallback.then(|| raw.message_time.clone());
        let message_type = raw.message_type.parse().unwrap_or_else(|_| {
            tracing::warn!(
                index,
                message_type = %raw.message_type,
                "Unknown record message type, treating as chat"
            );
            MessageType::Chat
        });

        let token = canonicalize(
            &raw.formatted_name,
            raw.display_name.as_deref(),
            &self.identities,
            &self.identity_config,
        );

        Message::new(raw.formatted_name, raw.message_body, date.instant)
            .with_canonical_sender(token)
            .with_display_name(raw.display_name)
            .with_message_type(message_type)
            .with_date_style(date.style)
            .with_origin(SourceOrigin::Record)
            .with_record_meta(RecordMeta {
                country: raw.country,
                phone_num: raw.phone_num,
                message_id: raw.message_id,
                declared_type: Some(raw.message_type),
                unparsed_time,
            })
    }
}

impl Parser for RecordParser {
    fn name(&self) -> &'static str {
        "Records"
    }

    fn origin(&self) -> SourceOrigin {
        SourceOrigin::Record
    }

    fn parse_str(&self, content: &str) -> Result<Vec<Message>> {
        let records = Self::validate(content)?;
        Ok(records
            .into_iter()
            .enumerate()
            .map(|(index, raw)| self.project(index, raw))
            .collect())
    }
}
