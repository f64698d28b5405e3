//! Record file writer.

use crate::Message;
use crate::error::Result;
use crate::message::{DateStyle, MessageId, RecordMeta};
use crate::parsers::RawRecord;
use crate::parsing::format_date;

/// Chat-level values given to messages that did not come from the record
/// file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordDefaults {
    pub country: Option<String>,
    pub phone_num: Option<String>,
    /// Next free numeric `messageId`
    pub next_id: u64,
}

impl RecordDefaults {
    /// Derives defaults from the first record carrying each field, falling
    /// back to `fallback_phone` (usually taken from the transcript file name).
    pub fn from_messages(messages: &[Message], fallback_phone: Option<&str>) -> Self {
        let metas = || messages.iter().filter_map(Message::record_meta);

        let country = metas().find_map(|meta| meta.country.clone());
        let phone_num = metas()
            .find_map(|meta| meta.phone_num.clone())
            .or_else(|| fallback_phone.map(ToString::to_string));
        let next_id = metas()
            .filter_map(|meta| meta.message_id.as_ref().and_then(MessageId::as_number))
            .max()
            .map_or(1, |max| max + 1);

        Self {
            country,
            phone_num,
            next_id,
        }
    }
}

/// Projects messages back into record entries.
///
/// Messages read from the record file keep their own metadata, their
/// declared `messageType` and any `messageTime` that could not be parsed.
/// Others get the chat-level defaults and fresh ids in output order.
pub fn to_records(messages: &[Message], defaults: &RecordDefaults) -> Vec<RawRecord> {
    let mut next_id = defaults.next_id;

    messages
        .iter()
        .map(|msg| {
            let meta = match msg.record_meta() {
                Some(meta) => meta.clone(),
                None => {
                    let id = MessageId::Number(next_id);
                    next_id += 1;
                    RecordMeta {
                        country: defaults.country.clone(),
                        phone_num: defaults.phone_num.clone(),
                        message_id: Some(id),
                        ..RecordMeta::default()
                    }
                }
            };

            RawRecord {
                country: meta.country,
                phone_num: meta.phone_num,
                formatted_name: msg.sender().to_string(),
                display_name: msg.display_name().map(ToString::to_string),
                message_time: meta
                    .unparsed_time
                    .unwrap_or_else(|| format_date(msg.timestamp(), DateStyle::Record)),
                message_type: meta
                    .declared_type
                    .unwrap_or_else(|| msg.message_type().as_str().to_string()),
                message_body: msg.body().to_string(),
                message_id: meta.message_id,
            }
        })
        .collect()
}

/// Serializes messages as a pretty-printed record file.
///
/// # Format
/// ```json
/// [
///   {
///     "formattedName": "Alice",
///     "messageTime": "2025-01-01 12:00:00",
///     "messageType": "chat",
///     "messageBody": "Hello",
///     "messageId": 1
///   }
/// ]
/// ```
pub fn to_records_json(messages: &[Message], defaults: &RecordDefaults) -> Result<String> {
    let records = to_records(messages, defaults);
    let mut json = serde_json::to_string_pretty(&records)?;
    json.push('\n');
    Ok(json)
}
