//! Transcript writer.

use std::collections::HashMap;

use crate::Message;
use crate::identity::{SelfIdentity, preferred_label};
use crate::message::DateStyle;
use crate::parsers::ATTACHMENT_SUFFIX;
use crate::parsing::format_date;

/// Tie-break order when two transcript styles are equally frequent.
const STYLE_PRIORITY: [DateStyle; 3] = [DateStyle::Us, DateStyle::EuBracket, DateStyle::EuPlain];

/// The most frequent transcript date style among `messages`, if any.
pub fn dominant_style(messages: &[Message]) -> Option<DateStyle> {
    let mut counts: HashMap<DateStyle, usize> = HashMap::new();
    for msg in messages.iter().filter(|m| m.date_style().is_transcript()) {
        *counts.entry(msg.date_style()).or_default() += 1;
    }

    let best = counts.values().copied().max()?;
    STYLE_PRIORITY
        .into_iter()
        .find(|style| counts.get(style) == Some(&best))
}

fn header(msg: &Message, style: DateStyle, sender: &str) -> String {
    let date = format_date(msg.timestamp(), style);
    match style {
        DateStyle::EuBracket => format!("{date} {sender}: "),
        _ => format!("{date} - {sender}: "),
    }
}

/// Renders messages as a transcript.
///
/// Messages keep their own transcript date style; the rest are written in
/// `fallback_style`. Sender labels are chosen with
/// [`preferred_label`] so that parsing the output back yields the same
/// canonical identities.
///
/// # Example
///
/// ```rust
/// use chatsync::Message;
/// use chatsync::core::output::to_transcript;
/// use chatsync::identity::SelfIdentity;
/// use chatsync::message::DateStyle;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
/// let text = to_transcript(&[Message::new("Alice", "Hi", ts)], &SelfIdentity::default(), DateStyle::Us);
/// assert_eq!(text, "1/1/25, 12:00 - Alice: Hi\n");
/// ```
pub fn to_transcript(
    messages: &[Message],
    identities: &SelfIdentity,
    fallback_style: DateStyle,
) -> String {
    let fallback_style = if fallback_style.is_transcript() {
        fallback_style
    } else {
        DateStyle::Us
    };

    let mut out = String::new();
    for msg in messages {
        let style = if msg.date_style().is_transcript() {
            msg.date_style()
        } else {
            fallback_style
        };
        let sender = preferred_label(msg.sender(), msg.display_name(), identities);

        out.push_str(&header(msg, style, sender));
        out.push_str(msg.body());
        if msg.is_attachment() {
            out.push_str(ATTACHMENT_SUFFIX);
        }
        out.push('\n');
    }
    out
}
