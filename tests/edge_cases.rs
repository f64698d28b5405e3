//! Edge case tests for parsing, identity normalization and merging.

use chrono::{TimeZone, Utc};

use chatsync::config::{IdentityConfig, TranscriptConfig};
use chatsync::identity::{SelfIdentity, canonicalize};
use chatsync::message::{DateStyle, MessageType};
use chatsync::parsing::{normalize, parse_date};
use chatsync::prelude::*;

fn transcript(content: &str) -> Vec<Message> {
    TranscriptParser::new()
        .with_identities(SelfIdentity::new(["Mike"]))
        .parse_str(content)
        .unwrap()
}

// =============================================================================
// Dates
// =============================================================================

#[test]
fn test_two_digit_year_pivot() {
    let (ts, _) = parse_date("1/1/49, 12:00").unwrap();
    assert_eq!(ts.format("%Y").to_string(), "2049");

    let (ts, _) = parse_date("1/1/50, 12:00").unwrap();
    assert_eq!(ts.format("%Y").to_string(), "1950");
}

#[test]
fn test_us_twelve_hour_clock() {
    let (ts, style) = parse_date("1/1/25, 12:15 AM").unwrap();
    assert_eq!(style, DateStyle::Us);
    assert_eq!(ts, Utc.with_ymd_and_hms(2025, 1, 1, 0, 15, 0).unwrap());

    let (ts, _) = parse_date("1/1/25, 3:05 pm").unwrap();
    assert_eq!(ts, Utc.with_ymd_and_hms(2025, 1, 1, 15, 5, 0).unwrap());
}

#[test]
fn test_impossible_dates_fall_back() {
    assert!(parse_date("2/30/25, 10:00").is_none());
    assert!(parse_date("2025-13-01 00:00:00").is_none());

    let date = normalize("2025-02-30 10:00:00");
    assert!(date.fallback);
    assert_eq!(date.instant.timestamp(), 0);
}

#[test]
fn test_trailing_garbage_rejected() {
    assert!(parse_date("1/1/25, 12:00 tomorrow").is_none());
    assert!(parse_date("").is_none());
}

// =============================================================================
// Transcript parsing
// =============================================================================

#[test]
fn test_mixed_date_styles_in_one_transcript() {
    let messages = transcript(
        "1/1/25, 12:00 - Alice: us\n\
         [01.01.2025, 12:01:00] Alice: bracket\n\
         01.01.2025, 12:02:00 - Alice: plain",
    );
    let styles: Vec<_> = messages.iter().map(Message::date_style).collect();
    assert_eq!(
        styles,
        vec![DateStyle::Us, DateStyle::EuBracket, DateStyle::EuPlain]
    );
}

#[test]
fn test_windows_line_endings() {
    let messages = transcript("1/1/25, 12:00 - Alice: Hi\r\n1/1/25, 12:01 - Bob: Yo\r\n");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].body(), "Hi");
}

#[test]
fn test_unicode_senders_and_bodies() {
    let messages = transcript("1/1/25, 12:00 - Иван: Привет 👋\n1/1/25, 12:01 - 李雷: 你好");
    assert_eq!(messages[0].canonical_sender(), "Иван");
    assert_eq!(messages[0].body(), "Привет 👋");
    assert_eq!(messages[1].sender(), "李雷");
}

#[test]
fn test_empty_body() {
    let messages = transcript("1/1/25, 12:00 - Alice: ");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].body(), "");
}

#[test]
fn test_attachment_with_bidi_mark() {
    let messages = transcript("1/1/25, 12:00 - Alice: \u{200e}VID-1.mp4 (file attached)");
    assert_eq!(messages[0].message_type(), MessageType::Video);
    assert_eq!(messages[0].body(), "VID-1.mp4");
}

#[test]
fn test_custom_media_placeholder() {
    let parser = TranscriptParser::with_config(
        TranscriptConfig::new().with_media_placeholder("<Medien ausgeschlossen>"),
    );
    let messages = parser
        .parse_str("1/1/25, 12:00 - Alice: <Medien ausgeschlossen>")
        .unwrap();
    assert_eq!(messages[0].body(), "[image]");
}

#[test]
fn test_only_system_messages() {
    let messages = transcript(
        "1/1/25, 11:59 - Messages and calls are end-to-end encrypted.\n\
         1/1/25, 12:00 - Alice created group \"Trip\"",
    );
    assert!(messages.is_empty());
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn test_phone_formats_converge() {
    let me = SelfIdentity::default();
    let config = IdentityConfig::default();
    let tokens: Vec<_> = ["+1 (555) 010-0000", "+1 555 010 0000", "+15550100000", "\u{202a}+1 555-010-0000\u{202c}"]
        .iter()
        .map(|label| canonicalize(label, None, &me, &config))
        .collect();
    assert!(tokens.iter().all(|t| t == "+15550100000"));
}

#[test]
fn test_self_by_phone_number() {
    let me = SelfIdentity::new(["+1 555 010 0000"]);
    let config = IdentityConfig::default();
    assert_eq!(canonicalize("+15550100000", None, &me, &config), "SELF");
}

#[test]
fn test_shortening_can_be_disabled() {
    let me = SelfIdentity::default();
    let config = IdentityConfig::new().with_shorten_labels(false);
    assert_eq!(canonicalize("Alice Smith", None, &me, &config), "Alice Smith");
}

#[test]
fn test_blank_label_gets_placeholder() {
    let me = SelfIdentity::default();
    assert_eq!(
        canonicalize("   ", None, &me, &IdentityConfig::default()),
        "UNKNOWN"
    );
}

#[test]
fn test_similar_labels_stay_distinct() {
    let me = SelfIdentity::default();
    let config = IdentityConfig::default();
    assert_ne!(
        canonicalize("Alice", None, &me, &config),
        canonicalize("Alicia", None, &me, &config)
    );
}

// =============================================================================
// Merging
// =============================================================================

#[test]
fn test_phone_and_formatted_phone_deduplicate() {
    let records = RecordParser::new()
        .parse_str(
            r#"[{"formattedName":"+1 (555) 010-0000","messageTime":"2025-01-01 12:00:00",
                 "messageType":"chat","messageBody":"call me"}]"#,
        )
        .unwrap();
    let native = transcript("1/1/25, 12:00 - +1 555 010 0000: call me");

    assert_eq!(merge(records, native).len(), 1);
}

#[test]
fn test_clock_skew_within_window() {
    let records = RecordParser::new()
        .parse_str(
            r#"[{"formattedName":"Alice","messageTime":"2025-01-01 12:03:59",
                 "messageType":"chat","messageBody":"skewed"}]"#,
        )
        .unwrap();
    let native = transcript("1/1/25, 12:01 - Alice: skewed");

    let merged = merge(records, native);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].origin(), SourceOrigin::Record);
}

#[test]
fn test_same_text_different_type_kept() {
    let records = RecordParser::new()
        .parse_str(
            r#"[{"formattedName":"Alice","messageTime":"2025-01-01 12:00:00",
                 "messageType":"image","messageBody":"a.jpg"}]"#,
        )
        .unwrap();
    let native = transcript("1/1/25, 12:00 - Alice: a.jpg");

    assert_eq!(merge(records, native).len(), 2);
}
