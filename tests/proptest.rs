//! Property-based tests for chatsync.
//!
//! These tests generate random message sets to check the merge invariants.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use chatsync::core::fingerprint::content_fingerprint;
use chatsync::core::{merge, to_transcript};
use chatsync::identity::SelfIdentity;
use chatsync::message::{DateStyle, MessageType, SourceOrigin};
use chatsync::parser::Parser;
use chatsync::parsers::TranscriptParser;
use chatsync::Message;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// Generate a random Message using fast strategies (no regex!)
fn arb_message() -> impl Strategy<Value = Message> {
    (
        prop::sample::select(vec!["Alice", "Bob", "SELF", "+15550100000", "Иван"]),
        prop::sample::select(vec![
            "ok",
            "Hello",
            "Hi there!",
            "Привет мир",
            "🎉🔥 emoji",
            "two\nlines",
            "photo.jpg",
        ]),
        // Seconds within two hours, enough for window collisions.
        0i64..7200,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(sender, body, secs, from_transcript, attachment)| {
            let kind = if attachment && body == "photo.jpg" {
                MessageType::Image
            } else {
                MessageType::Chat
            };
            let (origin, style) = if from_transcript {
                (SourceOrigin::Transcript, DateStyle::EuBracket)
            } else {
                (SourceOrigin::Record, DateStyle::Record)
            };
            Message::new(sender, body, base() + chrono::Duration::seconds(secs))
                .with_message_type(kind)
                .with_origin(origin)
                .with_date_style(style)
        })
}

/// Generate a vector of random messages
fn arb_messages(max_len: usize) -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(arb_message(), 0..max_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn merged_output_is_chronological(a in arb_messages(40), b in arb_messages(40)) {
        let merged = merge(a, b);
        for pair in merged.windows(2) {
            prop_assert!(pair[0].timestamp() <= pair[1].timestamp());
        }
    }

    #[test]
    fn merge_is_idempotent_alone(a in arb_messages(40), b in arb_messages(40)) {
        let merged = merge(a, b);
        prop_assert_eq!(merge(merged.clone(), Vec::new()), merged.clone());
        prop_assert_eq!(merge(Vec::new(), merged.clone()), merged);
    }

    #[test]
    fn merge_is_idempotent_against_itself(a in arb_messages(40), b in arb_messages(40)) {
        let merged = merge(a, b);
        prop_assert_eq!(merge(merged.clone(), merged.clone()), merged);
    }

    #[test]
    fn merged_messages_are_pairwise_distinct(a in arb_messages(40), b in arb_messages(40)) {
        let merged = merge(a, b);
        let fingerprints: HashSet<_> = merged.iter().map(content_fingerprint).collect();
        prop_assert_eq!(fingerprints.len(), merged.len());
    }

    #[test]
    fn no_distinct_message_is_lost(a in arb_messages(40), b in arb_messages(40)) {
        let input: HashSet<_> = a.iter().chain(b.iter()).map(content_fingerprint).collect();
        let merged = merge(a, b);
        let output: HashSet<_> = merged.iter().map(content_fingerprint).collect();
        prop_assert_eq!(input, output);
    }

    #[test]
    fn merge_never_grows(a in arb_messages(40), b in arb_messages(40)) {
        let total = a.len() + b.len();
        prop_assert!(merge(a, b).len() <= total);
    }

    #[test]
    fn transcript_round_trip_keeps_fingerprints(a in arb_messages(30)) {
        let me = SelfIdentity::new(["Me"]);
        let merged = merge(a, Vec::new());
        // Raw labels that canonicalize to the generated tokens.
        let relabeled: Vec<Message> = merged
            .into_iter()
            .map(|m| {
                let label = if m.canonical_sender() == "SELF" { "Me".to_string() } else { m.sender().to_string() };
                Message::new(label, m.body(), m.timestamp())
                    .with_canonical_sender(m.canonical_sender())
                    .with_message_type(m.message_type())
                    .with_date_style(DateStyle::EuBracket)
            })
            .collect();

        let text = to_transcript(&relabeled, &me, DateStyle::EuBracket);
        let reparsed = TranscriptParser::new().with_identities(me).parse_str(&text).unwrap();

        let before: Vec<_> = relabeled.iter().map(content_fingerprint).collect();
        let after: Vec<_> = reparsed.iter().map(content_fingerprint).collect();
        prop_assert_eq!(before, after);
    }
}
