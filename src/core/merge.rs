//! Merging and deduplication of the two exports.
//!
//! Both sequences are concatenated (records first), stably sorted by
//! timestamp, and walked once. A message is dropped when its content
//! fingerprint or its window fingerprint has been seen before; otherwise it
//! is kept and both fingerprints are recorded.
//!
//! When a record copy and a transcript copy are the same message (both
//! fingerprints equal), the record copy survives because it carries more
//! metadata. It takes the transcript copy's date style whichever of the two
//! sorts first, so re-emitting the transcript does not change its
//! formatting.
//!
//! Transcripts name attachments by file only, so their type is inferred
//! from the extension. Before the walk, a transcript attachment takes the
//! declared type of a record attachment with the same sender, file name and
//! window.
//!
//! Merging a merged sequence again, alone or against itself, returns it
//! unchanged: kept messages have pairwise distinct content fingerprints.

use std::collections::{HashMap, HashSet};

use crate::Message;
use crate::core::fingerprint::{
    Fingerprint, content_fingerprint, normalize_body, window_fingerprint, window_of,
};
use crate::message::{DateStyle, MessageType, SourceOrigin};

/// Statistics about a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    /// Messages in both inputs combined
    pub input: usize,
    /// Messages in the merged result
    pub kept: usize,
    /// Messages dropped as duplicates
    pub duplicates: usize,
    /// Transcript copies replaced by their record copy
    pub replaced: usize,
}

impl MergeStats {
    /// Percentage of input messages that were duplicates.
    pub fn duplicate_ratio(&self) -> f64 {
        if self.input == 0 {
            return 0.0;
        }
        self.duplicates as f64 / self.input as f64 * 100.0
    }
}

/// Identifies one attachment across exports, type aside.
fn attachment_key(msg: &Message) -> (String, String, i64) {
    (
        msg.canonical_sender().to_string(),
        normalize_body(msg.body()),
        window_of(msg),
    )
}

/// Gives transcript attachments the declared type of their record copy.
fn align_attachment_types(all: Vec<Message>) -> Vec<Message> {
    let declared: HashMap<_, MessageType> = all
        .iter()
        .filter(|m| m.origin() == SourceOrigin::Record && m.is_attachment())
        .map(|m| (attachment_key(m), m.message_type()))
        .collect();
    if declared.is_empty() {
        return all;
    }

    all.into_iter()
        .map(|msg| {
            if msg.origin() != SourceOrigin::Transcript || !msg.is_attachment() {
                return msg;
            }
            match declared.get(&attachment_key(&msg)) {
                Some(&kind) if kind != msg.message_type() => {
                    tracing::debug!(
                        filename = msg.body(),
                        inferred = %msg.message_type(),
                        declared = %kind,
                        "Using declared attachment type"
                    );
                    msg.with_message_type(kind)
                }
                _ => msg,
            }
        })
        .collect()
}

/// Merges two message sequences into one deduplicated, chronological list.
///
/// # Example
///
/// ```rust
/// use chatsync::Message;
/// use chatsync::core::merge;
/// use chrono::{TimeZone, Utc};
///
/// let noon = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
/// let records = vec![Message::new("Alice", "Hi", noon)];
/// let transcript = vec![
///     Message::new("Alice", "Hi", noon),
///     Message::new("Alice", "Later", noon + chrono::Duration::minutes(1)),
/// ];
///
/// let merged = merge(records, transcript);
/// assert_eq!(merged.len(), 2);
/// ```
pub fn merge(records: Vec<Message>, transcript: Vec<Message>) -> Vec<Message> {
    merge_with_stats(records, transcript).0
}

/// Like [`merge`], also returning statistics.
pub fn merge_with_stats(
    records: Vec<Message>,
    transcript: Vec<Message>,
) -> (Vec<Message>, MergeStats) {
    let mut all = records;
    all.extend(transcript);
    let input = all.len();
    let mut all = align_attachment_types(all);

    // Stable: equal timestamps keep input order, records before transcript.
    all.sort_by_key(Message::timestamp);

    let mut kept: Vec<Message> = Vec::with_capacity(all.len());
    let mut by_content: HashMap<Fingerprint, usize> = HashMap::new();
    let mut seen_windows: HashSet<Fingerprint> = HashSet::new();
    // Transcript styles for kept record copies, by position in `kept`.
    let mut carried: HashMap<usize, DateStyle> = HashMap::new();
    let mut duplicates = 0;
    let mut replaced = 0;

    for candidate in all {
        let content = content_fingerprint(&candidate);
        let window = window_fingerprint(&candidate);

        match by_content.get(&content) {
            Some(&idx) => {
                duplicates += 1;
                let existing = &kept[idx];
                if candidate.origin() == SourceOrigin::Record
                    && existing.origin() == SourceOrigin::Transcript
                    && window_fingerprint(existing) == window
                {
                    tracing::debug!(
                        sender = candidate.canonical_sender(),
                        "Record copy replaces transcript copy"
                    );
                    let style = existing.date_style();
                    kept[idx] = candidate.with_date_style(style);
                    replaced += 1;
                } else if candidate.origin() == SourceOrigin::Transcript
                    && existing.origin() == SourceOrigin::Record
                    && !existing.date_style().is_transcript()
                    && window_fingerprint(existing) == window
                {
                    tracing::debug!(
                        sender = candidate.canonical_sender(),
                        "Record copy keeps transcript date style"
                    );
                    carried.entry(idx).or_insert(candidate.date_style());
                } else {
                    tracing::debug!(
                        sender = candidate.canonical_sender(),
                        origin = %candidate.origin(),
                        "Dropping duplicate message"
                    );
                }
            }
            None if seen_windows.contains(&window) => {
                duplicates += 1;
                tracing::debug!(
                    sender = candidate.canonical_sender(),
                    "Dropping duplicate message in same window"
                );
            }
            None => {
                by_content.insert(content, kept.len());
                seen_windows.insert(window);
                kept.push(candidate);
            }
        }
    }

    let mut kept: Vec<Message> = if carried.is_empty() {
        kept
    } else {
        kept.into_iter()
            .enumerate()
            .map(|(idx, msg)| match carried.get(&idx) {
                Some(&style) => msg.with_date_style(style),
                None => msg,
            })
            .collect()
    };

    if replaced > 0 {
        kept.sort_by_key(Message::timestamp);
    }

    let stats = MergeStats {
        input,
        kept: kept.len(),
        duplicates,
        replaced,
    };
    (kept, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{DateStyle, MessageType};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, h, m, s).unwrap()
    }

    fn record(sender: &str, body: &str, ts: DateTime<Utc>) -> Message {
        Message::new(sender, body, ts).with_origin(SourceOrigin::Record)
    }

    fn transcript(sender: &str, body: &str, ts: DateTime<Utc>) -> Message {
        Message::new(sender, body, ts)
            .with_origin(SourceOrigin::Transcript)
            .with_date_style(DateStyle::Us)
    }

    #[test]
    fn test_cross_format_duplicate_collapses() {
        let records = vec![
            record("SELF", "Hello from JSON!", at(12, 0, 0)),
            record("Alice", "Hi there!", at(12, 1, 0)),
        ];
        let native = vec![
            transcript("SELF", "Hello from JSON!", at(12, 0, 0)),
            transcript("Alice", "Hi there!", at(12, 1, 0)),
            transcript("Alice", "New message from native", at(12, 2, 0)),
        ];

        let (merged, stats) = merge_with_stats(records, native);
        assert_eq!(merged.len(), 3);
        assert_eq!(stats.input, 5);
        assert_eq!(stats.kept, 3);
        assert_eq!(stats.duplicates, 2);
        assert_eq!(merged[0].body(), "Hello from JSON!");
        assert_eq!(merged[0].origin(), SourceOrigin::Record);
        assert_eq!(merged[2].body(), "New message from native");
    }

    #[test]
    fn test_output_is_chronological() {
        let merged = merge(
            vec![record("A", "3", at(12, 3, 0)), record("A", "1", at(12, 1, 0))],
            vec![transcript("B", "2", at(12, 2, 0))],
        );
        let bodies: Vec<_> = merged.iter().map(Message::body).collect();
        assert_eq!(bodies, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_stable_for_equal_timestamps() {
        let merged = merge(
            vec![record("A", "first", at(12, 0, 0))],
            vec![transcript("B", "second", at(12, 0, 0))],
        );
        assert_eq!(merged[0].body(), "first");
        assert_eq!(merged[1].body(), "second");
    }

    #[test]
    fn test_distant_repost_is_dropped() {
        let merged = merge(
            vec![record("A", "ok", at(9, 0, 0)), record("A", "ok", at(18, 0, 0))],
            vec![],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].timestamp(), at(9, 0, 0));
    }

    #[test]
    fn test_distinct_messages_survive() {
        let merged = merge(
            vec![
                record("A", "ok", at(12, 0, 0)),
                record("B", "ok", at(12, 0, 0)),
                record("A", "ok.jpg", at(12, 0, 0)).with_message_type(MessageType::Image),
                record("A", "OK", at(12, 0, 0)),
            ],
            vec![],
        );
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_record_copy_replaces_earlier_transcript_copy() {
        // The transcript lost the seconds, so its copy sorts first.
        let merged = merge(
            vec![record("A", "hi", at(12, 0, 30))],
            vec![transcript("A", "hi", at(12, 0, 0))],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].origin(), SourceOrigin::Record);
        assert_eq!(merged[0].timestamp(), at(12, 0, 30));
        assert_eq!(merged[0].date_style(), DateStyle::Us);
    }

    #[test]
    fn test_replacement_resorts() {
        let (merged, stats) = merge_with_stats(
            vec![record("A", "hi", at(12, 0, 40))],
            vec![
                transcript("A", "hi", at(12, 0, 0)),
                transcript("B", "between", at(12, 0, 20)),
            ],
        );
        assert_eq!(stats.replaced, 1);
        let bodies: Vec<_> = merged.iter().map(Message::body).collect();
        assert_eq!(bodies, vec!["between", "hi"]);
    }

    #[test]
    fn test_record_in_other_window_does_not_replace() {
        let merged = merge(
            vec![record("A", "ok", at(15, 0, 0))],
            vec![transcript("A", "ok", at(10, 0, 0))],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].origin(), SourceOrigin::Transcript);
    }

    #[test]
    fn test_record_sorting_first_takes_transcript_style() {
        let bracketed = Message::new("A", "hi", at(12, 2, 7))
            .with_origin(SourceOrigin::Transcript)
            .with_date_style(DateStyle::EuBracket);
        let (merged, stats) =
            merge_with_stats(vec![record("A", "hi", at(12, 2, 7))], vec![bracketed]);

        assert_eq!(merged.len(), 1);
        assert_eq!(stats.replaced, 0);
        assert_eq!(merged[0].origin(), SourceOrigin::Record);
        assert_eq!(merged[0].date_style(), DateStyle::EuBracket);
    }

    #[test]
    fn test_distant_transcript_repost_keeps_record_style() {
        let merged = merge(
            vec![record("A", "ok", at(10, 0, 0))],
            vec![transcript("A", "ok", at(15, 0, 0))],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].date_style(), DateStyle::Record);
    }

    #[test]
    fn test_transcript_attachment_takes_declared_type() {
        let declared = record("A", "IMG-0001", at(12, 0, 30)).with_message_type(MessageType::Image);
        let inferred = transcript("A", "IMG-0001", at(12, 0, 0))
            .with_message_type(MessageType::from_filename("IMG-0001"));
        assert_eq!(inferred.message_type(), MessageType::Document);

        let merged = merge(vec![declared], vec![inferred]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].message_type(), MessageType::Image);
        assert_eq!(merged[0].origin(), SourceOrigin::Record);
    }

    #[test]
    fn test_declared_type_needs_same_window() {
        let declared = record("A", "clip.gif", at(9, 0, 0)).with_message_type(MessageType::Video);
        let inferred = transcript("A", "clip.gif", at(18, 0, 0)).with_message_type(MessageType::Image);

        let merged = merge(vec![declared], vec![inferred]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].message_type(), MessageType::Image);
    }

    #[test]
    fn test_idempotent_alone_and_against_itself() {
        let merged = merge(
            vec![
                record("A", "one", at(12, 0, 0)),
                record("B", "two", at(12, 0, 0)),
            ],
            vec![
                transcript("A", "one", at(12, 0, 0)),
                transcript("C", "three", at(12, 4, 0)),
            ],
        );

        assert_eq!(merge(merged.clone(), Vec::new()), merged);
        assert_eq!(merge(merged.clone(), merged.clone()), merged);
    }

    #[test]
    fn test_empty_inputs() {
        let (merged, stats) = merge_with_stats(Vec::new(), Vec::new());
        assert!(merged.is_empty());
        assert_eq!(stats, MergeStats::default());
        assert!(stats.duplicate_ratio().abs() < f64::EPSILON);
    }
}
