//! Message fingerprints used to recognise the same message across exports.
//!
//! Two keys are derived from normalized fields only:
//!
//! - [`content_fingerprint`]: canonical sender, message type and body.
//!   Equal for reposts no matter how far apart in time.
//! - [`window_fingerprint`]: the same fields plus the timestamp floored to a
//!   [`WINDOW_SECONDS`] window. Equal only for near-simultaneous copies.
//!
//! Body comparison is case-sensitive. Trailing whitespace on each line and
//! blank lines are ignored, because transcripts cannot represent them.
//!
//! Content-only keys will merge two distinct short messages with the same
//! text from the same sender sent hours apart ("ok", "thanks"). That is an
//! accepted limitation: the archive favours dropping a repeated "ok" over
//! keeping cross-export duplicates.

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::Message;

/// Width of the time window, in seconds.
pub const WINDOW_SECONDS: i64 = 300;

/// An opaque, comparable fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u64);

/// Tag mixed into each key so the two kinds never collide with each other.
#[derive(Hash)]
enum Kind {
    Content,
    Window(i64),
}

/// Normalizes a body for comparison.
///
/// ```
/// use chatsync::core::fingerprint::normalize_body;
///
/// assert_eq!(normalize_body("  Hi  \n\nthere \n"), "Hi\nthere");
/// ```
pub fn normalize_body(body: &str) -> String {
    body.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn fingerprint(message: &Message, kind: Kind) -> Fingerprint {
    let mut hasher = DefaultHasher::new();
    kind.hash(&mut hasher);
    message.canonical_sender().hash(&mut hasher);
    message.message_type().hash(&mut hasher);
    normalize_body(message.body()).hash(&mut hasher);
    Fingerprint(hasher.finish())
}

/// The window a message falls into.
pub fn window_of(message: &Message) -> i64 {
    message.timestamp().timestamp().div_euclid(WINDOW_SECONDS)
}

/// Fingerprint of sender, type and body.
pub fn content_fingerprint(message: &Message) -> Fingerprint {
    fingerprint(message, Kind::Content)
}

/// Fingerprint of sender, type, body and time window.
pub fn window_fingerprint(message: &Message) -> Fingerprint {
    fingerprint(message, Kind::Window(window_of(message)))
}
