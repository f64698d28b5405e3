//! Sender identity normalization.
//!
//! The two exports label the same person differently: the record file may
//! say `Dr. Alice Smith (Work)` where the transcript says `Alice`, or give a
//! formatted phone number where the transcript has a bare one. Deduplication
//! compares canonical identity tokens instead of raw labels.
//!
//! [`canonicalize`] applies these rules in order:
//!
//! 1. The label or display name is listed in the [`SelfIdentity`] → [`SELF_TOKEN`].
//! 2. The label is phone-shaped (`+` then digits and punctuation) → `+` and digits only.
//! 3. Otherwise the display name if present, else the label, shortened to its
//!    first meaningful word when [`IdentityConfig::shorten_labels`] is on.
//!
//! The result depends only on its inputs and the static configuration.
//! Unmapped labels are never matched against each other by message
//! similarity; each one is its own identity.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::config::IdentityConfig;
use crate::error::{ChatsyncError, Result};

/// Canonical token for the backup owner.
pub const SELF_TOKEN: &str = "SELF";

/// Label that always denotes the backup owner.
pub const SELF_MARKER: &str = "You";

/// Token used when a sender label is blank.
pub const UNKNOWN_TOKEN: &str = "UNKNOWN";

/// Descriptor words dropped when shortening a label.
const FILLER_WORDS: &[&str] = &[
    "dr", "mr", "mrs", "ms", "miss", "prof", "sir", "admin", "work", "home", "mobile", "cell",
    "office", "the",
];

static PHONE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[\d\s\-().]*\d[\d\s\-().]*$").expect("valid phone regex"));

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").expect("valid bracket regex"));

/// The set of labels that denote the backup owner.
///
/// Always contains [`SELF_MARKER`]; configured entries are added to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfIdentity {
    entries: BTreeSet<String>,
}

/// Accepted shapes of the self-identity side file.
#[derive(Deserialize)]
#[serde(untagged)]
enum SelfIdentityFile {
    List(Vec<String>),
    Object {
        #[serde(rename = "self")]
        entries: Vec<String>,
    },
}

impl Default for SelfIdentity {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl SelfIdentity {
    /// Creates a self-identity from configured labels plus [`SELF_MARKER`].
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: BTreeSet<String> = entries
            .into_iter()
            .map(|e| clean_label(e.as_ref()).to_string())
            .filter(|e| !e.is_empty())
            .collect();
        set.insert(SELF_MARKER.to_string());
        Self { entries: set }
    }

    /// Loads the side file, or the default when it does not exist.
    ///
    /// The file holds either a JSON list (`["Mike", "+1 555 0100"]`) or an
    /// object with a `self` list. Any other content is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No self-identity file, treating \"You\" as self");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let file: SelfIdentityFile = serde_json::from_str(&content)
            .map_err(|e| ChatsyncError::invalid_config(path, e.to_string()))?;

        let entries = match file {
            SelfIdentityFile::List(entries) | SelfIdentityFile::Object { entries } => entries,
        };
        let identity = Self::new(entries);
        tracing::info!(path = %path.display(), entries = identity.len(), "Loaded self-identity");
        Ok(identity)
    }

    /// Returns `true` if the label names the backup owner.
    ///
    /// Labels match exactly after trimming. Phone-shaped labels also match
    /// an entry with the same digits in a different layout.
    pub fn is_self(&self, label: &str) -> bool {
        let label = clean_label(label);
        if label.is_empty() {
            return false;
        }
        if self.entries.contains(label) {
            return true;
        }
        is_phone_label(label)
            && self
                .entries
                .iter()
                .any(|e| is_phone_label(e) && normalize_phone(e) == normalize_phone(label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// Strips whitespace and the bidi marks WhatsApp wraps around phone numbers.
fn clean_label(label: &str) -> &str {
    label.trim_matches(|c: char| c.is_whitespace() || matches!(c, '\u{200e}' | '\u{200f}' | '\u{202a}' | '\u{202c}'))
}

/// Returns `true` for labels shaped like `+1 (555) 010-0000`.
pub fn is_phone_label(label: &str) -> bool {
    PHONE_LABEL.is_match(clean_label(label))
}

/// Reduces a phone label to `+` followed by its digits.
///
/// ```
/// use chatsync::identity::normalize_phone;
///
/// assert_eq!(normalize_phone("+1 (555) 010-0000"), "+15550100000");
/// ```
pub fn normalize_phone(label: &str) -> String {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    format!("+{digits}")
}

/// Reduces a verbose label to its first meaningful word.
///
/// Bracketed descriptors, a leading `~`, and filler words such as titles or
/// `Work` are dropped. Returns `None` when nothing meaningful remains.
///
/// ```
/// use chatsync::identity::shorten_label;
///
/// assert_eq!(shorten_label("Dr. Alice Smith (Work)").as_deref(), Some("Alice"));
/// assert_eq!(shorten_label("~ Bob | Sales").as_deref(), Some("Bob"));
/// assert_eq!(shorten_label("(admin)"), None);
/// ```
pub fn shorten_label(label: &str) -> Option<String> {
    let stripped = BRACKETED.replace_all(label, " ");
    stripped
        .split(|c: char| c.is_whitespace() || matches!(c, '|' | ',' | '/' | '~'))
        .map(|word| word.trim_matches(|c: char| matches!(c, '.' | '-' | ':' | '\'' | '"')))
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .find(|word| !FILLER_WORDS.contains(&word.to_lowercase().as_str()))
        .map(ToString::to_string)
}

/// Maps a sender label to its canonical identity token.
///
/// ```
/// use chatsync::config::IdentityConfig;
/// use chatsync::identity::{SelfIdentity, canonicalize};
///
/// let me = SelfIdentity::new(["Mike"]);
/// let config = IdentityConfig::default();
///
/// assert_eq!(canonicalize("Mike", None, &me, &config), "SELF");
/// assert_eq!(canonicalize("You", None, &me, &config), "SELF");
/// assert_eq!(canonicalize("+44 20 7946 0000", None, &me, &config), "+442079460000");
/// assert_eq!(canonicalize("Alice Smith", None, &me, &config), "Alice");
/// assert_eq!(canonicalize("A. Smith", Some("Alice"), &me, &config), "Alice");
/// ```
pub fn canonicalize(
    label: &str,
    display_name: Option<&str>,
    identities: &SelfIdentity,
    config: &IdentityConfig,
) -> String {
    if identities.is_self(label) || display_name.is_some_and(|name| identities.is_self(name)) {
        return SELF_TOKEN.to_string();
    }

    if is_phone_label(label) {
        return normalize_phone(label);
    }

    let chosen = display_name
        .map(clean_label)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| clean_label(label));

    if is_phone_label(chosen) {
        return normalize_phone(chosen);
    }

    let token = if config.shorten_labels {
        shorten_label(chosen).unwrap_or_else(|| chosen.to_string())
    } else {
        chosen.to_string()
    };

    if token.is_empty() {
        tracing::warn!(label = %label, "Blank sender label, using placeholder identity");
        return UNKNOWN_TOKEN.to_string();
    }
    token
}

/// Picks the label to write into a transcript so that parsing it back yields
/// the same canonical token as `(label, display_name)`.
///
/// Transcripts carry a single sender label and no display name, so the label
/// that actually decided the token has to be the one written.
pub fn preferred_label<'a>(
    label: &'a str,
    display_name: Option<&'a str>,
    identities: &SelfIdentity,
) -> &'a str {
    let display = display_name.filter(|name| !clean_label(name).is_empty());

    if identities.is_self(label) || is_phone_label(label) {
        return label;
    }
    display.unwrap_or(label)
}
