//! Configuration types for parsing, identity normalization and syncing.
//!
//! Plain builder structs with no CLI framework dependencies:
//!
//! - [`TranscriptConfig`] - transcript parser settings
//! - [`IdentityConfig`] - sender label normalization settings
//! - [`SyncConfig`] - chat directory layout and pipeline switches
//!
//! The self-identity list itself lives in a side file and is loaded through
//! [`SelfIdentity`](crate::identity::SelfIdentity).
//!
//! # Example
//!
//! ```rust
//! use chatsync::config::{IdentityConfig, SyncConfig};
//!
//! let config = SyncConfig::new()
//!     .with_dry_run(true)
//!     .with_identity(IdentityConfig::new().with_shorten_labels(false));
//!
//! assert!(config.dry_run);
//! assert_eq!(config.record_file, "messages.json");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Token some export tools write instead of a media file that failed to embed.
pub const DEFAULT_MEDIA_PLACEHOLDER: &str = "<Media omitted>";

/// Body given to the synthetic message that replaces [`DEFAULT_MEDIA_PLACEHOLDER`].
pub const MEDIA_REFERENCE_BODY: &str = "[image]";

/// Configuration for transcript parsing.
///
/// # Example
///
/// ```rust
/// use chatsync::config::TranscriptConfig;
///
/// let config = TranscriptConfig::new()
///     .with_skip_system_messages(true);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Drop sender-less lines such as encryption notices (default: true)
    pub skip_system_messages: bool,

    /// Body that marks a media file that failed to embed (default: `<Media omitted>`)
    pub media_placeholder: String,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            skip_system_messages: true,
            media_placeholder: DEFAULT_MEDIA_PLACEHOLDER.to_string(),
        }
    }
}

impl TranscriptConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to drop system messages.
    #[must_use]
    pub fn with_skip_system_messages(mut self, skip: bool) -> Self {
        self.skip_system_messages = skip;
        self
    }

    /// Sets the media placeholder token.
    #[must_use]
    pub fn with_media_placeholder(mut self, token: impl Into<String>) -> Self {
        self.media_placeholder = token.into();
        self
    }
}

/// Configuration for sender label normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Reduce verbose display labels to their first meaningful word so
    /// "Dr. Alice Smith (Work)" and "Alice" resolve to the same contact
    /// (default: true)
    pub shorten_labels: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            shorten_labels: true,
        }
    }
}

impl IdentityConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables label shortening.
    #[must_use]
    pub fn with_shorten_labels(mut self, shorten: bool) -> Self {
        self.shorten_labels = shorten;
        self
    }
}

/// Configuration for syncing one chat directory.
///
/// All paths are relative to the chat directory unless
/// [`self_identity_path`](Self::self_identity_path) is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Structured record file name (default: `messages.json`)
    pub record_file: String,

    /// Subdirectory holding the transcript and raw media (default: `transcript`)
    pub transcript_dir: String,

    /// Self-identity side file name (default: `self_identity.json`)
    pub identity_file: String,

    /// Explicit self-identity file, overriding `identity_file`
    pub self_identity_path: Option<PathBuf>,

    /// Parse and merge without writing anything (default: false)
    pub dry_run: bool,

    /// Copy misplaced attachments into their media directories (default: true)
    pub reconcile_media: bool,

    /// Back up each source before overwriting it (default: true)
    pub write_backups: bool,

    pub identity: IdentityConfig,

    pub transcript: TranscriptConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            record_file: "messages.json".to_string(),
            transcript_dir: "transcript".to_string(),
            identity_file: "self_identity.json".to_string(),
            self_identity_path: None,
            dry_run: false,
            reconcile_media: true,
            write_backups: true,
            identity: IdentityConfig::default(),
            transcript: TranscriptConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record_file(mut self, name: impl Into<String>) -> Self {
        self.record_file = name.into();
        self
    }

    #[must_use]
    pub fn with_transcript_dir(mut self, name: impl Into<String>) -> Self {
        self.transcript_dir = name.into();
        self
    }

    #[must_use]
    pub fn with_self_identity_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.self_identity_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_reconcile_media(mut self, enabled: bool) -> Self {
        self.reconcile_media = enabled;
        self
    }

    #[must_use]
    pub fn with_write_backups(mut self, enabled: bool) -> Self {
        self.write_backups = enabled;
        self
    }

    #[must_use]
    pub fn with_identity(mut self, identity: IdentityConfig) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub fn with_transcript(mut self, transcript: TranscriptConfig) -> Self {
        self.transcript = transcript;
        self
    }
}
