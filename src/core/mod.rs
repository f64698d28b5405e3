//! Merge engine and output writers.
//!
//! This module contains:
//! - [`fingerprint`] - Content and time-window fingerprints
//! - [`merge`](mod@merge) - Deduplicating merge of both exports
//! - [`output`] - Record file and transcript writers
//!
//! # Quick Start
//!
//! ```rust
//! use chatsync::core::{MergeStats, merge_with_stats, to_transcript};
//! ```

pub mod fingerprint;
pub mod merge;
pub mod output;

pub use fingerprint::{Fingerprint, content_fingerprint, window_fingerprint};
pub use merge::{MergeStats, merge, merge_with_stats};
pub use output::{RecordDefaults, dominant_style, to_records_json, to_transcript};

// Re-export Message from the crate root
pub use crate::Message;
