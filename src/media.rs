//! Media reconciliation.
//!
//! Every attachment belongs in the media directory for its type
//! (`image`, `video`, `audio`, `document`). Files that ended up somewhere
//! else, typically next to the transcript, are copied into place. Files that
//! cannot be found anywhere are reported with a warning; reconciliation
//! never fails the sync.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatsync::media::MediaReconciler;
//!
//! # let messages: Vec<chatsync::Message> = Vec::new();
//! let report = MediaReconciler::new("chats/alice").reconcile(&messages);
//! for name in &report.missing {
//!     eprintln!("missing: {name}");
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Message;

/// Media directory names, in fallback search order.
pub const MEDIA_DIRS: [&str; 4] = ["image", "video", "audio", "document"];

/// A file copied into its canonical directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub filename: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaReport {
    /// Attachments already in their canonical directory
    pub present: usize,
    /// Attachments copied (or, in a dry run, to be copied) into place
    pub relocated: Vec<Relocation>,
    /// Attachments not found in any searched location
    pub missing: Vec<String>,
}

impl MediaReport {
    /// Total attachments examined.
    pub fn total(&self) -> usize {
        self.present + self.relocated.len() + self.missing.len()
    }
}

/// Reconciles attachments of one chat directory.
#[derive(Debug, Clone)]
pub struct MediaReconciler {
    root: PathBuf,
    transcript_dir: String,
    dry_run: bool,
}

impl MediaReconciler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            transcript_dir: "transcript".to_string(),
            dry_run: false,
        }
    }

    /// Sets the transcript subdirectory searched as a last resort.
    #[must_use]
    pub fn with_transcript_dir(mut self, name: impl Into<String>) -> Self {
        self.transcript_dir = name.into();
        self
    }

    /// Reports what would be copied without touching the filesystem.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Locations searched for a file missing from `canonical`, in order.
    fn fallbacks(&self, canonical: &'static str) -> impl Iterator<Item = PathBuf> + '_ {
        MEDIA_DIRS
            .into_iter()
            .filter(move |dir| *dir != canonical)
            .map(|dir| self.root.join(dir))
            .chain(std::iter::once(self.root.join(&self.transcript_dir)))
    }

    fn copy_into_place(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
        Ok(())
    }

    /// Checks every attachment in `messages` and copies misplaced files.
    pub fn reconcile(&self, messages: &[Message]) -> MediaReport {
        let mut report = MediaReport::default();
        let mut seen = HashSet::new();

        for msg in messages.iter().filter(|m| m.is_attachment()) {
            let filename = msg.body().trim();
            let Some(canonical) = msg.message_type().media_dir() else {
                continue;
            };

            if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
                tracing::warn!(filename = %filename, "Attachment name is not a plain file name");
                report.missing.push(filename.to_string());
                continue;
            }
            if !seen.insert((canonical, filename)) {
                continue;
            }

            let target = self.root.join(canonical).join(filename);
            if target.is_file() {
                report.present += 1;
                continue;
            }

            let Some(source) = self
                .fallbacks(canonical)
                .map(|dir| dir.join(filename))
                .find(|path| path.is_file())
            else {
                tracing::warn!(filename = %filename, dir = canonical, "Attachment not found");
                report.missing.push(filename.to_string());
                continue;
            };

            if !self.dry_run {
                if let Err(e) = self.copy_into_place(&source, &target) {
                    tracing::warn!(
                        filename = %filename,
                        from = %source.display(),
                        error = %e,
                        "Failed to copy attachment"
                    );
                    report.missing.push(filename.to_string());
                    continue;
                }
            }

            tracing::info!(
                filename = %filename,
                from = %source.display(),
                to = %target.display(),
                "Relocated attachment"
            );
            report.relocated.push(Relocation {
                filename: filename.to_string(),
                from: source,
                to: target,
            });
        }

        report
    }
}

/// Reconciles attachments under `dir` with the default layout.
pub fn reconcile(dir: &Path, messages: &[Message]) -> MediaReport {
    MediaReconciler::new(dir).reconcile(messages)
}
