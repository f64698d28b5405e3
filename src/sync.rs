//! The sync pipeline for one chat directory.
//!
//! 1. Locate the record file and the transcript. Neither present is fatal.
//! 2. Load the self-identity list.
//! 3. Parse both sources. A malformed record file is fatal.
//! 4. Merge, then render both outputs in memory.
//! 5. Reconcile media.
//! 6. Back up and rewrite each source whose content changed.
//!
//! Every structural error surfaces before step 5, so a failed run leaves
//! the directory untouched. Sources are rewritten through a temporary file
//! and a rename.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatsync::config::SyncConfig;
//! use chatsync::sync::sync;
//!
//! let report = sync("chats/alice".as_ref(), &SyncConfig::new().with_dry_run(true))?;
//! println!("{} messages after merge", report.stats.kept);
//! # Ok::<(), chatsync::ChatsyncError>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use crate::Message;
use crate::config::SyncConfig;
use crate::core::{MergeStats, RecordDefaults, dominant_style, merge_with_stats};
use crate::core::{to_records_json, to_transcript};
use crate::error::{ChatsyncError, Result};
use crate::identity::SelfIdentity;
use crate::media::{MediaReconciler, MediaReport};
use crate::message::{DateStyle, SourceOrigin};
use crate::parsers::create_parser;

/// A phone number embedded in a transcript file name.
static PHONE_IN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\d(?:[ \-]?\d){6,}").expect("valid phone-in-name regex")
});

/// The sources of one chat directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatDirectory {
    pub root: PathBuf,
    pub record_path: PathBuf,
    pub record_exists: bool,
    pub transcript_path: PathBuf,
    pub transcript_exists: bool,
    /// Phone number embedded in the transcript file name
    pub phone: Option<String>,
}

fn is_txt(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extracts a phone number from a file name.
///
/// ```
/// use chatsync::sync::phone_in_name;
///
/// assert_eq!(phone_in_name("Chat with +49 170 1234567.txt").as_deref(), Some("+49 170 1234567"));
/// assert_eq!(phone_in_name("Chat with Alice.txt"), None);
/// ```
pub fn phone_in_name(name: &str) -> Option<String> {
    PHONE_IN_NAME.find(name).map(|m| m.as_str().to_string())
}

/// Lists `*.txt` files of a directory sorted by name; a missing directory
/// has none.
fn transcript_candidates(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_txt(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Default name for a transcript that does not exist yet.
fn new_transcript_name(phone: Option<&str>) -> String {
    let phone: Option<String> = phone.map(|p| {
        p.chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'))
            .collect::<String>()
            .trim()
            .to_string()
    });
    match phone.filter(|p| p.chars().any(|c| c.is_ascii_digit())) {
        Some(phone) => format!("Chat with {phone}.txt"),
        None => "Chat.txt".to_string(),
    }
}

impl ChatDirectory {
    /// Finds the sources of `root`.
    ///
    /// The transcript is the first `*.txt` (by name) in the transcript
    /// directory whose name embeds a phone number, else the first `*.txt`.
    /// When there is none, `transcript_path` is where a new one would go.
    pub fn locate(root: &Path, config: &SyncConfig) -> Result<Self> {
        let record_path = root.join(&config.record_file);
        let transcript_dir = root.join(&config.transcript_dir);

        let candidates = transcript_candidates(&transcript_dir)?;
        let found = candidates
            .iter()
            .find(|path| phone_in_name(&file_name(path)).is_some())
            .or_else(|| candidates.first())
            .cloned();

        let (transcript_path, transcript_exists, phone) = match found {
            Some(path) => {
                let phone = phone_in_name(&file_name(&path));
                (path, true, phone)
            }
            None => (transcript_dir.join("Chat.txt"), false, None),
        };

        Ok(Self {
            root: root.to_path_buf(),
            record_exists: record_path.is_file(),
            record_path,
            transcript_path,
            transcript_exists,
            phone,
        })
    }

    /// `true` when at least one source exists.
    pub fn has_sources(&self) -> bool {
        self.record_exists || self.transcript_exists
    }
}

/// Outcome of a sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Messages read from the record file
    pub records_in: usize,
    /// Messages read from the transcript
    pub transcript_in: usize,
    pub stats: MergeStats,
    pub media: MediaReport,
    pub record_path: PathBuf,
    pub transcript_path: PathBuf,
    /// Backups written before overwriting
    pub backups: Vec<PathBuf>,
    /// Files whose content was (re)written
    pub written: Vec<PathBuf>,
    pub dry_run: bool,
    /// The merged history
    pub messages: Vec<Message>,
}

/// Copies `path` to `<path>.backup.<epoch-millis>`.
fn backup(path: &Path) -> Result<PathBuf> {
    let millis = Utc::now().timestamp_millis();
    let target = path.with_file_name(format!("{}.backup.{millis}", file_name(path)));
    fs::copy(path, &target)?;
    tracing::info!(backup = %target.display(), "Backed up source");
    Ok(target)
}

/// Writes through a temporary sibling file and a rename. The temporary file
/// is removed when either step fails.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_file_name(format!("{}.tmp", file_name(path)));
    if let Err(e) = fs::write(&tmp, contents).and_then(|()| fs::rename(&tmp, path)) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            tracing::debug!(path = %tmp.display(), error = %cleanup, "Temporary file not removed");
        }
        return Err(e.into());
    }
    Ok(())
}

fn self_identity_path(root: &Path, config: &SyncConfig) -> PathBuf {
    config
        .self_identity_path
        .clone()
        .unwrap_or_else(|| root.join(&config.identity_file))
}

/// Backs up and rewrites one source. Returns `false` when the content is
/// already up to date.
fn update_source(
    path: &Path,
    exists: bool,
    contents: &str,
    config: &SyncConfig,
    backups: &mut Vec<PathBuf>,
) -> Result<bool> {
    if exists {
        if fs::read_to_string(path).is_ok_and(|current| current == contents) {
            tracing::debug!(path = %path.display(), "Source already up to date");
            return Ok(false);
        }
        if config.write_backups {
            backups.push(backup(path)?);
        }
    }
    write_atomic(path, contents)?;
    tracing::info!(path = %path.display(), "Wrote merged source");
    Ok(true)
}

/// Synchronizes both exports of the chat directory `root`.
///
/// # Errors
///
/// - [`ChatsyncError::MissingSources`] when neither source exists
/// - [`ChatsyncError::InvalidConfig`] for a malformed self-identity file
/// - parse errors for a malformed record file
/// - I/O errors while reading or writing
pub fn sync(root: &Path, config: &SyncConfig) -> Result<SyncReport> {
    let dir = ChatDirectory::locate(root, config)?;
    if !dir.has_sources() {
        return Err(ChatsyncError::missing_sources(root));
    }

    let identities = SelfIdentity::load(&self_identity_path(root, config))?;
    tracing::debug!(entries = identities.len(), "Loaded self identities");

    let records = if dir.record_exists {
        create_parser(SourceOrigin::Record, &identities, config).parse(&dir.record_path)?
    } else {
        tracing::info!(path = %dir.record_path.display(), "No record file, it will be created");
        Vec::new()
    };

    let transcript = if dir.transcript_exists {
        create_parser(SourceOrigin::Transcript, &identities, config)
            .parse(&dir.transcript_path)?
    } else {
        tracing::info!("No transcript, it will be created");
        Vec::new()
    };

    let records_in = records.len();
    let transcript_in = transcript.len();
    let style = dominant_style(&transcript).unwrap_or(DateStyle::Us);

    let (merged, stats) = merge_with_stats(records, transcript);
    tracing::info!(
        input = stats.input,
        kept = stats.kept,
        duplicates = stats.duplicates,
        "Merged exports"
    );

    let defaults = RecordDefaults::from_messages(&merged, dir.phone.as_deref());
    let records_json = to_records_json(&merged, &defaults)?;
    let transcript_text = to_transcript(&merged, &identities, style);

    let transcript_path = if dir.transcript_exists {
        dir.transcript_path.clone()
    } else {
        dir.transcript_path
            .with_file_name(new_transcript_name(defaults.phone_num.as_deref()))
    };

    let media = if config.reconcile_media {
        MediaReconciler::new(root)
            .with_transcript_dir(config.transcript_dir.as_str())
            .with_dry_run(config.dry_run)
            .reconcile(&merged)
    } else {
        MediaReport::default()
    };

    let mut backups = Vec::new();
    let mut written = Vec::new();
    if config.dry_run {
        tracing::info!("Dry run, leaving sources untouched");
    } else {
        if update_source(&dir.record_path, dir.record_exists, &records_json, config, &mut backups)? {
            written.push(dir.record_path.clone());
        }
        if update_source(
            &transcript_path,
            dir.transcript_exists,
            &transcript_text,
            config,
            &mut backups,
        )? {
            written.push(transcript_path.clone());
        }
    }

    Ok(SyncReport {
        records_in,
        transcript_in,
        stats,
        media,
        record_path: dir.record_path,
        transcript_path,
        backups,
        written,
        dry_run: config.dry_run,
        messages: merged,
    })
}
