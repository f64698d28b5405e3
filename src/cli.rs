//! Command-line interface definition using clap.
//!
//! [`Args`] maps directly onto [`SyncConfig`]:
//!
//! ```rust
//! use chatsync::cli::Args;
//! use clap::Parser;
//!
//! let args = Args::parse_from(["chatsync", "chats/alice", "--dry-run", "--no-media"]);
//! let config = args.to_config();
//!
//! assert!(config.dry_run);
//! assert!(!config.reconcile_media);
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::config::SyncConfig;

/// Merge a chat's record export and plain-text transcript into one
/// deduplicated history, rewriting both.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatsync")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatsync chats/alice
    chatsync chats/alice --dry-run -v
    chatsync chats/team --self-config ~/.config/chatsync/self.json --no-media")]
pub struct Args {
    /// Chat directory holding messages.json and transcript/
    pub chat_dir: PathBuf,

    /// Self-identity file (default: <CHAT_DIR>/self_identity.json)
    #[arg(long, value_name = "PATH")]
    pub self_config: Option<PathBuf>,

    /// Parse and merge, but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Skip media reconciliation
    #[arg(long)]
    pub no_media: bool,

    /// Do not back up sources before overwriting them
    #[arg(long)]
    pub no_backup: bool,

    /// Show debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Builds the sync configuration for these arguments.
    pub fn to_config(&self) -> SyncConfig {
        let mut config = SyncConfig::new()
            .with_dry_run(self.dry_run)
            .with_reconcile_media(!self.no_media)
            .with_write_backups(!self.no_backup);
        if let Some(path) = &self.self_config {
            config = config.with_self_identity_path(path);
        }
        config
    }

    /// Default log filter directive for the chosen verbosity.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "chatsync=debug"
        } else if self.quiet {
            "chatsync=warn"
        } else {
            "chatsync=info"
        }
    }
}
