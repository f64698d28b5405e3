//! # chatsync CLI
//!
//! Command-line interface for the chatsync library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use chatsync::ChatsyncError;
use chatsync::cli::Args;
use chatsync::sync::sync;

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_directive()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let args = <Args as ClapParser>::parse();
    init_logging(&args);

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), ChatsyncError> {
    let start = Instant::now();
    let config = args.to_config();

    println!("📦 chatsync v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Chat:    {}", args.chat_dir.display());
    if config.dry_run {
        println!("🧪 Mode:    Dry run");
    }
    println!();

    let report = sync(&args.chat_dir, &config)?;

    println!("📖 Records:    {} messages", report.records_in);
    println!("📖 Transcript: {} messages", report.transcript_in);
    println!(
        "🔀 Merged:     {} messages ({} duplicates removed)",
        report.stats.kept, report.stats.duplicates
    );

    if config.reconcile_media {
        println!(
            "🖼️  Media:      {} in place, {} relocated, {} missing",
            report.media.present,
            report.media.relocated.len(),
            report.media.missing.len()
        );
    }

    println!();
    if report.dry_run {
        println!("✅ Done! Dry run, nothing written");
    } else if report.written.is_empty() {
        println!("✅ Done! Already in sync");
    } else {
        println!("✅ Done!");
        for path in &report.written {
            println!("   💾 {}", path.display());
        }
        for path in &report.backups {
            println!("   🗄️  {}", path.display());
        }
    }

    println!();
    println!("⚡ Total time: {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
