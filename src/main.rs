//! # NINJS Formatter driver
//!
//! A small pipeline driver around the [`ninjs_formatter`] library: it reads
//! article records from JSON files, converts each one into a NINJS document
//! for a subscriber, and writes the documents to an output directory named
//! by publish sequence number.
//!
//! ## Usage
//!
//! ```sh
//! ninjs_formatter -o ./out -s wire-1 --users users.json articles/*.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Setup**: Initialize tracing, validate the output directory, load the
//!    optional user-directory dump for byline enrichment
//! 2. **Convert**: Read and parse each article file, gate on `can_format`,
//!    run the conversion (bounded concurrency, 4 at a time)
//! 3. **Write**: Store each document as `{subscriber}-{seq}.json`
//!
//! Failed files are logged and skipped; the run ends with a summary of
//! converted and failed counts.

use clap::Parser;
use futures::stream::{self, StreamExt};
use ninjs_formatter::services::{InMemorySequencer, InMemoryUserDirectory};
use ninjs_formatter::{Article, Formatter, NinjsFormatter, Subscriber};
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod utils;

use cli::Cli;
use utils::{ensure_writable_dir, truncate_for_log};

/// How many article files are converted concurrently.
const PARALLEL_BATCH_SIZE: usize = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ninjs_formatter starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.output_dir, ?args.subscriber_id, count = args.articles.len(), "Parsed CLI arguments");

    // Early check: ensure output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Load user directory (optional, for byline enrichment) ----
    let users = match &args.users {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await?;
            let records: Vec<ninjs_formatter::models::User> = serde_json::from_str(&raw)?;
            info!(path = %path, count = records.len(), "Loaded user directory");
            InMemoryUserDirectory::new(records)
        }
        None => InMemoryUserDirectory::empty(),
    };

    let formatter = Arc::new(NinjsFormatter::new(
        Arc::new(InMemorySequencer::new()),
        Arc::new(users),
    ));
    let subscriber = Subscriber::new(args.subscriber_id.clone());

    // ---- Convert articles (bounded concurrency) ----
    let total_articles = args.articles.len();
    info!(
        total = total_articles,
        parallel_batch_size = PARALLEL_BATCH_SIZE,
        "Starting article conversion"
    );

    let results: Vec<bool> = stream::iter(args.articles.iter())
        .map(|path| {
            let formatter = Arc::clone(&formatter);
            let subscriber = subscriber.clone();
            let format = args.format.clone();
            let output_dir = args.output_dir.clone();
            async move {
                match convert_one(&formatter, &subscriber, &format, &output_dir, path).await {
                    Ok(output_path) => {
                        info!(input = %path, output = %output_path, "Converted article");
                        true
                    }
                    Err(e) => {
                        error!(input = %path, error = %e, "Conversion failed; skipping article");
                        false
                    }
                }
            }
        })
        .buffer_unordered(PARALLEL_BATCH_SIZE)
        .collect()
        .await;

    let converted = results.iter().filter(|ok| **ok).count();
    let failed = total_articles - converted;

    let elapsed = start_time.elapsed();
    info!(
        total = total_articles,
        converted,
        failed,
        subscriber = %args.subscriber_id,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Read one article file, format it, and write the resulting document.
///
/// Returns the path of the written document on success.
async fn convert_one(
    formatter: &NinjsFormatter,
    subscriber: &Subscriber,
    format: &str,
    output_dir: &str,
    path: &str,
) -> Result<String, Box<dyn Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let article: Article = serde_json::from_str(&raw)?;

    if !formatter.can_format(format, &article) {
        warn!(input = %path, format = %format, "Requested format is not supported");
        return Err(format!("unsupported format: {format}").into());
    }

    let (seq, document) = formatter.format(&article, subscriber)?;
    debug!(
        input = %path,
        seq,
        preview = %truncate_for_log(&document, 300),
        "Formatted NINJS document"
    );

    let output_path = format!(
        "{}/{}-{}.json",
        output_dir.trim_end_matches('/'),
        subscriber.id,
        seq
    );
    tokio::fs::write(&output_path, document).await?;
    Ok(output_path)
}
