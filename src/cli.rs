//! Command-line interface definitions for the NINJS formatter driver.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The subscriber identifier can also be provided via environment variable.

use clap::Parser;

/// Command-line arguments for the NINJS formatter driver.
///
/// # Examples
///
/// ```sh
/// # Convert one article for a subscriber
/// ninjs_formatter -o ./out -s wire-1 article.json
///
/// # Convert a batch with byline enrichment from a user directory dump
/// ninjs_formatter -o ./out -s wire-1 --users users.json articles/*.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Article JSON files to convert
    #[arg(required = true)]
    pub articles: Vec<String>,

    /// Output directory for NINJS documents
    #[arg(short, long)]
    pub output_dir: String,

    /// Subscriber identifier used for publish sequencing
    #[arg(short, long, env = "NINJS_SUBSCRIBER_ID")]
    pub subscriber_id: String,

    /// Optional JSON file of user records for byline enrichment
    #[arg(long)]
    pub users: Option<String>,

    /// Requested output format name
    #[arg(long, default_value = "ninjs")]
    pub format: String,
}
