//! # NINJS Formatter
//!
//! Converts newsroom article records into NINJS (JSON news-interchange)
//! documents for distribution to subscribers.
//!
//! ## Overview
//!
//! The publishing pipeline hands the formatter an [`Article`] record and a
//! [`Subscriber`]; it gets back the subscriber's next publish sequence number
//! and the serialized document:
//!
//! ```text
//! record + subscriber → [field extraction/mapping] → NINJS document → JSON bytes
//! ```
//!
//! The formatter holds no state between calls. Its two collaborators, a
//! [`services::Sequencer`] and a [`services::UserDirectory`], are injected
//! at construction time, so a single instance can serve concurrent
//! conversions for different article/subscriber pairs.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use ninjs_formatter::{Article, Formatter, NinjsFormatter, Subscriber};
//! use ninjs_formatter::services::{InMemorySequencer, InMemoryUserDirectory};
//!
//! let formatter = NinjsFormatter::new(
//!     Arc::new(InMemorySequencer::new()),
//!     Arc::new(InMemoryUserDirectory::empty()),
//! );
//!
//! let article: Article = serde_json::from_str(
//!     r#"{"_id": "a1", "_current_version": 1, "type": "text"}"#,
//! ).unwrap();
//!
//! let (seq, doc) = formatter.format(&article, &Subscriber::new("wire-1")).unwrap();
//! assert_eq!(seq, 1);
//! assert!(doc.starts_with("{\"_id\":\"a1\""));
//! ```

pub mod error;
pub mod formatters;
pub mod models;
pub mod services;

pub use error::{FormatConversionError, FormatterError};
pub use formatters::ninjs::{NinjsFormatter, FORMAT_NINJS};
pub use formatters::Formatter;
pub use models::{Article, Subscriber};
